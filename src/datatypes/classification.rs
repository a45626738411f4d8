// ABOUTME: Message classification by provider byte size into SMS, LMS and multi-page LMS
// ABOUTME: Produces the ordered page list that the dispatcher sends one page at a time

use crate::codec::{self, CodecError, byte_length};
use crate::datatypes::message_class::{LMS_PAGE_MAX_BYTES, MessageClass, SMS_MAX_BYTES};

/// Text to be sent, immutable input to classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Raw message text as typed
    pub text: String,
    /// Send as the reserved MMS class
    pub mms: bool,
}

impl Message {
    /// Plain text message, classified by size
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mms: false,
        }
    }

    /// Message sent in the MMS class
    pub fn mms(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mms: true,
        }
    }

    /// True when there is nothing worth sending
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Derived shape of a message: size, class and pages
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageClassification {
    /// Provider-counted byte length of the whole text
    pub byte_length: usize,
    /// Billing class
    pub class: MessageClass,
    /// Number of pages (0 for empty text)
    pub page_count: usize,
    /// Ordered page texts
    pub pages: Vec<String>,
}

impl MessageClassification {
    /// True if the text is split over more than one page
    pub fn is_multi_page(&self) -> bool {
        self.page_count > 1
    }

    /// True for empty text
    pub fn is_empty(&self) -> bool {
        self.page_count == 0
    }

    /// Re-check that the pages are a lossless, in-budget chunking of `text`
    pub fn verify(&self, text: &str, page_max_bytes: usize) -> Result<(), CodecError> {
        if self.page_count != self.pages.len() {
            return Err(CodecError::Lossy);
        }
        codec::verify_pages(text, &self.pages, page_max_bytes)
    }
}

/// Classifier with configurable byte limits
///
/// The defaults are the carrier limits: 90 bytes for SMS and 2000 bytes per
/// LMS page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classifier {
    /// Largest SMS in bytes
    pub sms_max_bytes: usize,
    /// Largest LMS page in bytes
    pub page_max_bytes: usize,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            sms_max_bytes: SMS_MAX_BYTES,
            page_max_bytes: LMS_PAGE_MAX_BYTES,
        }
    }
}

impl Classifier {
    pub fn new(sms_max_bytes: usize, page_max_bytes: usize) -> Self {
        Self {
            sms_max_bytes,
            page_max_bytes,
        }
    }

    /// Classify plain text
    ///
    /// Pages are packed at `page_max_bytes`. A budget narrower than a wide
    /// character yields an oversized page, caught by [`MessageClassification::verify`].
    pub fn classify(&self, text: &str) -> MessageClassification {
        let n = byte_length(text);

        if n == 0 {
            return MessageClassification::default();
        }

        if n <= self.page_max_bytes {
            let class = if n <= self.sms_max_bytes {
                MessageClass::Sms
            } else {
                MessageClass::Lms
            };
            return MessageClassification {
                byte_length: n,
                class,
                page_count: 1,
                pages: vec![text.to_string()],
            };
        }

        let pages = codec::pack_pages(text, self.page_max_bytes);
        MessageClassification {
            byte_length: n,
            class: MessageClass::Lms,
            page_count: pages.len(),
            pages,
        }
    }

    /// Classify a [`Message`], honouring the MMS flag
    ///
    /// MMS text is never split; it always goes out as a single page.
    pub fn classify_message(&self, message: &Message) -> MessageClassification {
        if !message.mms {
            return self.classify(&message.text);
        }

        let n = byte_length(&message.text);
        if n == 0 {
            return MessageClassification {
                class: MessageClass::Mms,
                ..Default::default()
            };
        }

        MessageClassification {
            byte_length: n,
            class: MessageClass::Mms,
            page_count: 1,
            pages: vec![message.text.clone()],
        }
    }
}

/// Classify `text` with the default carrier limits
///
/// ```rust
/// use sms_dispatch::datatypes::{classify, MessageClass};
///
/// let shape = classify("Your order has shipped");
/// assert_eq!(shape.class, MessageClass::Sms);
/// assert_eq!(shape.page_count, 1);
/// ```
pub fn classify(text: &str) -> MessageClassification {
    Classifier::default().classify(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_no_pages() {
        let shape = classify("");
        assert_eq!(shape.byte_length, 0);
        assert_eq!(shape.page_count, 0);
        assert!(shape.pages.is_empty());
        assert!(shape.is_empty());
    }

    #[test]
    fn test_sms_boundary() {
        let shape = classify(&"a".repeat(90));
        assert_eq!(shape.class, MessageClass::Sms);
        assert_eq!(shape.page_count, 1);

        let shape = classify(&"a".repeat(91));
        assert_eq!(shape.class, MessageClass::Lms);
        assert_eq!(shape.page_count, 1);
    }

    #[test]
    fn test_sms_boundary_with_wide_characters() {
        // 45 wide chars = 90 bytes
        let shape = classify(&"가".repeat(45));
        assert_eq!(shape.byte_length, 90);
        assert_eq!(shape.class, MessageClass::Sms);

        // 45 wide chars + 1 ASCII = 91 bytes
        let shape = classify(&format!("{}a", "가".repeat(45)));
        assert_eq!(shape.byte_length, 91);
        assert_eq!(shape.class, MessageClass::Lms);
    }

    #[test]
    fn test_lms_single_page_boundary() {
        let shape = classify(&"a".repeat(2000));
        assert_eq!(shape.class, MessageClass::Lms);
        assert_eq!(shape.page_count, 1);
        assert!(!shape.is_multi_page());

        let shape = classify(&"a".repeat(2001));
        assert_eq!(shape.class, MessageClass::Lms);
        assert_eq!(shape.page_count, 2);
        assert!(shape.is_multi_page());
    }

    #[test]
    fn test_multi_page_split_of_wide_text() {
        // 1001 wide chars = 2002 bytes; first page holds 1000 chars
        let text = "한".repeat(1001);
        let shape = classify(&text);
        assert_eq!(shape.byte_length, 2002);
        assert_eq!(shape.page_count, 2);
        assert_eq!(shape.pages[0].chars().count(), 1000);
        assert_eq!(shape.pages[1], "한");
        shape.verify(&text, LMS_PAGE_MAX_BYTES).unwrap();
    }

    #[test]
    fn test_custom_limits() {
        let classifier = Classifier::new(4, 6);
        assert_eq!(classifier.classify("abcd").class, MessageClass::Sms);
        assert_eq!(classifier.classify("abcde").class, MessageClass::Lms);
        let shape = classifier.classify("abcdefgh");
        assert_eq!(shape.pages, vec!["abcdef", "gh"]);
    }

    #[test]
    fn test_mms_is_single_page() {
        let classifier = Classifier::default();
        let message = Message::mms("a".repeat(3000));
        let shape = classifier.classify_message(&message);
        assert_eq!(shape.class, MessageClass::Mms);
        assert_eq!(shape.page_count, 1);
        assert_eq!(shape.byte_length, 3000);

        let shape = classifier.classify_message(&Message::mms(""));
        assert_eq!(shape.class, MessageClass::Mms);
        assert_eq!(shape.page_count, 0);
    }

    #[test]
    fn test_budget_narrower_than_wide_char_fails_verification() {
        let classifier = Classifier::new(0, 1);
        let shape = classifier.classify("가나");
        assert_eq!(shape.page_count, 2);
        assert!(matches!(
            shape.verify("가나", 1),
            Err(CodecError::PageOverBudget { index: 0, bytes: 2, .. })
        ));
    }

    #[test]
    fn test_verify_catches_page_count_mismatch() {
        let mut shape = classify(&"a".repeat(2500));
        shape.page_count = 3;
        assert_eq!(
            shape.verify(&"a".repeat(2500), LMS_PAGE_MAX_BYTES),
            Err(CodecError::Lossy)
        );
    }

    #[test]
    fn test_blank_message() {
        assert!(Message::new("  \n").is_blank());
        assert!(!Message::new(" hi ").is_blank());
    }
}
