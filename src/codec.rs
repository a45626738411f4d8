// ABOUTME: Provider byte sizing and page chunking for outgoing text messages
// ABOUTME: Counts ASCII as one byte and everything else as two, and splits text into budgeted pages

//! Byte sizing and page chunking
//!
//! Carriers bill text by a simplified byte count: every ASCII character costs
//! one byte and every other character (Hangul, CJK, emoji, accented Latin)
//! costs two. All size decisions in this crate go through [`byte_length`].
//!
//! [`split`] breaks text into pages that each fit a byte budget. It works at
//! character granularity, so a wide character is never cut in half, and the
//! pages always concatenate back to the original text.

use thiserror::Error;

/// Errors raised while chunking or verifying pages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A single character does not fit in the page budget
    #[error("page budget of {max_bytes} bytes cannot hold {ch:?} ({needed} bytes)")]
    BudgetTooSmall {
        ch: char,
        needed: usize,
        max_bytes: usize,
    },

    /// A page exceeds the byte budget
    #[error("page {index} is {bytes} bytes, budget is {max_bytes}")]
    PageOverBudget {
        index: usize,
        bytes: usize,
        max_bytes: usize,
    },

    /// A page contains no characters
    #[error("page {index} is empty")]
    EmptyPage { index: usize },

    /// Concatenated pages differ from the source text
    #[error("pages do not reconstitute the source text")]
    Lossy,
}

/// Bytes a single character counts for
#[inline]
pub fn char_byte_len(ch: char) -> usize {
    if ch.is_ascii() { 1 } else { 2 }
}

/// Provider-counted byte length of `text`
///
/// ```rust
/// use sms_dispatch::codec::byte_length;
///
/// assert_eq!(byte_length(""), 0);
/// assert_eq!(byte_length("Hello"), 5);
/// assert_eq!(byte_length("안녕"), 4);
/// ```
pub fn byte_length(text: &str) -> usize {
    text.chars().map(char_byte_len).sum()
}

/// Split `text` into pages of at most `max_bytes` provider bytes
///
/// Pages are packed greedily: characters are appended to the current page
/// until the next one would overflow it, at which point the page is closed
/// and a new one starts with that character.
///
/// Returns an empty vector for empty text.
pub fn split(text: &str, max_bytes: usize) -> Result<Vec<String>, CodecError> {
    if let Some(ch) = text.chars().find(|&ch| char_byte_len(ch) > max_bytes) {
        return Err(CodecError::BudgetTooSmall {
            ch,
            needed: char_byte_len(ch),
            max_bytes,
        });
    }
    Ok(pack_pages(text, max_bytes))
}

/// Greedy packing without the budget check
///
/// A character wider than `max_bytes` ends up alone on an oversized page,
/// which [`verify_pages`] reports.
pub(crate) fn pack_pages(text: &str, max_bytes: usize) -> Vec<String> {
    let mut pages = Vec::new();
    let mut current = String::new();
    let mut current_bytes = 0usize;

    for ch in text.chars() {
        let cost = char_byte_len(ch);
        if !current.is_empty() && current_bytes + cost > max_bytes {
            pages.push(std::mem::take(&mut current));
            current_bytes = 0;
        }
        current.push(ch);
        current_bytes += cost;
    }

    if !current.is_empty() {
        pages.push(current);
    }

    pages
}

/// Check that `pages` is a lossless, in-budget chunking of `text`
pub fn verify_pages(text: &str, pages: &[String], max_bytes: usize) -> Result<(), CodecError> {
    for (index, page) in pages.iter().enumerate() {
        if page.is_empty() {
            return Err(CodecError::EmptyPage { index });
        }
        let bytes = byte_length(page);
        if bytes > max_bytes {
            return Err(CodecError::PageOverBudget {
                index,
                bytes,
                max_bytes,
            });
        }
    }

    // Compare piecewise to avoid building the joined string
    let mut rest = text;
    for page in pages {
        match rest.strip_prefix(page.as_str()) {
            Some(tail) => rest = tail,
            None => return Err(CodecError::Lossy),
        }
    }

    if rest.is_empty() {
        Ok(())
    } else {
        Err(CodecError::Lossy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_length_matches_char_count() {
        let text = "The quick brown fox jumps over the lazy dog 0123456789!?";
        assert_eq!(byte_length(text), text.chars().count());
    }

    #[test]
    fn test_wide_characters_count_double() {
        assert_eq!(byte_length("가"), 2);
        assert_eq!(byte_length("a가b"), 4);
        assert_eq!(byte_length("日本"), 4);
        assert_eq!(byte_length("é"), 2);
        assert_eq!(byte_length("🙂"), 2);
    }

    #[test]
    fn test_byte_length_zero_only_for_empty() {
        assert_eq!(byte_length(""), 0);
        assert!(byte_length(" ") > 0);
        assert!(byte_length("\n") > 0);
    }

    #[test]
    fn test_split_empty_text() {
        assert_eq!(split("", 10).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_split_packs_pages_greedily() {
        let text = "a".repeat(2500);
        let pages = split(&text, 2000).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(byte_length(&pages[0]), 2000);
        assert_eq!(byte_length(&pages[1]), 500);
    }

    #[test]
    fn test_split_never_cuts_wide_character() {
        // 'a' + four wide chars = 9 bytes, budget 4
        let text = "a가나다라";
        let pages = split(text, 4).unwrap();
        assert_eq!(pages, vec!["a가", "나다", "라"]);
        for page in &pages {
            assert!(byte_length(page) <= 4);
        }
    }

    #[test]
    fn test_split_closes_page_before_overflowing_character() {
        // 3 ASCII bytes then a 2-byte char with a budget of 4
        let pages = split("abc가", 4).unwrap();
        assert_eq!(pages, vec!["abc", "가"]);
    }

    #[test]
    fn test_split_rejects_budget_smaller_than_character() {
        let err = split("가", 1).unwrap_err();
        assert!(matches!(err, CodecError::BudgetTooSmall { needed: 2, .. }));
        assert!(matches!(split("a", 0), Err(CodecError::BudgetTooSmall { .. })));
    }

    #[test]
    fn test_split_budget_of_one_for_ascii() {
        let pages = split("abc", 1).unwrap();
        assert_eq!(pages, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_is_lossless_for_mixed_text() {
        let text = "Order #1042 배송이 시작되었습니다. Tracking: 1Z999AA10123456784 🙂 ".repeat(60);
        for budget in [2, 3, 7, 90, 2000] {
            let pages = split(&text, budget).unwrap();
            assert_eq!(pages.concat(), text);
            assert!(pages.iter().all(|p| !p.is_empty()));
            assert!(pages.iter().all(|p| byte_length(p) <= budget));
            verify_pages(&text, &pages, budget).unwrap();
        }
    }

    #[test]
    fn test_verify_detects_broken_pages() {
        let text = "abcdef";
        let over = vec!["abcd".to_string(), "ef".to_string()];
        assert!(matches!(
            verify_pages(text, &over, 3),
            Err(CodecError::PageOverBudget { index: 0, bytes: 4, .. })
        ));

        let lossy = vec!["abc".to_string(), "de".to_string()];
        assert_eq!(verify_pages(text, &lossy, 3), Err(CodecError::Lossy));

        let reordered = vec!["def".to_string(), "abc".to_string()];
        assert_eq!(verify_pages(text, &reordered, 3), Err(CodecError::Lossy));

        let empty = vec!["abc".to_string(), String::new(), "def".to_string()];
        assert_eq!(
            verify_pages(text, &empty, 3),
            Err(CodecError::EmptyPage { index: 1 })
        );
    }
}
