// ABOUTME: Recipient phone numbers with normalization and format validation
// ABOUTME: Validates digits-only numbers with an optional leading plus after stripping separators

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Shortest accepted phone number, in digits
pub const MIN_PHONE_DIGITS: usize = 3;

/// Longest accepted phone number, in digits
pub const MAX_PHONE_DIGITS: usize = 20;

/// Errors for malformed recipient phone numbers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipientError {
    /// Phone number is empty after removing separators
    #[error("phone number is empty")]
    Empty,
    /// Phone number contains a character that is not a digit or separator
    #[error("phone number {phone:?} contains invalid character {ch:?}")]
    InvalidCharacter { phone: String, ch: char },
    /// Phone number has too few or too many digits
    #[error("phone number {phone:?} has {digits} digits, expected 3-20")]
    BadLength { phone: String, digits: usize },
}

/// A single destination of a send
///
/// Recipients are built per send request; they carry no identity beyond the
/// phone number and an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    /// Phone number as entered, e.g. `010-1234-5678` or `+821012345678`
    pub phone: String,
    /// Name shown in history and progress messages
    pub display_name: Option<String>,
}

impl Recipient {
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            display_name: None,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Phone number with separators (`-`, space, `.`, parentheses) removed
    pub fn normalized_phone(&self) -> String {
        self.phone
            .chars()
            .filter(|c| !matches!(c, '-' | ' ' | '.' | '(' | ')'))
            .collect()
    }

    /// Validate the phone number format
    pub fn validate(&self) -> Result<(), RecipientError> {
        let normalized = self.normalized_phone();
        if normalized.is_empty() {
            return Err(RecipientError::Empty);
        }

        let digits = normalized.strip_prefix('+').unwrap_or(&normalized);
        if let Some(ch) = digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(RecipientError::InvalidCharacter {
                phone: self.phone.clone(),
                ch,
            });
        }

        if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
            return Err(RecipientError::BadLength {
                phone: self.phone.clone(),
                digits: digits.len(),
            });
        }

        Ok(())
    }

    /// True if both recipients address the same phone
    pub fn same_phone(&self, other: &Recipient) -> bool {
        self.normalized_phone() == other.normalized_phone()
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "{} <{}>", name, self.phone),
            None => f.write_str(&self.phone),
        }
    }
}

/// Remove recipients whose phone already appeared earlier in the list
pub fn dedupe_recipients(recipients: Vec<Recipient>) -> Vec<Recipient> {
    let mut seen = std::collections::HashSet::new();
    recipients
        .into_iter()
        .filter(|r| seen.insert(r.normalized_phone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_numbers() {
        for phone in ["010-1234-5678", "+82 10 1234 5678", "(02) 555.1234", "119"] {
            assert!(Recipient::new(phone).validate().is_ok(), "{phone}");
        }
    }

    #[test]
    fn test_invalid_numbers() {
        assert_eq!(Recipient::new(" - ").validate(), Err(RecipientError::Empty));
        assert!(matches!(
            Recipient::new("010-12a4-5678").validate(),
            Err(RecipientError::InvalidCharacter { ch: 'a', .. })
        ));
        assert!(matches!(
            Recipient::new("12").validate(),
            Err(RecipientError::BadLength { digits: 2, .. })
        ));
        assert!(matches!(
            Recipient::new("1".repeat(21)).validate(),
            Err(RecipientError::BadLength { digits: 21, .. })
        ));
        // plus only allowed in front
        assert!(matches!(
            Recipient::new("010+1234").validate(),
            Err(RecipientError::InvalidCharacter { ch: '+', .. })
        ));
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let list = vec![
            Recipient::new("010-1111-2222").with_name("Kim"),
            Recipient::new("01011112222").with_name("Kim (dup)"),
            Recipient::new("010-3333-4444"),
        ];
        let deduped = dedupe_recipients(list);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].display_name.as_deref(), Some("Kim"));
        assert!(deduped[0].same_phone(&Recipient::new("010 1111 2222")));
    }

    #[test]
    fn test_display() {
        assert_eq!(Recipient::new("0101234").to_string(), "0101234");
        assert_eq!(
            Recipient::new("0101234").with_name("Lee").to_string(),
            "Lee <0101234>"
        );
    }
}
