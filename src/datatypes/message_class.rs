// ABOUTME: Message class enum (SMS, LMS, MMS) with stable storage codes
// ABOUTME: Defines the byte thresholds that separate short, long and multi-page messages

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest message, in provider bytes, that still goes out as an SMS
pub const SMS_MAX_BYTES: usize = 90;

/// Largest single LMS page, in provider bytes
pub const LMS_PAGE_MAX_BYTES: usize = 2000;

/// Billing class of an outgoing message
///
/// ## Classes
/// - **Sms**: short message, up to [`SMS_MAX_BYTES`]
/// - **Lms**: long message, up to [`LMS_PAGE_MAX_BYTES`] per page; longer
///   text is split into several LMS pages billed one by one
/// - **Mms**: reserved class for attachment-bearing sends, billed at a flat
///   rate regardless of text size
///
/// The numeric codes are stable and used when records are stored.
#[derive(TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageClass {
    #[default]
    Sms = 0x00,
    Lms = 0x01,
    Mms = 0x02,
}

impl MessageClass {
    /// Short label shown next to a message
    pub fn label(&self) -> &'static str {
        match self {
            MessageClass::Sms => "SMS",
            MessageClass::Lms => "LMS",
            MessageClass::Mms => "MMS",
        }
    }

    /// Stable storage code
    pub fn code(&self) -> u8 {
        (*self).into()
    }
}

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for class in [MessageClass::Sms, MessageClass::Lms, MessageClass::Mms] {
            assert_eq!(MessageClass::try_from(class.code()).unwrap(), class);
        }
        assert!(MessageClass::try_from(0x03u8).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(MessageClass::Sms.to_string(), "SMS");
        assert_eq!(MessageClass::Lms.label(), "LMS");
        assert_eq!(MessageClass::Mms.label(), "MMS");
    }
}
