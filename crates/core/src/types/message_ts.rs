//! Slack message timestamp type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when converting a message id into a [`MessageTs`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageTsError {
    /// The input string is empty.
    #[error("message id cannot be empty")]
    Empty,
    /// The input has fewer digits than the fractional part requires.
    #[error("message id must be at least {min} digits (got {len})")]
    TooShort {
        /// Minimum number of digits.
        min: usize,
        /// Length of the rejected input.
        len: usize,
    },
    /// The input contains something other than ASCII digits.
    #[error("message id must contain only digits")]
    NotNumeric,
}

/// A Slack message timestamp in the platform's fractional form
/// (`"1625097600.123456"`).
///
/// Slack addresses a message by the timestamp it was posted at. Message links
/// carry the same value with the decimal point removed
/// (`p1625097600123456`); [`MessageTs::from_message_id`] restores it by
/// inserting the point six digits from the end.
///
/// ## Examples
///
/// ```
/// use gohan_core::MessageTs;
///
/// let ts = MessageTs::from_message_id("1625097600123456").unwrap();
/// assert_eq!(ts.as_str(), "1625097600.123456");
///
/// // Too short to carry the microsecond part
/// assert!(MessageTs::from_message_id("12345").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MessageTs(String);

impl MessageTs {
    /// Number of digits after the decimal point.
    pub const FRACTION_DIGITS: usize = 6;

    /// Convert a numeric message id into a fractional timestamp.
    ///
    /// `result = id[..len - 6] + "." + id[len - 6..]`
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Is shorter than 6 characters
    /// - Contains anything other than ASCII digits
    pub fn from_message_id(id: &str) -> Result<Self, MessageTsError> {
        if id.is_empty() {
            return Err(MessageTsError::Empty);
        }

        if !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MessageTsError::NotNumeric);
        }

        let too_short = MessageTsError::TooShort {
            min: Self::FRACTION_DIGITS,
            len: id.len(),
        };
        let mid = id
            .len()
            .checked_sub(Self::FRACTION_DIGITS)
            .ok_or_else(|| too_short.clone())?;
        let (seconds, micros) = id.split_at_checked(mid).ok_or(too_short)?;

        Ok(Self(format!("{seconds}.{micros}")))
    }

    /// Wrap a timestamp that is already in fractional form, as delivered in
    /// event payloads.
    #[must_use]
    pub fn from_raw(ts: impl Into<String>) -> Self {
        Self(ts.into())
    }

    /// Returns the timestamp as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `MessageTs` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageTs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MessageTs {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_message_id() {
        let ts = MessageTs::from_message_id("1625097600123456").expect("valid id");
        assert_eq!(ts.as_str(), "1625097600.123456");
    }

    #[test]
    fn test_exactly_six_digits_has_empty_seconds() {
        let ts = MessageTs::from_message_id("123456").expect("valid id");
        assert_eq!(ts.as_str(), ".123456");
    }

    #[test]
    fn test_rejects_short_id() {
        assert_eq!(
            MessageTs::from_message_id("12345"),
            Err(MessageTsError::TooShort { min: 6, len: 5 })
        );
        assert_eq!(
            MessageTs::from_message_id("1"),
            Err(MessageTsError::TooShort { min: 6, len: 1 })
        );
    }

    #[test]
    fn test_rejects_empty_id() {
        assert_eq!(MessageTs::from_message_id(""), Err(MessageTsError::Empty));
    }

    #[test]
    fn test_rejects_non_numeric_id() {
        assert_eq!(
            MessageTs::from_message_id("p1625097600123456"),
            Err(MessageTsError::NotNumeric)
        );
        assert_eq!(
            MessageTs::from_message_id("1625097600.123456"),
            Err(MessageTsError::NotNumeric)
        );
    }

    #[test]
    fn test_error_display() {
        let err = MessageTs::from_message_id("123").expect_err("too short");
        assert_eq!(err.to_string(), "message id must be at least 6 digits (got 3)");
    }

    #[test]
    fn test_from_raw_keeps_value() {
        let ts = MessageTs::from_raw("1625097600.123456");
        assert_eq!(ts.to_string(), "1625097600.123456");
    }
}
