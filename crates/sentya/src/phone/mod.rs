//! Phone prefix and national number handling.
//!
//! Stored phone numbers are single strings such as `"+34 612345678"`. Forms
//! edit the dialing prefix and the national number separately, so a stored
//! value is split on load and recomposed whenever either part changes.
//!
//! # Example
//!
//! ```
//! use sentya::phone::PhoneNumber;
//!
//! let phone = PhoneNumber::split("+351 912345678", "+34");
//! assert_eq!(phone.prefix(), "+351");
//! assert_eq!(phone.number(), "912345678");
//!
//! let phone = phone.with_prefix("+34");
//! assert_eq!(phone.compose(), "+34 912345678");
//! ```

mod countries;

pub use countries::{by_code, is_popular, popular, search as search_countries, Country, COUNTRIES};

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Prefix assumed when a stored value has no recognisable dialing code.
pub const DEFAULT_PREFIX: &str = "+34";

/// A phone number split into dialing prefix and national number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    prefix: String,
    number: String,
}

impl PhoneNumber {
    /// Build from explicit parts.
    #[must_use]
    pub fn new(prefix: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            number: number.into(),
        }
    }

    /// Split a stored value using the built-in catalogue.
    ///
    /// The longest known dialing code the value starts with becomes the
    /// prefix and the trimmed remainder the number. Without a match the
    /// whole trimmed value is the number and `default_prefix` is assumed.
    #[must_use]
    pub fn split(stored: &str, default_prefix: &str) -> Self {
        Self::split_with(stored, default_prefix, COUNTRIES)
    }

    /// Split a stored value against a specific catalogue.
    #[must_use]
    pub fn split_with(stored: &str, default_prefix: &str, catalogue: &[Country]) -> Self {
        let stored = stored.trim();
        let matched = catalogue
            .iter()
            .map(|c| c.code)
            .filter(|code| stored.starts_with(code))
            .max_by_key(|code| code.len());

        match matched {
            Some(code) => {
                trace!(prefix = code, "Matched dialing code");
                Self::new(code, stored[code.len()..].trim())
            }
            None => Self::new(default_prefix, stored),
        }
    }

    /// The dialing prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The national number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// A copy with a different prefix.
    #[must_use]
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        Self::new(prefix, self.number.clone())
    }

    /// A copy with a different national number.
    #[must_use]
    pub fn with_number(&self, number: impl Into<String>) -> Self {
        Self::new(self.prefix.clone(), number)
    }

    /// The canonical stored form: `"<prefix> <number>"`, or only the prefix
    /// while the number is empty.
    #[must_use]
    pub fn compose(&self) -> String {
        if self.number.is_empty() {
            self.prefix.clone()
        } else {
            format!("{} {}", self.prefix, self.number)
        }
    }

    /// The first catalogue country using this prefix.
    #[must_use]
    pub fn country(&self) -> Option<&'static Country> {
        by_code(&self.prefix)
    }
}

impl Default for PhoneNumber {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, "")
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.compose())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_known_prefix() {
        let phone = PhoneNumber::split("+34 612345678", DEFAULT_PREFIX);
        assert_eq!(phone.prefix(), "+34");
        assert_eq!(phone.number(), "612345678");
    }

    #[test]
    fn test_split_without_separator() {
        let phone = PhoneNumber::split("+44207946000", DEFAULT_PREFIX);
        assert_eq!(phone.prefix(), "+44");
        assert_eq!(phone.number(), "207946000");
    }

    #[test]
    fn test_split_three_digit_code() {
        let phone = PhoneNumber::split("+420 601123456", DEFAULT_PREFIX);
        assert_eq!(phone.prefix(), "+420");
        assert_eq!(phone.country().unwrap().iso, "CZ");
    }

    #[test]
    fn test_split_unknown_prefix_uses_default() {
        let phone = PhoneNumber::split("612345678", DEFAULT_PREFIX);
        assert_eq!(phone.prefix(), "+34");
        assert_eq!(phone.number(), "612345678");

        let phone = PhoneNumber::split("+999 123", "+33");
        assert_eq!(phone.prefix(), "+33");
        assert_eq!(phone.number(), "+999 123");
    }

    #[test]
    fn test_split_empty() {
        let phone = PhoneNumber::split("", DEFAULT_PREFIX);
        assert_eq!(phone, PhoneNumber::default());
        assert_eq!(phone.compose(), "+34");
    }

    #[test]
    fn test_split_prefers_longest_code() {
        let catalogue = [
            Country::new("+3", "Short", "AA"),
            Country::new("+351", "Long", "BB"),
            Country::new("+35", "Middle", "CC"),
        ];
        let phone = PhoneNumber::split_with("+351 912345678", DEFAULT_PREFIX, &catalogue);
        assert_eq!(phone.prefix(), "+351");
        assert_eq!(phone.number(), "912345678");
    }

    #[test]
    fn test_compose_round_trip() {
        let phone = PhoneNumber::split("  +33 612 34 56 78 ", DEFAULT_PREFIX);
        assert_eq!(phone.compose(), "+33 612 34 56 78");
    }

    #[test]
    fn test_recompose_after_changes() {
        let phone = PhoneNumber::split("+34 612345678", DEFAULT_PREFIX);

        assert_eq!(phone.with_prefix("+351").compose(), "+351 612345678");
        assert_eq!(phone.with_number("").compose(), "+34");
        assert_eq!(phone.with_number("699000111").to_string(), "+34 699000111");
    }
}
