//! Built-in field patterns.
//!
//! This module provides the pre-defined regex patterns used to check the
//! shape of email addresses, identity documents and phone numbers.

use std::sync::LazyLock;

use regex::Regex;

/// A compiled field pattern.
#[derive(Debug)]
pub struct FieldPattern {
    /// Name of the pattern for identification.
    pub name: &'static str,

    /// Description of what this pattern matches.
    pub description: &'static str,

    /// The compiled regex.
    regex: Regex,
}

impl FieldPattern {
    /// Create a new field pattern.
    ///
    /// # Panics
    ///
    /// Panics if the regex pattern is invalid.
    #[must_use]
    pub fn new(name: &'static str, description: &'static str, pattern: &str) -> Self {
        Self {
            name,
            description,
            regex: Regex::new(pattern).expect("Invalid regex pattern"),
        }
    }

    /// Check if the value matches this pattern.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// The source of the underlying regex.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// The set of patterns the validator checks against.
#[derive(Debug)]
pub struct FieldPatterns {
    /// `local@domain.tld` email shape.
    pub email: FieldPattern,
    /// Spanish DNI: eight digits and a letter.
    pub dni: FieldPattern,
    /// Spanish NIE: X, Y or Z, seven digits and a letter.
    pub nie: FieldPattern,
    /// Loose international phone shape.
    pub phone: FieldPattern,
}

impl FieldPatterns {
    fn builtin() -> Self {
        Self {
            email: FieldPattern::new(
                "email",
                "Simple local@domain.tld address",
                r"^[^\s@]+@[^\s@]+\.[^\s@]+$",
            ),
            dni: FieldPattern::new("dni", "Spanish DNI (8 digits + letter)", r"^[0-9]{8}[A-Z]$"),
            nie: FieldPattern::new(
                "nie",
                "Spanish NIE (X/Y/Z + 7 digits + letter)",
                r"^[XYZ][0-9]{7}[A-Z]$",
            ),
            phone: FieldPattern::new(
                "phone",
                "Optional +, then 9-20 digits, spaces, dashes or parentheses",
                r"^[+]?[0-9\s\-()]{9,20}$",
            ),
        }
    }

    /// All patterns in check order.
    #[must_use]
    pub fn all(&self) -> [&FieldPattern; 4] {
        [&self.email, &self.dni, &self.nie, &self.phone]
    }

    /// Whether an uppercased document number has a DNI or NIE shape.
    #[must_use]
    pub fn is_identity_document(&self, value: &str) -> bool {
        self.dni.matches(value) || self.nie.matches(value)
    }
}

static PATTERNS: LazyLock<FieldPatterns> = LazyLock::new(FieldPatterns::builtin);

/// Get the built-in field patterns, compiled on first use.
#[must_use]
pub fn builtin_patterns() -> &'static FieldPatterns {
    &PATTERNS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_pattern() {
        let email = &builtin_patterns().email;

        assert!(email.matches("ana@example.com"));
        assert!(email.matches("a.b+c@sub.domain.es"));
        assert!(!email.matches("ana@example"));
        assert!(!email.matches("ana example@x.com"));
        assert!(!email.matches("@example.com"));
        assert!(!email.matches("ana@@example.com"));
    }

    #[test]
    fn test_dni_pattern() {
        let patterns = builtin_patterns();

        assert!(patterns.dni.matches("12345678Z"));
        assert!(!patterns.dni.matches("1234567Z"));
        assert!(!patterns.dni.matches("123456789"));
        assert!(!patterns.dni.matches("12345678ZZ"));
        assert!(!patterns.dni.matches("12345678z"));
    }

    #[test]
    fn test_nie_pattern() {
        let patterns = builtin_patterns();

        assert!(patterns.nie.matches("X1234567L"));
        assert!(patterns.nie.matches("Y7654321G"));
        assert!(patterns.nie.matches("Z0000000A"));
        assert!(!patterns.nie.matches("W1234567L"));
        assert!(!patterns.nie.matches("X123456L"));
    }

    #[test]
    fn test_identity_document_accepts_either_shape() {
        let patterns = builtin_patterns();

        assert!(patterns.is_identity_document("12345678Z"));
        assert!(patterns.is_identity_document("X1234567L"));
        assert!(!patterns.is_identity_document("X12345678"));
    }

    #[test]
    fn test_phone_pattern() {
        let phone = &builtin_patterns().phone;

        assert!(phone.matches("+34 612345678"));
        assert!(phone.matches("612 34 56 78"));
        assert!(phone.matches("(91) 555-0100"));
        assert!(!phone.matches("+34 6123"));
        assert!(!phone.matches("+34 612345678 ext"));
        assert!(!phone.matches("123456789012345678901"));
    }

    #[test]
    fn test_all_patterns_have_names() {
        for pattern in builtin_patterns().all() {
            assert!(!pattern.name.is_empty());
            assert!(!pattern.description.is_empty());
            assert!(pattern.as_str().starts_with('^'));
        }
    }
}
