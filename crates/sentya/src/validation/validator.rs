//! The record validator shared by registration and editing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::age::age_on;
use super::errors::{ErrorMap, Field, FieldError};
use super::patterns::builtin_patterns;
use crate::user::UserDraft;

/// Inclusive range of accepted ages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBounds {
    /// Lowest accepted age.
    pub min: i32,
    /// Highest accepted age.
    pub max: i32,
}

impl Default for AgeBounds {
    fn default() -> Self {
        Self { min: 18, max: 120 }
    }
}

impl AgeBounds {
    /// Whether `age` lies inside the bounds.
    #[must_use]
    pub fn contains(&self, age: i32) -> bool {
        (self.min..=self.max).contains(&age)
    }
}

/// Validates user drafts field by field.
///
/// Every check runs on every call; the order of checks never changes the
/// outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    bounds: AgeBounds,
}

impl Validator {
    /// Create a validator with the default 18..=120 age bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with custom age bounds.
    #[must_use]
    pub fn with_bounds(bounds: AgeBounds) -> Self {
        Self { bounds }
    }

    /// The age bounds in effect.
    #[must_use]
    pub fn bounds(&self) -> AgeBounds {
        self.bounds
    }

    /// Validate every field of a draft as of `today`.
    #[must_use]
    pub fn validate(&self, draft: &UserDraft, today: NaiveDate) -> ErrorMap {
        let mut errors = ErrorMap::new();

        let checks = [
            (Field::Name, check_required(&draft.name)),
            (Field::LastName, check_required(&draft.last_name)),
            (Field::Email, check_email(&draft.email)),
            (Field::Dni, check_dni(&draft.dni)),
            (Field::Phone, check_phone(&draft.phone)),
            (Field::BirthDate, self.check_birth_date(draft.birth_date, today)),
        ];

        for (field, result) in checks {
            if let Some(error) = result {
                trace!(%field, %error, "Field rejected");
                errors.insert(field, error);
            }
        }

        debug!(failed = errors.len(), "Validated user draft");
        errors
    }

    /// Validate a draft but report only the listed fields.
    #[must_use]
    pub fn validate_fields(&self, draft: &UserDraft, today: NaiveDate, fields: &[Field]) -> ErrorMap {
        self.validate(draft, today).restricted_to(fields)
    }

    /// Check an optional birth date against the age bounds.
    #[must_use]
    pub fn check_birth_date(&self, birth_date: Option<NaiveDate>, today: NaiveDate) -> Option<FieldError> {
        let birth = birth_date?;
        let age = age_on(birth, today);
        if self.bounds.contains(age) {
            None
        } else {
            Some(FieldError::AgeOutOfRange {
                min: self.bounds.min,
                max: self.bounds.max,
            })
        }
    }
}

/// Reject blank values.
#[must_use]
pub fn check_required(value: &str) -> Option<FieldError> {
    if value.trim().is_empty() {
        Some(FieldError::Required)
    } else {
        None
    }
}

/// Check a required email address.
#[must_use]
pub fn check_email(value: &str) -> Option<FieldError> {
    check_required(value).or_else(|| {
        (!builtin_patterns().email.matches(value)).then_some(FieldError::InvalidFormat)
    })
}

/// Check a required DNI or NIE, ignoring letter case.
#[must_use]
pub fn check_dni(value: &str) -> Option<FieldError> {
    check_required(value).or_else(|| {
        let upper = value.to_uppercase();
        (!builtin_patterns().is_identity_document(&upper)).then_some(FieldError::InvalidFormat)
    })
}

/// Check a required phone number after trimming.
#[must_use]
pub fn check_phone(value: &str) -> Option<FieldError> {
    check_required(value).or_else(|| {
        (!builtin_patterns().phone.matches(value.trim())).then_some(FieldError::InvalidFormat)
    })
}
