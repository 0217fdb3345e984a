//! Field validation for user records.
//!
//! Registration and editing share one validator:
//!
//! - **Required fields**: name, last name, email, DNI/NIE and phone must be
//!   non-blank.
//!
//! - **Shape checks**: email, DNI/NIE and phone are matched against the
//!   built-in [`FieldPattern`]s. Only the shape of a DNI/NIE is checked; its
//!   check letter is not computed.
//!
//! - **Age bounds**: an optional birth date must yield an age inside the
//!   configured [`AgeBounds`].
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use sentya::validation::{Field, FieldError, Validator};
//! use sentya::UserDraft;
//!
//! let draft = UserDraft {
//!     name: "Ana".to_string(),
//!     email: "not-an-email".to_string(),
//!     ..UserDraft::default()
//! };
//! let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let errors = Validator::new().validate(&draft, today);
//!
//! assert_eq!(errors.get(Field::Email), Some(FieldError::InvalidFormat));
//! assert_eq!(errors.get(Field::LastName), Some(FieldError::Required));
//! assert!(errors.get(Field::Name).is_none());
//! ```

mod age;
mod errors;
mod patterns;
mod validator;

pub use age::age_on;
pub use errors::{ErrorMap, Field, FieldError};
pub use patterns::{builtin_patterns, FieldPattern, FieldPatterns};
pub use validator::{AgeBounds, Validator};
