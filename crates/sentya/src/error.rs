//! Error types for sentya.
//!
//! This module defines all error types used throughout the sentya crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ErrorMap;

/// The main error type for sentya operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Record Errors ===
    /// One or more fields failed validation.
    #[error("validation failed: {0}")]
    Validation(ErrorMap),

    /// An edit was submitted that changes nothing.
    #[error("no changes to save")]
    NoChanges,

    /// No user exists with the given ID.
    #[error("user {id} not found")]
    UserNotFound {
        /// The requested user ID.
        id: i64,
    },

    /// A unique field collides with an existing user.
    #[error("{field} '{value}' is already registered")]
    Conflict {
        /// Name of the unique field.
        field: &'static str,
        /// The colliding value.
        value: String,
    },

    /// A date string could not be parsed.
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },

    /// A role key was not recognised.
    #[error("unknown role '{value}'")]
    UnknownRole {
        /// The rejected input.
        value: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for sentya operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<ErrorMap> for Error {
    fn from(errors: ErrorMap) -> Self {
        Self::Validation(errors)
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a uniqueness conflict error.
    #[must_use]
    pub fn conflict(field: &'static str, value: impl Into<String>) -> Self {
        Self::Conflict {
            field,
            value: value.into(),
        }
    }

    /// Field errors carried by a validation failure, if any.
    #[must_use]
    pub fn field_errors(&self) -> Option<&ErrorMap> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Check if this error is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error indicates the user does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{Field, FieldError};

    #[test]
    fn test_error_display() {
        assert_eq!(Error::NoChanges.to_string(), "no changes to save");
        assert_eq!(
            Error::UserNotFound { id: 7 }.to_string(),
            "user 7 not found"
        );
    }

    #[test]
    fn test_conflict_display() {
        let err = Error::conflict("dni", "12345678Z");
        let msg = err.to_string();
        assert!(msg.contains("dni"));
        assert!(msg.contains("12345678Z"));
    }

    #[test]
    fn test_validation_from_error_map() {
        let mut errors = ErrorMap::new();
        errors.insert(Field::Email, FieldError::InvalidFormat);
        let err: Error = errors.into();

        assert!(err.is_validation());
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.get(Field::Email), Some(FieldError::InvalidFormat));
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::UserNotFound { id: 1 }.is_not_found());
        assert!(!Error::NoChanges.is_not_found());
        assert!(Error::NoChanges.field_errors().is_none());
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_invalid_date_display() {
        let err = Error::InvalidDate {
            value: "31/02/1990".to_string(),
        };
        assert!(err.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "min_age above max_age".to_string(),
        };
        assert!(err.to_string().contains("min_age"));
    }
}
