//! Field identifiers and per-field validation errors.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// An editable field of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Given name.
    Name,
    /// Family names.
    LastName,
    /// Contact email.
    Email,
    /// DNI or NIE.
    Dni,
    /// Phone number.
    Phone,
    /// Date of birth.
    BirthDate,
    /// Postal address.
    Address,
    /// Free-form notes.
    Observations,
    /// Assigned role.
    Role,
    /// Account enabled flag.
    IsActive,
}

impl Field {
    /// The snake_case key used in error maps and patches.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Dni => "dni",
            Self::Phone => "phone",
            Self::BirthDate => "birth_date",
            Self::Address => "address",
            Self::Observations => "observations",
            Self::Role => "role",
            Self::IsActive => "is_active",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldError {
    /// The field is blank.
    Required,
    /// The field does not have the expected shape.
    InvalidFormat,
    /// The derived age falls outside the allowed range.
    AgeOutOfRange {
        /// Lowest accepted age.
        min: i32,
        /// Highest accepted age.
        max: i32,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::InvalidFormat => write!(f, "invalid format"),
            Self::AgeOutOfRange { min, max } => {
                write!(f, "age out of range (must be between {min} and {max})")
            }
        }
    }
}

/// Validation errors keyed by field.
///
/// An empty map means the candidate passed every check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMap {
    errors: BTreeMap<Field, FieldError>,
}

impl ErrorMap {
    /// Create an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a field, replacing any previous one.
    pub fn insert(&mut self, field: Field, error: FieldError) {
        self.errors.insert(field, error);
    }

    /// Clear the error for a field.
    pub fn remove(&mut self, field: Field) -> Option<FieldError> {
        self.errors.remove(&field)
    }

    /// The error recorded for a field, if any.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.errors.get(&field).copied()
    }

    /// Whether any field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether every field passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over failing fields in field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.errors.iter().map(|(field, error)| (*field, *error))
    }

    /// Keep only the errors for the given fields.
    #[must_use]
    pub fn restricted_to(&self, fields: &[Field]) -> Self {
        Self {
            errors: self
                .errors
                .iter()
                .filter(|(field, _)| fields.contains(field))
                .map(|(field, error)| (*field, *error))
                .collect(),
        }
    }
}

impl fmt::Display for ErrorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, error) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {error}")?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for ErrorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, error) in self.iter() {
            map.serialize_entry(field.key(), &error.to_string())?;
        }
        map.end()
    }
}
