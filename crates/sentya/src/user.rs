//! Core user types for sentya.
//!
//! This module defines the stored [`UserRecord`], the editable [`UserDraft`]
//! that forms work on, and the [`Role`] assigned to every user.

use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::validation::age_on;

/// The role a user plays on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform administrator.
    Administrator,
    /// Programme coordinator.
    Coordinator,
    /// Workshop professional (instructor).
    Professional,
    /// Social services centre technician.
    CssTechnician,
    /// Senior receiving care.
    #[default]
    Client,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Self; 5] = [
        Self::Administrator,
        Self::Coordinator,
        Self::Professional,
        Self::CssTechnician,
        Self::Client,
    ];

    /// The stable key used in storage and on the wire.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::Coordinator => "coordinator",
            Self::Professional => "professional",
            Self::CssTechnician => "css_technician",
            Self::Client => "client",
        }
    }

    /// The label shown to administrators.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Administrator => "Administrador",
            Self::Coordinator => "Coordinador",
            Self::Professional => "Profesor",
            Self::CssTechnician => "Trabajador CSS",
            Self::Client => "Usuario",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownRole {
                value: s.to_string(),
            })
    }
}

/// A user as held by the store.
///
/// Age is never stored: it is derived from `birth_date` each time it is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Identifier assigned by the store.
    pub id: i64,
    /// Given name.
    pub name: String,
    /// Family names.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Spanish DNI or NIE.
    pub dni: String,
    /// Phone in `"<prefix> <number>"` form.
    pub phone: String,
    /// Date of birth, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    /// Postal address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    /// Assigned role.
    pub role: Role,
    /// Whether the account is enabled.
    pub is_active: bool,
    /// Whether the user currently has a live session.
    #[serde(default)]
    pub is_online: bool,
    /// When the user was registered.
    pub join_date: NaiveDate,
}

impl UserRecord {
    /// Age on the given date, derived from the birth date.
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        self.birth_date.map(|birth| age_on(birth, today))
    }

    /// Age as of the local current date.
    #[must_use]
    pub fn age(&self) -> Option<i32> {
        self.age_on(today())
    }

    /// Name followed by family names.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.last_name)
    }
}

/// The editable copy of a user held by a form.
///
/// Optional text fields are plain strings here; an empty string means the
/// field is unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserDraft {
    /// Given name.
    pub name: String,
    /// Family names.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Spanish DNI or NIE.
    pub dni: String,
    /// Phone in `"<prefix> <number>"` form.
    pub phone: String,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Postal address.
    pub address: String,
    /// Free-form notes.
    pub observations: String,
    /// Assigned role.
    pub role: Role,
    /// Whether the account is enabled.
    pub is_active: bool,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            last_name: String::new(),
            email: String::new(),
            dni: String::new(),
            phone: String::new(),
            birth_date: None,
            address: String::new(),
            observations: String::new(),
            role: Role::Client,
            is_active: true,
        }
    }
}

impl UserDraft {
    /// Load a draft from a stored record.
    #[must_use]
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            name: record.name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            dni: record.dni.clone(),
            phone: record.phone.clone(),
            birth_date: record.birth_date,
            address: record.address.clone().unwrap_or_default(),
            observations: record.observations.clone().unwrap_or_default(),
            role: record.role,
            is_active: record.is_active,
        }
    }

    /// Age on the given date, derived from the birth date.
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        self.birth_date.map(|birth| age_on(birth, today))
    }

    /// A copy with surrounding whitespace trimmed and the DNI uppercased.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            dni: self.dni.trim().to_uppercase(),
            phone: self.phone.trim().to_string(),
            birth_date: self.birth_date,
            address: self.address.trim().to_string(),
            observations: self.observations.trim().to_string(),
            role: self.role,
            is_active: self.is_active,
        }
    }
}

/// A validated, normalized user ready to be inserted by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Given name.
    pub name: String,
    /// Family names.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Spanish DNI or NIE.
    pub dni: String,
    /// Phone in `"<prefix> <number>"` form.
    pub phone: String,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Postal address.
    pub address: Option<String>,
    /// Free-form notes.
    pub observations: Option<String>,
    /// Assigned role.
    pub role: Role,
    /// Whether the account is enabled.
    pub is_active: bool,
}

impl NewUser {
    /// Build from a draft, normalizing it first.
    #[must_use]
    pub fn from_draft(draft: &UserDraft) -> Self {
        let draft = draft.normalized();
        Self {
            name: draft.name,
            last_name: draft.last_name,
            email: draft.email,
            dni: draft.dni,
            phone: draft.phone,
            birth_date: draft.birth_date,
            address: non_empty(draft.address),
            observations: non_empty(draft.observations),
            role: draft.role,
            is_active: draft.is_active,
        }
    }

    /// Materialize the record once the store has chosen an ID.
    #[must_use]
    pub fn into_record(self, id: i64, join_date: NaiveDate) -> UserRecord {
        UserRecord {
            id,
            name: self.name,
            last_name: self.last_name,
            email: self.email,
            dni: self.dni,
            phone: self.phone,
            birth_date: self.birth_date,
            address: self.address,
            observations: self.observations,
            role: self.role,
            is_active: self.is_active,
            is_online: false,
            join_date,
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// The local current date.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if the input is not a valid calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate {
        value: value.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    pub fn valid_draft() -> UserDraft {
        UserDraft {
            name: "Ana".to_string(),
            last_name: "García López".to_string(),
            email: "ana@example.com".to_string(),
            dni: "12345678Z".to_string(),
            phone: "+34 612345678".to_string(),
            birth_date: Some(date(1950, 3, 14)),
            ..UserDraft::default()
        }
    }

    pub fn record(id: i64, name: &str) -> UserRecord {
        let mut draft = valid_draft();
        draft.name = name.to_string();
        draft.email = format!("{}@example.com", name.to_lowercase());
        draft.dni = format!("{id:08}Z");
        NewUser::from_draft(&draft).into_record(id, date(2024, 1, 15))
    }
}
