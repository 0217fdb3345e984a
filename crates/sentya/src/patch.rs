//! Change-set reduction for user edits.
//!
//! An edit submits only the fields whose draft value differs from the stored
//! original. All fields are scalars, so the comparison is a shallow per-field
//! equality check.

use chrono::NaiveDate;
use serde::Serialize;

use crate::user::{Role, UserDraft, UserRecord};
use crate::validation::Field;

/// A sparse set of field changes.
///
/// `None` means "unchanged". For `birth_date`, `Some(None)` clears the date.
/// An empty `address` or `observations` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserPatch {
    /// New given name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New family names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// New email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New DNI/NIE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dni: Option<String>,
    /// New phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New birth date, or `Some(None)` to clear it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<Option<NaiveDate>>,
    /// New address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// New observations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    /// New role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// New active flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

fn changed(original: &str, draft: &str) -> Option<String> {
    (original != draft).then(|| draft.to_string())
}

fn changed_value<T: PartialEq + Copy>(original: T, draft: T) -> Option<T> {
    (original != draft).then_some(draft)
}

impl UserPatch {
    /// Compute the fields of `draft` that differ from `original`.
    ///
    /// An absent optional field on the original compares equal to an empty
    /// string in the draft. Values are compared as given; normalize the draft
    /// first if trimming or case should not count as a change.
    #[must_use]
    pub fn diff(original: &UserRecord, draft: &UserDraft) -> Self {
        Self {
            name: changed(&original.name, &draft.name),
            last_name: changed(&original.last_name, &draft.last_name),
            email: changed(&original.email, &draft.email),
            dni: changed(&original.dni, &draft.dni),
            phone: changed(&original.phone, &draft.phone),
            birth_date: changed_value(original.birth_date, draft.birth_date),
            address: changed(original.address.as_deref().unwrap_or_default(), &draft.address),
            observations: changed(
                original.observations.as_deref().unwrap_or_default(),
                &draft.observations,
            ),
            role: changed_value(original.role, draft.role),
            is_active: changed_value(original.is_active, draft.is_active),
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// The fields this patch touches, in field order.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<Field> {
        [
            (Field::Name, self.name.is_some()),
            (Field::LastName, self.last_name.is_some()),
            (Field::Email, self.email.is_some()),
            (Field::Dni, self.dni.is_some()),
            (Field::Phone, self.phone.is_some()),
            (Field::BirthDate, self.birth_date.is_some()),
            (Field::Address, self.address.is_some()),
            (Field::Observations, self.observations.is_some()),
            (Field::Role, self.role.is_some()),
            (Field::IsActive, self.is_active.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, set)| set.then_some(field))
        .collect()
    }

    /// Apply the patch to a draft.
    pub fn apply_to_draft(&self, draft: &mut UserDraft) {
        if let Some(name) = &self.name {
            draft.name.clone_from(name);
        }
        if let Some(last_name) = &self.last_name {
            draft.last_name.clone_from(last_name);
        }
        if let Some(email) = &self.email {
            draft.email.clone_from(email);
        }
        if let Some(dni) = &self.dni {
            draft.dni.clone_from(dni);
        }
        if let Some(phone) = &self.phone {
            draft.phone.clone_from(phone);
        }
        if let Some(birth_date) = self.birth_date {
            draft.birth_date = birth_date;
        }
        if let Some(address) = &self.address {
            draft.address.clone_from(address);
        }
        if let Some(observations) = &self.observations {
            draft.observations.clone_from(observations);
        }
        if let Some(role) = self.role {
            draft.role = role;
        }
        if let Some(is_active) = self.is_active {
            draft.is_active = is_active;
        }
    }

    /// Apply the patch to a stored record.
    ///
    /// `id`, `join_date` and `is_online` are never touched.
    pub fn apply(&self, record: &mut UserRecord) {
        let mut draft = UserDraft::from_record(record);
        self.apply_to_draft(&mut draft);

        record.name = draft.name;
        record.last_name = draft.last_name;
        record.email = draft.email;
        record.dni = draft.dni;
        record.phone = draft.phone;
        record.birth_date = draft.birth_date;
        record.address = Some(draft.address).filter(|s| !s.is_empty());
        record.observations = Some(draft.observations).filter(|s| !s.is_empty());
        record.role = draft.role;
        record.is_active = draft.is_active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::fixtures::{date, record};

    #[test]
    fn test_identical_draft_yields_empty_patch() {
        let original = record(1, "Ana");
        let draft = UserDraft::from_record(&original);

        let patch = UserPatch::diff(&original, &draft);
        assert!(patch.is_empty());
        assert_eq!(patch, UserPatch::default());
    }

    #[test]
    fn test_only_differing_keys_are_included() {
        let original = record(1, "Ana");
        let mut draft = UserDraft::from_record(&original);
        draft.email = "new@x.com".to_string();

        let patch = UserPatch::diff(&original, &draft);
        assert_eq!(patch.changed_fields(), vec![Field::Email]);
        assert_eq!(patch.email.as_deref(), Some("new@x.com"));

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "email": "new@x.com" }));
    }

    #[test]
    fn test_absent_original_equals_empty_draft() {
        let mut original = record(1, "Ana");
        original.address = None;
        let mut draft = UserDraft::from_record(&original);
        draft.address = String::new();

        assert!(UserPatch::diff(&original, &draft).is_empty());

        draft.address = "Calle Mayor 1".to_string();
        let patch = UserPatch::diff(&original, &draft);
        assert_eq!(patch.address.as_deref(), Some("Calle Mayor 1"));
    }

    #[test]
    fn test_clearing_birth_date() {
        let original = record(1, "Ana");
        let mut draft = UserDraft::from_record(&original);
        draft.birth_date = None;

        let patch = UserPatch::diff(&original, &draft);
        assert_eq!(patch.birth_date, Some(None));
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"birth_date":null}"#
        );
    }

    #[test]
    fn test_multiple_changes_in_field_order() {
        let original = record(1, "Ana");
        let mut draft = UserDraft::from_record(&original);
        draft.is_active = false;
        draft.role = Role::Professional;
        draft.name = "Anabel".to_string();

        let patch = UserPatch::diff(&original, &draft);
        assert_eq!(
            patch.changed_fields(),
            vec![Field::Name, Field::Role, Field::IsActive]
        );
    }

    #[test]
    fn test_apply_updates_record_and_keeps_identity() {
        let mut user = record(4, "Laura");
        user.address = Some("Old street".to_string());
        let join_date = user.join_date;

        let patch = UserPatch {
            phone: Some("+33 612345678".to_string()),
            birth_date: Some(Some(date(1945, 5, 8))),
            address: Some(String::new()),
            ..UserPatch::default()
        };
        patch.apply(&mut user);

        assert_eq!(user.id, 4);
        assert_eq!(user.join_date, join_date);
        assert_eq!(user.phone, "+33 612345678");
        assert_eq!(user.birth_date, Some(date(1945, 5, 8)));
        assert!(user.address.is_none());
        assert_eq!(user.name, "Laura");
    }

    #[test]
    fn test_diff_then_apply_reaches_draft() {
        let mut user = record(2, "Carlos");
        let mut draft = UserDraft::from_record(&user);
        draft.last_name = "Mendoza".to_string();
        draft.observations = "Diabético".to_string();

        UserPatch::diff(&user, &draft).apply(&mut user);
        assert_eq!(UserDraft::from_record(&user), draft);
    }
}
