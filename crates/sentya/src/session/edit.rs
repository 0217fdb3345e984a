use chrono::NaiveDate;
use tracing::{debug, error};

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::patch::UserPatch;
use crate::phone::PhoneNumber;
use crate::user::{self, Role, UserDraft, UserRecord};
use crate::validation::{ErrorMap, Field, Validator};

/// Editing state for one existing user.
///
/// The draft starts as a copy of the original record. Setting a field clears
/// any error previously reported for it; the error map is otherwise only
/// refreshed by [`validate`](Self::validate) or a submit.
#[derive(Debug, Clone)]
pub struct EditSession {
    original: UserRecord,
    draft: UserDraft,
    phone: PhoneNumber,
    errors: ErrorMap,
    saving: bool,
    validator: Validator,
    default_prefix: String,
}

impl EditSession {
    /// Open a session on `original`.
    #[must_use]
    pub fn open(original: UserRecord, validator: Validator, default_prefix: &str) -> Self {
        let draft = UserDraft::from_record(&original);
        let phone = PhoneNumber::split(&draft.phone, default_prefix);
        Self {
            original,
            draft,
            phone,
            errors: ErrorMap::new(),
            saving: false,
            validator,
            default_prefix: default_prefix.to_string(),
        }
    }

    /// The record as last saved.
    #[must_use]
    pub fn original(&self) -> &UserRecord {
        &self.original
    }

    /// The working copy.
    #[must_use]
    pub fn draft(&self) -> &UserDraft {
        &self.draft
    }

    /// The phone as shown in the prefix selector and number input.
    #[must_use]
    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    /// Errors from the last validation, minus fields edited since.
    #[must_use]
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Whether a submit is in flight.
    ///
    /// [`submit`](Self::submit) holds the session mutably while it runs, so
    /// this only reads `true` afterwards when a submit future was dropped
    /// before the backend answered. [`reset`](Self::reset) clears it.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Whether the draft differs from the original.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.patch().is_empty()
    }

    /// Whether the save action should be enabled.
    ///
    /// Requires at least one changed field, no errors showing and no save
    /// in flight.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.has_changes() && self.errors.is_valid() && !self.saving
    }

    /// The change set a submit would send.
    #[must_use]
    pub fn patch(&self) -> UserPatch {
        UserPatch::diff(&self.original, &self.draft)
    }

    /// The age shown next to the birth date.
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> Option<i32> {
        self.draft.age_on(today)
    }

    fn edited(&mut self, field: Field) {
        self.errors.remove(field);
    }

    /// Set the given name.
    pub fn set_name(&mut self, value: impl Into<String>) {
        self.draft.name = value.into();
        self.edited(Field::Name);
    }

    /// Set the family names.
    pub fn set_last_name(&mut self, value: impl Into<String>) {
        self.draft.last_name = value.into();
        self.edited(Field::LastName);
    }

    /// Set the email.
    pub fn set_email(&mut self, value: impl Into<String>) {
        self.draft.email = value.into();
        self.edited(Field::Email);
    }

    /// Set the DNI or NIE.
    pub fn set_dni(&mut self, value: impl Into<String>) {
        self.draft.dni = value.into();
        self.edited(Field::Dni);
    }

    /// Set or clear the birth date.
    pub fn set_birth_date(&mut self, value: Option<NaiveDate>) {
        self.draft.birth_date = value;
        self.edited(Field::BirthDate);
    }

    /// Set the postal address.
    pub fn set_address(&mut self, value: impl Into<String>) {
        self.draft.address = value.into();
        self.edited(Field::Address);
    }

    /// Set the observations.
    pub fn set_observations(&mut self, value: impl Into<String>) {
        self.draft.observations = value.into();
        self.edited(Field::Observations);
    }

    /// Set the role.
    pub fn set_role(&mut self, value: Role) {
        self.draft.role = value;
        self.edited(Field::Role);
    }

    /// Enable or disable the account.
    pub fn set_active(&mut self, value: bool) {
        self.draft.is_active = value;
        self.edited(Field::IsActive);
    }

    /// Replace the whole phone, re-splitting it.
    pub fn set_phone(&mut self, value: &str) {
        self.update_phone(PhoneNumber::split(value, &self.default_prefix));
    }

    /// Choose a different dialing prefix.
    pub fn set_phone_prefix(&mut self, prefix: impl Into<String>) {
        self.update_phone(self.phone.with_prefix(prefix));
    }

    /// Change the national number.
    pub fn set_phone_number(&mut self, number: impl Into<String>) {
        self.update_phone(self.phone.with_number(number));
    }

    fn update_phone(&mut self, phone: PhoneNumber) {
        self.draft.phone = phone.compose();
        self.phone = phone;
        self.edited(Field::Phone);
    }

    /// Validate the draft, replacing the error map.
    ///
    /// Returns `true` if the draft is valid.
    pub fn validate(&mut self, today: NaiveDate) -> bool {
        self.errors = self.validator.validate(&self.draft, today);
        self.errors.is_valid()
    }

    /// Discard all edits.
    pub fn reset(&mut self) {
        self.load(self.original.clone());
    }

    fn load(&mut self, original: UserRecord) {
        self.draft = UserDraft::from_record(&original);
        self.phone = PhoneNumber::split(&self.draft.phone, &self.default_prefix);
        self.errors = ErrorMap::new();
        self.saving = false;
        self.original = original;
    }

    /// Save the changes through `backend`.
    ///
    /// On success the saved record becomes the new original. On failure the
    /// draft is kept so the administrator can retry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoChanges`] when nothing was edited,
    /// [`Error::Validation`] when the draft is invalid, or whatever the
    /// backend reports.
    pub async fn submit<B: Backend + ?Sized>(&mut self, backend: &B) -> Result<UserRecord> {
        let patch = self.patch();
        if patch.is_empty() {
            return Err(Error::NoChanges);
        }
        if !self.validate(user::today()) {
            debug!(errors = %self.errors, "Edit blocked by validation");
            return Err(Error::Validation(self.errors.clone()));
        }

        self.saving = true;
        let result = backend.edit_user(self.original.id, &patch).await;
        self.saving = false;

        match result {
            Ok(record) => {
                self.load(record.clone());
                Ok(record)
            }
            Err(err) => {
                error!(id = self.original.id, error = %err, "Failed to save user");
                if let Some(errors) = err.field_errors() {
                    self.errors = errors.clone();
                }
                Err(err)
            }
        }
    }
}
