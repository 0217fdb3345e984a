use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error};

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::phone::PhoneNumber;
use crate::user::{self, UserDraft, UserRecord};
use crate::validation::{ErrorMap, Field, Validator};

/// A step of the registration dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Name, family names, identity document and birth date.
    Personal,
    /// Email, phone and address.
    Contact,
    /// Role, activation and observations.
    Account,
}

impl WizardStep {
    /// Steps in order.
    pub const ALL: [Self; 3] = [Self::Personal, Self::Contact, Self::Account];

    /// Fields entered on this step.
    #[must_use]
    pub fn fields(self) -> &'static [Field] {
        match self {
            Self::Personal => &[Field::Name, Field::LastName, Field::Dni, Field::BirthDate],
            Self::Contact => &[Field::Email, Field::Phone, Field::Address],
            Self::Account => &[Field::Role, Field::IsActive, Field::Observations],
        }
    }

    /// One-based position, as shown in "step 2 of 3".
    #[must_use]
    pub fn number(self) -> usize {
        match self {
            Self::Personal => 1,
            Self::Contact => 2,
            Self::Account => 3,
        }
    }

    /// The following step, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Personal => Some(Self::Contact),
            Self::Contact => Some(Self::Account),
            Self::Account => None,
        }
    }

    /// The preceding step, if any.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Personal => None,
            Self::Contact => Some(Self::Personal),
            Self::Account => Some(Self::Contact),
        }
    }
}

/// State of the three-step registration dialog.
#[derive(Debug, Clone)]
pub struct RegistrationWizard {
    step: WizardStep,
    draft: UserDraft,
    phone: PhoneNumber,
    errors: ErrorMap,
    saving: bool,
    validator: Validator,
}

impl RegistrationWizard {
    /// Start an empty registration.
    #[must_use]
    pub fn new(validator: Validator, default_prefix: &str) -> Self {
        let phone = PhoneNumber::new(default_prefix, "");
        let draft = UserDraft {
            phone: phone.compose(),
            ..UserDraft::default()
        };
        Self {
            step: WizardStep::Personal,
            draft,
            phone,
            errors: ErrorMap::new(),
            saving: false,
            validator,
        }
    }

    /// The current step.
    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// The data entered so far.
    #[must_use]
    pub fn draft(&self) -> &UserDraft {
        &self.draft
    }

    /// Mutable access to the data entered so far.
    ///
    /// Use [`set_phone_prefix`](Self::set_phone_prefix) and
    /// [`set_phone_number`](Self::set_phone_number) for the phone.
    pub fn draft_mut(&mut self) -> &mut UserDraft {
        &mut self.draft
    }

    /// The phone as shown in the prefix selector and number input.
    #[must_use]
    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    /// Errors reported by the last step check or submit.
    #[must_use]
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Whether a submit is in flight.
    ///
    /// [`submit`](Self::submit) holds the wizard mutably while it runs, so
    /// this only reads `true` afterwards when a submit future was dropped
    /// before the backend answered. [`reset`](Self::reset) clears it.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Whether this is the last step.
    #[must_use]
    pub fn is_last_step(&self) -> bool {
        self.step.next().is_none()
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
        self.errors.remove(Field::Phone);
    }

    /// Check only the current step's fields.
    pub fn validate_step(&mut self, today: NaiveDate) -> bool {
        self.errors = self
            .validator
            .validate_fields(&self.draft, today, self.step.fields());
        self.errors.is_valid()
    }

    /// Advance if the current step's fields are valid.
    ///
    /// Returns `true` if the wizard moved. The last step never advances.
    pub fn next(&mut self, today: NaiveDate) -> bool {
        let Some(next) = self.step.next() else {
            return false;
        };
        if !self.validate_step(today) {
            debug!(step = self.step.number(), errors = %self.errors, "Step incomplete");
            return false;
        }
        self.step = next;
        true
    }

    /// Go back one step without validating.
    pub fn back(&mut self) {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
            self.errors = ErrorMap::new();
        }
    }

    /// Clear everything and return to the first step.
    pub fn reset(&mut self) {
        let prefix = self.phone.prefix().to_string();
        *self = Self::new(self.validator, &prefix);
    }

    /// Validate every field and register the user through `backend`.
    ///
    /// On success the wizard is reset for the next registration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if any field is invalid, or whatever
    /// the backend reports. The entered data is kept on failure.
    pub async fn submit<B: Backend + ?Sized>(&mut self, backend: &B) -> Result<UserRecord> {
        self.errors = self.validator.validate(&self.draft, user::today());
        if !self.errors.is_valid() {
            return Err(Error::Validation(self.errors.clone()));
        }

        self.saving = true;
        let result = backend.create_user(&self.draft).await;
        self.saving = false;

        match result {
            Ok(record) => {
                self.reset();
                Ok(record)
            }
            Err(err) => {
                error!(error = %err, "Failed to register user");
                if let Some(errors) = err.field_errors() {
                    self.errors = errors.clone();
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::backend::LocalBackend;
    use crate::store::{MemoryStore, UserStore};
    use crate::user::fixtures::{date, record, valid_draft};
    use crate::validation::FieldError;

    fn today() -> NaiveDate {
        date(2024, 6, 15)
    }

    fn wizard() -> RegistrationWizard {
        RegistrationWizard::new(Validator::new(), "+34")
    }

    fn fill_personal(wizard: &mut RegistrationWizard) {
        let filled = valid_draft();
        let draft = wizard.draft_mut();
        draft.name = filled.name;
        draft.last_name = filled.last_name;
        draft.dni = filled.dni;
        draft.birth_date = filled.birth_date;
    }

    #[test]
    fn test_starts_on_personal_with_default_prefix() {
        let wizard = wizard();
        assert_eq!(wizard.step(), WizardStep::Personal);
        assert_eq!(wizard.step().number(), 1);
        assert_eq!(wizard.draft().phone, "+34");
    }

    #[test]
    fn test_next_validates_only_current_step() {
        let mut wizard = wizard();
        assert!(!wizard.next(today()));
        assert_eq!(wizard.step(), WizardStep::Personal);
        assert_eq!(wizard.errors().get(Field::Name), Some(FieldError::Required));
        // Contact fields are not reported yet.
        assert!(wizard.errors().get(Field::Email).is_none());

        fill_personal(&mut wizard);
        assert!(wizard.next(today()));
        assert_eq!(wizard.step(), WizardStep::Contact);
        assert!(wizard.errors().is_empty());
    }

    #[test]
    fn test_underage_birth_date_blocks_personal_step() {
        let mut wizard = wizard();
        fill_personal(&mut wizard);
        wizard.draft_mut().birth_date = Some(date(2010, 1, 1));

        assert!(!wizard.next(today()));
        assert!(wizard.errors().get(Field::BirthDate).is_some());
    }

    #[test]
    fn test_back_never_validates() {
        let mut wizard = wizard();
        fill_personal(&mut wizard);
        assert!(wizard.next(today()));

        wizard.back();
        assert_eq!(wizard.step(), WizardStep::Personal);
        wizard.back();
        assert_eq!(wizard.step(), WizardStep::Personal);
    }

    #[test]
    fn test_last_step_does_not_advance() {
        let mut wizard = wizard();
        fill_personal(&mut wizard);
        wizard.draft_mut().email = "ana@example.com".to_string();
        wizard.set_phone_number("612345678");

        assert!(wizard.next(today()));
        assert!(wizard.next(today()));
        assert!(wizard.is_last_step());
        assert!(!wizard.next(today()));
    }

    #[test]
    fn test_phone_parts_compose() {
        let mut wizard = wizard();
        wizard.set_phone_number("612345678");
        wizard.set_phone_prefix("+351");
        assert_eq!(wizard.draft().phone, "+351 612345678");
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_submit_stays_saving_until_reset() {
        let backend = LocalBackend::new(
            MemoryStore::new(),
            Validator::new(),
            Duration::from_millis(1500),
        );
        let mut wizard = wizard();
        fill_personal(&mut wizard);
        wizard.draft_mut().email = "ana@example.com".to_string();
        wizard.set_phone_number("612345678");

        let pending =
            tokio::time::timeout(Duration::from_millis(10), wizard.submit(&backend)).await;
        assert!(pending.is_err());
        assert!(wizard.is_saving());

        wizard.reset();
        assert!(!wizard.is_saving());
        assert_eq!(backend.with_store(|s| s.count()).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_submit_validates_everything() {
        let backend = LocalBackend::new(MemoryStore::new(), Validator::new(), Duration::ZERO);
        let mut wizard = wizard();
        fill_personal(&mut wizard);

        let err = wizard.submit(&backend).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(wizard.errors().get(Field::Email), Some(FieldError::Required));
        assert_eq!(backend.with_store(|s| s.count()).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_submit_registers_and_resets() {
        let backend = LocalBackend::new(
            MemoryStore::with_users(vec![record(1, "Luis")]),
            Validator::new(),
            Duration::ZERO,
        );
        let mut wizard = wizard();
        fill_personal(&mut wizard);
        wizard.draft_mut().email = "ana@example.com".to_string();
        wizard.set_phone_number("612345678");

        let user = wizard.submit(&backend).await.unwrap();
        assert_eq!(user.id, 2);
        assert_eq!(user.phone, "+34 612345678");
        assert_eq!(wizard.step(), WizardStep::Personal);
        assert!(wizard.draft().name.is_empty());
    }

    #[tokio::test]
    async fn test_submit_conflict_keeps_data() {
        let backend = LocalBackend::new(
            MemoryStore::with_users(vec![record(1, "Ana")]),
            Validator::new(),
            Duration::ZERO,
        );
        let mut wizard = wizard();
        fill_personal(&mut wizard);
        wizard.draft_mut().email = "ana@example.com".to_string();
        wizard.set_phone_number("612345678");

        let err = wizard.submit(&backend).await.unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert_eq!(wizard.draft().email, "ana@example.com");
        assert!(!wizard.is_saving());
    }
}
