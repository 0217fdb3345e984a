//! The seam between forms and whatever persists users.
//!
//! Forms talk to a [`Backend`]. [`LocalBackend`] wraps a [`UserStore`] and
//! models a remote service: every call waits a fixed latency, then validates
//! and writes. Swapping in a networked implementation changes nothing for
//! callers.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::patch::UserPatch;
use crate::store::UserStore;
use crate::user::{self, NewUser, UserDraft, UserRecord};
use crate::validation::Validator;

/// An authenticated administrator session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Opaque session token.
    pub token: String,
    /// Email the session was opened with.
    pub email: String,
    /// When the session was issued.
    pub issued_at: DateTime<Utc>,
}

impl Session {
    /// Issue a session for `email` at `issued_at`.
    #[must_use]
    pub fn issue(email: &str, issued_at: DateTime<Utc>) -> Self {
        let email = email.trim().to_string();
        let token = blake3::hash(format!("{email}:{}", issued_at.to_rfc3339()).as_bytes())
            .to_hex()
            .to_string();
        Self {
            token,
            email,
            issued_at,
        }
    }
}

/// Operations the admin forms depend on.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Register a new user from a draft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the draft does not validate, or a
    /// store error if it cannot be written.
    async fn create_user(&self, draft: &UserDraft) -> Result<UserRecord>;

    /// Apply a change set to a user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoChanges`] for an empty patch,
    /// [`Error::UserNotFound`] for an unknown ID and [`Error::Validation`]
    /// if the patched user does not validate.
    async fn edit_user(&self, id: i64, patch: &UserPatch) -> Result<UserRecord>;

    /// Open an administrator session.
    ///
    /// # Errors
    ///
    /// Implementations may reject credentials.
    async fn login(&self, email: &str, password: &str) -> Result<Session>;
}

/// A backend over a local store with simulated network latency.
#[derive(Debug)]
pub struct LocalBackend<S> {
    store: Mutex<S>,
    validator: Validator,
    latency: Duration,
}

impl<S: UserStore> LocalBackend<S> {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: S, validator: Validator, latency: Duration) -> Self {
        Self {
            store: Mutex::new(store),
            validator,
            latency,
        }
    }

    /// Wrap a store using the configured age bounds and latency.
    #[must_use]
    pub fn from_config(store: S, config: &Config) -> Self {
        Self::new(
            store,
            Validator::with_bounds(config.validation.bounds()),
            config.simulated_latency(),
        )
    }

    /// The validator applied to every write.
    #[must_use]
    pub fn validator(&self) -> Validator {
        self.validator
    }

    /// Run `f` against the underlying store without any simulated delay.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or an internal error if the store lock
    /// is poisoned.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut S) -> Result<R>) -> Result<R> {
        let mut store = self.lock()?;
        f(&mut store)
    }

    /// Unwrap the underlying store.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the store lock is poisoned.
    pub fn into_store(self) -> Result<S> {
        self.store
            .into_inner()
            .map_err(|_| Error::internal("user store lock poisoned"))
    }

    fn lock(&self) -> Result<MutexGuard<'_, S>> {
        self.store
            .lock()
            .map_err(|_| Error::internal("user store lock poisoned"))
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl<S: UserStore> Backend for LocalBackend<S> {
    async fn create_user(&self, draft: &UserDraft) -> Result<UserRecord> {
        self.delay().await;

        let draft = draft.normalized();
        let errors = self.validator.validate(&draft, user::today());
        if !errors.is_valid() {
            warn!(%errors, "Rejected new user");
            return Err(Error::Validation(errors));
        }

        let record = self.lock()?.insert(NewUser::from_draft(&draft), user::today())?;
        info!(id = record.id, role = %record.role, "Registered user");
        Ok(record)
    }

    async fn edit_user(&self, id: i64, patch: &UserPatch) -> Result<UserRecord> {
        if patch.is_empty() {
            return Err(Error::NoChanges);
        }
        self.delay().await;

        let mut store = self.lock()?;
        let original = store.get(id)?.ok_or(Error::UserNotFound { id })?;

        let mut draft = UserDraft::from_record(&original);
        patch.apply_to_draft(&mut draft);
        let draft = draft.normalized();

        let errors = self.validator.validate(&draft, user::today());
        if !errors.is_valid() {
            warn!(id, %errors, "Rejected user edit");
            return Err(Error::Validation(errors));
        }

        let normalized = UserPatch::diff(&original, &draft);
        if normalized.is_empty() {
            debug!(id, "Edit only differed in whitespace or case");
            return Err(Error::NoChanges);
        }

        let record = store.update(id, &normalized)?;
        info!(id, fields = ?normalized.changed_fields(), "Updated user");
        Ok(record)
    }

    async fn login(&self, email: &str, _password: &str) -> Result<Session> {
        self.delay().await;

        let session = Session::issue(email, Utc::now());
        info!(email = %session.email, "Administrator signed in");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::user::fixtures::{record, valid_draft};
    use crate::user::Role;
    use crate::validation::{Field, FieldError};

    fn backend_with(users: Vec<UserRecord>) -> LocalBackend<MemoryStore> {
        LocalBackend::new(
            MemoryStore::with_users(users),
            Validator::new(),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_create_user_assigns_id_and_join_date() {
        let backend = backend_with(vec![record(1, "Carlos")]);

        let user = backend.create_user(&valid_draft()).await.unwrap();
        assert_eq!(user.id, 2);
        assert_eq!(user.join_date, crate::user::today());
        assert!(!user.is_online);
        assert_eq!(backend.with_store(|s| s.count()).unwrap(), 2);
    }

    #[tokio::test]
    async fn test_create_user_normalizes_draft() {
        let backend = backend_with(Vec::new());
        let mut draft = valid_draft();
        draft.name = "  Ana  ".to_string();
        draft.dni = "x1234567l".to_string();

        let user = backend.create_user(&draft).await.unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.dni, "X1234567L");
    }

    #[tokio::test]
    async fn test_create_user_rejects_invalid_draft() {
        let backend = backend_with(Vec::new());
        let mut draft = valid_draft();
        draft.email = "not-an-email".to_string();

        let err = backend.create_user(&draft).await.unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.get(Field::Email), Some(FieldError::InvalidFormat));
        assert_eq!(backend.with_store(|s| s.count()).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_edit_user_applies_only_changes() {
        let backend = backend_with(vec![record(1, "Ana")]);
        let patch = UserPatch {
            role: Some(Role::Coordinator),
            ..UserPatch::default()
        };

        let user = backend.edit_user(1, &patch).await.unwrap();
        assert_eq!(user.role, Role::Coordinator);
        assert_eq!(user.name, "Ana");
    }

    #[tokio::test]
    async fn test_edit_user_rejects_empty_patch() {
        let backend = backend_with(vec![record(1, "Ana")]);
        let err = backend.edit_user(1, &UserPatch::default()).await.unwrap_err();
        assert!(matches!(err, Error::NoChanges));
    }

    #[tokio::test]
    async fn test_edit_user_whitespace_only_change_is_no_change() {
        let backend = backend_with(vec![record(1, "Ana")]);
        let patch = UserPatch {
            name: Some(" Ana ".to_string()),
            ..UserPatch::default()
        };
        let err = backend.edit_user(1, &patch).await.unwrap_err();
        assert!(matches!(err, Error::NoChanges));
    }

    #[tokio::test]
    async fn test_edit_user_unknown_id() {
        let backend = backend_with(Vec::new());
        let patch = UserPatch {
            name: Some("Eva".to_string()),
            ..UserPatch::default()
        };
        assert!(backend.edit_user(7, &patch).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_edit_user_validates_patched_record() {
        let backend = backend_with(vec![record(1, "Ana")]);
        let patch = UserPatch {
            phone: Some(String::new()),
            ..UserPatch::default()
        };

        let err = backend.edit_user(1, &patch).await.unwrap_err();
        assert!(err.is_validation());
        let stored = backend.with_store(|s| s.get(1)).unwrap().unwrap();
        assert_eq!(stored.phone, "+34 612345678");
    }

    #[tokio::test]
    async fn test_login_always_succeeds() {
        let backend = backend_with(Vec::new());
        let session = backend.login(" admin@sentya.es ", "whatever").await.unwrap();

        assert_eq!(session.email, "admin@sentya.es");
        assert_eq!(session.token.len(), 64);
    }

    #[test]
    fn test_session_token_depends_on_email_and_time() {
        let now = Utc::now();
        let a = Session::issue("a@x.com", now);
        let b = Session::issue("b@x.com", now);
        let a_later = Session::issue("a@x.com", now + chrono::Duration::seconds(1));

        assert_eq!(a, Session::issue("a@x.com", now));
        assert_ne!(a.token, b.token);
        assert_ne!(a.token, a_later.token);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let backend = LocalBackend::new(
            MemoryStore::new(),
            Validator::new(),
            Duration::from_millis(1500),
        );

        let start = tokio::time::Instant::now();
        backend.login("admin@sentya.es", "x").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }
}
