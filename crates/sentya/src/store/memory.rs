//! In-process user store.

use chrono::NaiveDate;
use tracing::debug;

use super::{ensure_unique, UserStore};
use crate::error::{Error, Result};
use crate::patch::UserPatch;
use crate::user::{NewUser, UserRecord};

/// A store that keeps users in memory for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: Vec<UserRecord>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with existing records.
    #[must_use]
    pub fn with_users(users: Vec<UserRecord>) -> Self {
        Self { users }
    }

    fn position(&self, id: i64) -> Result<usize> {
        self.users
            .iter()
            .position(|u| u.id == id)
            .ok_or(Error::UserNotFound { id })
    }
}

impl UserStore for MemoryStore {
    fn list(&self) -> Result<Vec<UserRecord>> {
        Ok(self.users.clone())
    }

    fn get(&self, id: i64) -> Result<Option<UserRecord>> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    fn insert(&mut self, user: NewUser, join_date: NaiveDate) -> Result<UserRecord> {
        ensure_unique(&self.users, &user.email, &user.dni, None)?;

        let id = self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let record = user.into_record(id, join_date);
        debug!(id, "Inserted user into memory store");
        self.users.push(record.clone());
        Ok(record)
    }

    fn update(&mut self, id: i64, patch: &UserPatch) -> Result<UserRecord> {
        let index = self.position(id)?;

        let mut updated = self.users[index].clone();
        patch.apply(&mut updated);
        ensure_unique(&self.users, &updated.email, &updated.dni, Some(id))?;

        self.users[index] = updated.clone();
        debug!(id, fields = patch.changed_fields().len(), "Updated user in memory store");
        Ok(updated)
    }

    fn set_online(&mut self, id: i64, online: bool) -> Result<()> {
        let index = self.position(id)?;
        self.users[index].is_online = online;
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.users.len())
    }
}
