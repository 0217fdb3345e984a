//! User stores.
//!
//! Every component that reads or writes users does so through the
//! [`UserStore`] trait, so tests and tools can run against an isolated
//! [`MemoryStore`] while the CLI persists to [`SqliteStore`].

mod memory;
pub mod migrations;
pub mod schema;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::patch::UserPatch;
use crate::user::{NewUser, UserRecord};

/// Persistent collection of users.
///
/// Stores enforce that `id`, `email` and `dni` are unique. They do not
/// validate field formats; callers validate before writing.
pub trait UserStore: Send {
    /// All users in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list(&self) -> Result<Vec<UserRecord>>;

    /// A user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, id: i64) -> Result<Option<UserRecord>>;

    /// Insert a new user, assigning its ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the email or DNI is already registered.
    fn insert(&mut self, user: NewUser, join_date: NaiveDate) -> Result<UserRecord>;

    /// Apply a change set to an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] for an unknown ID and
    /// [`Error::Conflict`] if the change collides with another user.
    fn update(&mut self, id: i64, patch: &UserPatch) -> Result<UserRecord>;

    /// Mark a user as online or offline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] for an unknown ID.
    fn set_online(&mut self, id: i64, online: bool) -> Result<()>;

    /// Number of stored users.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn count(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }
}

/// Reject `email` or `dni` if a user other than `except` already holds it.
fn ensure_unique<'a>(
    users: impl IntoIterator<Item = &'a UserRecord>,
    email: &str,
    dni: &str,
    except: Option<i64>,
) -> Result<()> {
    for user in users {
        if Some(user.id) == except {
            continue;
        }
        if user.email.eq_ignore_ascii_case(email) {
            return Err(Error::conflict("email", email));
        }
        if user.dni == dni {
            return Err(Error::conflict("dni", dni));
        }
    }
    Ok(())
}
