//! `sentya` - User records for the Sentya senior-care platform
//!
//! This library provides the validation, phone handling, change-set and
//! listing rules behind the admin dashboard, plus the stores and backend
//! seam the forms submit through.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod listing;
pub mod logging;
pub mod patch;
pub mod phone;
pub mod session;
pub mod store;
pub mod user;
pub mod validation;

pub use backend::{Backend, LocalBackend, Session};
pub use config::Config;
pub use error::{Error, Result};
pub use listing::{DashboardStats, Listing, ListingFilter, Page, PageSizing};
pub use logging::init_logging;
pub use patch::UserPatch;
pub use phone::PhoneNumber;
pub use session::{EditSession, RegistrationWizard, WizardStep};
pub use store::{MemoryStore, SqliteStore, UserStore};
pub use user::{NewUser, Role, UserDraft, UserRecord};
pub use validation::{ErrorMap, Field, FieldError, Validator};
