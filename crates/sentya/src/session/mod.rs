//! Form state for editing and registering users.
//!
//! [`EditSession`] backs the edit drawer opened from the dashboard list.
//! [`RegistrationWizard`] backs the three-step registration dialog. Both keep
//! the phone split into prefix and number and submit through a
//! [`Backend`](crate::backend::Backend).

mod edit;
mod wizard;

pub use edit::EditSession;
pub use wizard::{RegistrationWizard, WizardStep};
