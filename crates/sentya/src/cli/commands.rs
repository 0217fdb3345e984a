//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::error::Result;
use crate::phone::PhoneNumber;
use crate::session::EditSession;
use crate::user::{parse_date, Role, UserDraft};

/// User management commands.
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a new user
    Add(DraftArgs),

    /// List users with optional filters
    List(ListCommand),

    /// Show a single user
    Show {
        /// User ID
        id: i64,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change fields of an existing user
    Edit {
        /// User ID
        id: i64,

        /// Fields to change
        #[command(flatten)]
        fields: DraftArgs,

        /// Remove the stored birth date
        #[arg(long, conflicts_with = "birth_date")]
        clear_birth_date: bool,
    },

    /// Mark a user as online or offline
    Online {
        /// User ID
        id: i64,

        /// Mark offline instead
        #[arg(long)]
        off: bool,
    },
}

/// User fields accepted on the command line.
///
/// Unset fields keep their current value when editing and stay empty when
/// registering.
#[derive(Debug, Default, Args)]
pub struct DraftArgs {
    /// Given name
    #[arg(long)]
    pub name: Option<String>,

    /// Family names
    #[arg(long)]
    pub last_name: Option<String>,

    /// Contact email
    #[arg(long)]
    pub email: Option<String>,

    /// DNI or NIE
    #[arg(long)]
    pub dni: Option<String>,

    /// Full phone, e.g. "+34 612345678"
    #[arg(long, conflicts_with_all = ["prefix", "number"])]
    pub phone: Option<String>,

    /// Dialing prefix, e.g. "+351"
    #[arg(long)]
    pub prefix: Option<String>,

    /// National number
    #[arg(long)]
    pub number: Option<String>,

    /// Birth date (YYYY-MM-DD)
    #[arg(long)]
    pub birth_date: Option<String>,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub observations: Option<String>,

    /// Role
    #[arg(long, value_enum)]
    pub role: Option<RoleArg>,

    /// Account enabled
    #[arg(long)]
    pub active: Option<bool>,
}

impl DraftArgs {
    /// Build a registration draft from the given fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the birth date cannot be parsed.
    pub fn to_draft(&self, default_prefix: &str) -> Result<UserDraft> {
        let phone = match &self.phone {
            Some(phone) => PhoneNumber::split(phone, default_prefix),
            None => PhoneNumber::new(
                self.prefix.as_deref().unwrap_or(default_prefix),
                self.number.as_deref().unwrap_or_default(),
            ),
        };

        let defaults = UserDraft::default();
        Ok(UserDraft {
            name: self.name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            dni: self.dni.clone().unwrap_or_default(),
            phone: if phone.number().is_empty() {
                String::new()
            } else {
                phone.compose()
            },
            birth_date: self.birth_date.as_deref().map(parse_date).transpose()?,
            address: self.address.clone().unwrap_or_default(),
            observations: self.observations.clone().unwrap_or_default(),
            role: self.role.map_or(defaults.role, Role::from),
            is_active: self.active.unwrap_or(defaults.is_active),
        })
    }

    /// Apply the given fields to an edit session.
    ///
    /// # Errors
    ///
    /// Returns an error if the birth date cannot be parsed.
    pub fn apply_to(&self, session: &mut EditSession) -> Result<()> {
        if let Some(name) = &self.name {
            session.set_name(name.as_str());
        }
        if let Some(last_name) = &self.last_name {
            session.set_last_name(last_name.as_str());
        }
        if let Some(email) = &self.email {
            session.set_email(email.as_str());
        }
        if let Some(dni) = &self.dni {
            session.set_dni(dni.as_str());
        }
        if let Some(phone) = &self.phone {
            session.set_phone(phone);
        }
        if let Some(prefix) = &self.prefix {
            session.set_phone_prefix(prefix.as_str());
        }
        if let Some(number) = &self.number {
            session.set_phone_number(number.as_str());
        }
        if let Some(birth_date) = &self.birth_date {
            session.set_birth_date(Some(parse_date(birth_date)?));
        }
        if let Some(address) = &self.address {
            session.set_address(address.as_str());
        }
        if let Some(observations) = &self.observations {
            session.set_observations(observations.as_str());
        }
        if let Some(role) = self.role {
            session.set_role(role.into());
        }
        if let Some(active) = self.active {
            session.set_active(active);
        }
        Ok(())
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Search name, family names, email, phone or role
    #[arg(short, long)]
    pub search: Option<String>,

    /// Only users with this role
    #[arg(short, long, value_enum)]
    pub role: Option<RoleArg>,

    /// Only users currently online
    #[arg(long, conflicts_with = "offline")]
    pub online: bool,

    /// Only users currently offline
    #[arg(long)]
    pub offline: bool,

    /// Page to show (1-based)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Viewport width used to pick the page size
    #[arg(short, long, default_value = "1024")]
    pub width: u32,

    /// Show dashboard totals instead of the list
    #[arg(long)]
    pub stats: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl ListCommand {
    /// The online filter implied by `--online` / `--offline`.
    #[must_use]
    pub fn online_filter(&self) -> Option<bool> {
        match (self.online, self.offline) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Check command arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Fields to validate
    #[command(flatten)]
    pub fields: DraftArgs,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Phone helper commands.
#[derive(Debug, Subcommand)]
pub enum PhoneCommand {
    /// Split a stored phone into prefix and number
    Split {
        /// Stored phone value
        value: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List dialing codes, optionally filtered
    Countries {
        /// Country name, ISO code or dialing code
        query: Option<String>,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Role argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    /// Platform administrator
    Administrator,
    /// Programme coordinator
    Coordinator,
    /// Workshop professional
    Professional,
    /// Social services centre technician
    CssTechnician,
    /// Senior receiving care
    Client,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Administrator => Self::Administrator,
            RoleArg::Coordinator => Self::Coordinator,
            RoleArg::Professional => Self::Professional,
            RoleArg::CssTechnician => Self::CssTechnician,
            RoleArg::Client => Self::Client,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::fixtures::{date, record};
    use crate::validation::Validator;

    #[test]
    fn test_role_arg_conversion() {
        assert_eq!(Role::from(RoleArg::CssTechnician), Role::CssTechnician);
        assert_eq!(Role::from(RoleArg::Client), Role::Client);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_to_draft_composes_phone_parts() {
        let args = DraftArgs {
            name: Some("Ana".to_string()),
            prefix: Some("+351".to_string()),
            number: Some("912345678".to_string()),
            birth_date: Some("1950-03-14".to_string()),
            ..DraftArgs::default()
        };

        let draft = args.to_draft("+34").unwrap();
        assert_eq!(draft.name, "Ana");
        assert_eq!(draft.phone, "+351 912345678");
        assert_eq!(draft.birth_date, Some(date(1950, 3, 14)));
        assert_eq!(draft.role, Role::Client);
        assert!(draft.is_active);
    }

    #[test]
    fn test_to_draft_without_number_leaves_phone_empty() {
        let draft = DraftArgs::default().to_draft("+34").unwrap();
        assert!(draft.phone.is_empty());
    }

    #[test]
    fn test_to_draft_rejects_bad_date() {
        let args = DraftArgs {
            birth_date: Some("14/03/1950".to_string()),
            ..DraftArgs::default()
        };
        assert!(args.to_draft("+34").is_err());
    }

    #[test]
    fn test_apply_to_session_only_touches_given_fields() {
        let mut session = EditSession::open(record(1, "Ana"), Validator::new(), "+34");
        let args = DraftArgs {
            prefix: Some("+33".to_string()),
            role: Some(RoleArg::Coordinator),
            ..DraftArgs::default()
        };

        args.apply_to(&mut session).unwrap();
        assert_eq!(session.draft().phone, "+33 612345678");
        assert_eq!(session.draft().role, Role::Coordinator);
        assert_eq!(session.draft().name, "Ana");
    }

    #[test]
    fn test_online_filter() {
        let mut cmd = ListCommand {
            search: None,
            role: None,
            online: false,
            offline: false,
            page: 1,
            width: 1024,
            stats: false,
            format: OutputFormat::Table,
        };
        assert_eq!(cmd.online_filter(), None);

        cmd.offline = true;
        assert_eq!(cmd.online_filter(), Some(false));

        cmd.online = true;
        assert_eq!(cmd.online_filter(), Some(true));
    }
}
