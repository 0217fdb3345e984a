//! Command-line interface for sentya.
//!
//! This module provides the CLI structure and command handlers for the
//! `sentya` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CheckCommand, ConfigCommand, DraftArgs, ListCommand, OutputFormat, PhoneCommand, RoleArg,
    UserCommand,
};

use crate::logging::Verbosity;

/// sentya - Manage users of the Sentya senior-care platform
///
/// Register, edit and list the seniors, professionals and staff of the
/// platform, with the same validation the admin dashboard applies.
#[derive(Debug, Parser)]
#[command(name = "sentya")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),

    /// Validate user fields without storing anything
    Check(CheckCommand),

    /// Phone prefix helpers
    #[command(subcommand)]
    Phone(PhoneCommand),

    /// Open an administrator session
    Login {
        /// Administrator email
        email: String,

        /// Password
        #[arg(short, long, default_value = "")]
        password: String,
    },

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "sentya");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["sentya", "config", "path"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["sentya", "-v", "config", "path"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["sentya", "-vv", "config", "path"]).verbosity(), Verbosity::Trace);
        assert_eq!(parse(&["sentya", "-q", "config", "path"]).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_parse_user_add() {
        let cli = parse(&[
            "sentya",
            "user",
            "add",
            "--name",
            "Ana",
            "--dni",
            "12345678Z",
            "--role",
            "css-technician",
        ]);
        match cli.command {
            Command::User(UserCommand::Add(args)) => {
                assert_eq!(args.name.as_deref(), Some("Ana"));
                assert_eq!(args.role, Some(RoleArg::CssTechnician));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_user_edit() {
        let cli = parse(&["sentya", "user", "edit", "3", "--email", "new@x.com"]);
        match cli.command {
            Command::User(UserCommand::Edit { id, fields, clear_birth_date }) => {
                assert_eq!(id, 3);
                assert_eq!(fields.email.as_deref(), Some("new@x.com"));
                assert!(!clear_birth_date);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_edit_rejects_birth_date_with_clear() {
        let result = Cli::try_parse_from([
            "sentya",
            "user",
            "edit",
            "3",
            "--birth-date",
            "1950-01-01",
            "--clear-birth-date",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_phone_conflicts_with_parts() {
        let result = Cli::try_parse_from([
            "sentya", "check", "--phone", "+34 612345678", "--number", "612345678",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_user_list() {
        let cli = parse(&["sentya", "user", "list", "-s", "ana", "--online", "-w", "500"]);
        match cli.command {
            Command::User(UserCommand::List(cmd)) => {
                assert_eq!(cmd.search.as_deref(), Some("ana"));
                assert_eq!(cmd.online_filter(), Some(true));
                assert_eq!(cmd.width, 500);
                assert_eq!(cmd.page, 1);
                assert_eq!(cmd.format, OutputFormat::Table);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_phone_split() {
        let cli = parse(&["sentya", "phone", "split", "+351 912345678"]);
        assert!(matches!(
            cli.command,
            Command::Phone(PhoneCommand::Split { json: false, .. })
        ));
    }

    #[test]
    fn test_parse_login() {
        let cli = parse(&["sentya", "login", "admin@sentya.es", "-p", "secret"]);
        match cli.command {
            Command::Login { email, password } => {
                assert_eq!(email, "admin@sentya.es");
                assert_eq!(password, "secret");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = parse(&["sentya", "config", "validate", "--file", "/tmp/c.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_global_config_flag() {
        let cli = parse(&["sentya", "user", "show", "1", "--config", "/tmp/c.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }
}
