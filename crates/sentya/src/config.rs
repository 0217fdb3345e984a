//! Configuration management for sentya.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::listing::PageSizing;
use crate::phone::DEFAULT_PREFIX;
use crate::validation::AgeBounds;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "sentya";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "users.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SENTYA_`, sections separated by `__`)
/// 2. TOML config file at `~/.config/sentya/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Dashboard listing configuration.
    pub listing: PageSizing,
    /// Phone handling configuration.
    pub phone: PhoneConfig,
    /// Field validation configuration.
    pub validation: ValidationConfig,
    /// Backend seam configuration.
    pub backend: BackendConfig,
}

/// Which store implementation holds users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// `SQLite` database on disk.
    #[default]
    Sqlite,
    /// Process memory; lost on exit.
    Memory,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Store implementation.
    pub kind: StoreKind,
    /// Path to the database file.
    /// Defaults to `~/.local/share/sentya/users.db`
    pub database_path: Option<PathBuf>,
}

/// Phone-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneConfig {
    /// Prefix assumed for numbers without a recognised dialing code.
    pub default_prefix: String,
}

/// Validation-related configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Youngest accepted age.
    pub min_age: i32,
    /// Oldest accepted age.
    pub max_age: i32,
}

/// Backend-related configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Fixed delay before every backend call completes, in milliseconds.
    pub simulated_latency_ms: u64,
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            default_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        let bounds = AgeBounds::default();
        Self {
            min_age: bounds.min,
            max_age: bounds.max,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            simulated_latency_ms: 1500,
        }
    }
}

impl ValidationConfig {
    /// The configured age bounds.
    #[must_use]
    pub fn bounds(&self) -> AgeBounds {
        AgeBounds {
            min: self.min_age,
            max: self.max_age,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `SENTYA_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("SENTYA_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.validation.min_age < 0 {
            return Err(Error::ConfigValidation {
                message: format!("min_age ({}) cannot be negative", self.validation.min_age),
            });
        }

        if self.validation.min_age > self.validation.max_age {
            return Err(Error::ConfigValidation {
                message: format!(
                    "min_age ({}) cannot be greater than max_age ({})",
                    self.validation.min_age, self.validation.max_age
                ),
            });
        }

        if self.listing.narrow_page_size == 0 || self.listing.wide_page_size == 0 {
            return Err(Error::ConfigValidation {
                message: "page sizes must be greater than 0".to_string(),
            });
        }

        let prefix = &self.phone.default_prefix;
        let digits = prefix.strip_prefix('+').unwrap_or_default();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::ConfigValidation {
                message: format!("invalid default_prefix: {prefix}"),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the simulated backend latency as a Duration.
    #[must_use]
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.backend.simulated_latency_ms)
    }
}
