//! Configuration handling for the library ledger
//!
//! Configuration is stored in `.library/config.toml` (library) and
//! `~/.config/library-ledger/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AdminCredentials, LedgerConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Longest loan period accepted, one hundred years
pub const MAX_LOAN_PERIOD_DAYS: u32 = 36_500;

/// Library-level configuration: lending rules and the admin pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LibraryConfig {
    /// Days a copy may be kept before it is overdue
    pub loan_period_days: u32,

    /// Fine per whole overdue day, in currency units
    pub fine_per_day: u64,

    /// Credentials for admin-only commands
    pub admin: AdminCredentials,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            loan_period_days: 14,
            fine_per_day: 1,
            admin: AdminCredentials::default(),
        }
    }
}

impl LibraryConfig {
    /// Rejects settings the ledger cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loan_period_days == 0 {
            return Err(ConfigError::Invalid(
                "loan_period_days must be at least 1".to_string(),
            ));
        }
        if self.loan_period_days > MAX_LOAN_PERIOD_DAYS {
            return Err(ConfigError::Invalid(format!(
                "loan_period_days must be at most {}",
                MAX_LOAN_PERIOD_DAYS
            )));
        }
        Ok(())
    }

    /// Commented config file written by `library init`
    pub fn default_file_contents() -> Result<String> {
        let body = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default library config")?;
        Ok(format!(
            "# Library ledger configuration\n\
             # loan_period_days: days before a borrowed copy is overdue\n\
             # fine_per_day: fine per whole overdue day, in currency units\n\
             # [admin]: credentials for admin-only commands\n\n{}",
            body
        ))
    }

    /// Lending rules handed to the ledger
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig::new(self.loan_period_days, self.fine_per_day)
    }
}

/// Output format preference
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormatPreference {
    #[default]
    Text,
    Json,
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: FormatPreference,

    /// Name used for borrow/return when none is given
    pub borrower_name: Option<String>,
}

impl GlobalConfig {
    /// Loads the global configuration, or defaults if there is none
    pub fn load() -> Result<Self> {
        let config_dir = match Config::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(Self::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Gets the borrower name from config, then `$LIBRARY_BORROWER`
    pub fn effective_borrower(&self) -> Option<String> {
        self.borrower_name
            .clone()
            .or_else(|| std::env::var("LIBRARY_BORROWER").ok())
            .filter(|name| !name.trim().is_empty())
    }
}

/// Combined configuration (global + library)
#[derive(Debug, Clone)]
pub struct Config {
    pub library: LibraryConfig,
    pub global: GlobalConfig,
}

impl Config {
    /// Loads configuration for a specific library
    pub fn for_library(library_root: &Path) -> Result<Self> {
        let global = GlobalConfig::load()?;
        let library = Self::load_library_config(library_root)?;

        Ok(Self { library, global })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "library-ledger", "library-ledger")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Path of the library config file under a library root
    pub fn library_config_path(library_root: &Path) -> PathBuf {
        library_root.join(".library").join("config.toml")
    }

    /// Loads and validates library configuration from a specific root
    fn load_library_config(library_root: &Path) -> Result<LibraryConfig> {
        let config_path = Self::library_config_path(library_root);

        if !config_path.exists() {
            return Ok(LibraryConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read library config: {}", config_path.display()))?;

        let config: LibraryConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse library config")?;

        config
            .validate()
            .with_context(|| format!("Invalid library config: {}", config_path.display()))?;

        Ok(config)
    }

    /// Finds the library root by looking for a `.library/` directory
    pub fn find_library_root() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            if current.join(".library").is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_library_config() {
        let config = LibraryConfig::default();
        assert_eq!(config.loan_period_days, 14);
        assert_eq!(config.fine_per_day, 1);
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.ledger_config(), LedgerConfig::default());
    }

    #[test]
    fn parse_library_config() {
        let toml = r#"
loan_period_days = 21
fine_per_day = 2

[admin]
username = "librarian"
password = "books"
"#;

        let config: LibraryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.loan_period_days, 21);
        assert_eq!(config.fine_per_day, 2);
        assert!(config.admin.matches("librarian", "books"));
    }

    #[test]
    fn partial_library_config_keeps_defaults() {
        let config: LibraryConfig = toml::from_str("fine_per_day = 5").unwrap();
        assert_eq!(config.loan_period_days, 14);
        assert_eq!(config.fine_per_day, 5);
        assert_eq!(config.admin, AdminCredentials::default());
    }

    #[test]
    fn negative_fine_does_not_parse() {
        assert!(toml::from_str::<LibraryConfig>("fine_per_day = -1").is_err());
    }

    #[test]
    fn zero_loan_period_is_invalid() {
        let config = LibraryConfig {
            loan_period_days: 0,
            ..LibraryConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn loan_period_is_capped() {
        let mut config = LibraryConfig {
            loan_period_days: MAX_LOAN_PERIOD_DAYS,
            ..LibraryConfig::default()
        };
        assert!(config.validate().is_ok());

        config.loan_period_days = 4_000_000_000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most 36500"));
    }

    #[test]
    fn parse_global_config() {
        let toml = r#"
default_format = "json"
borrower_name = "Alice"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_format, FormatPreference::Json);
        assert_eq!(config.effective_borrower(), Some("Alice".to_string()));
    }

    #[test]
    fn default_file_parses_back_to_defaults() {
        let contents = LibraryConfig::default_file_contents().unwrap();
        assert!(contents.starts_with("# Library ledger configuration"));

        let config: LibraryConfig = toml::from_str(&contents).unwrap();
        assert_eq!(config, LibraryConfig::default());
    }

    #[test]
    fn library_config_loads_from_disk() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".library")).unwrap();
        fs::write(
            Config::library_config_path(dir.path()),
            "loan_period_days = 7\n",
        )
        .unwrap();

        let loaded = Config::for_library(dir.path()).unwrap();
        assert_eq!(loaded.library.loan_period_days, 7);
        assert_eq!(loaded.library.fine_per_day, 1);
    }

    #[test]
    fn missing_library_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::for_library(dir.path()).unwrap();
        assert_eq!(loaded.library, LibraryConfig::default());
    }

    #[test]
    fn invalid_library_config_fails_to_load() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".library")).unwrap();
        fs::write(
            Config::library_config_path(dir.path()),
            "loan_period_days = 0\n",
        )
        .unwrap();

        assert!(Config::for_library(dir.path()).is_err());
    }
}
