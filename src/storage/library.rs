//! Library directory management
//!
//! Handles library initialization and provides access to the ledger.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, JsonStore, LibraryConfig};
use crate::domain::{AdminCredentials, Ledger};

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Not in a library. Run 'library init' first.")]
    NotInLibrary,
}

/// A library on disk
pub struct Library {
    root: PathBuf,
    config: Config,
}

impl Library {
    /// Opens an existing library at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(".library").is_dir() {
            return Err(LibraryError::NotInLibrary.into());
        }

        let config = Config::for_library(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the library at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_library_root().ok_or(LibraryError::NotInLibrary)?;

        Self::open(root)
    }

    /// Initializes a library at the given path, keeping any existing files
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let library_dir = root.join(".library");

        fs::create_dir_all(&library_dir).with_context(|| {
            format!("Failed to create .library directory: {}", library_dir.display())
        })?;

        let config_path = Config::library_config_path(&root);
        if !config_path.exists() {
            fs::write(&config_path, LibraryConfig::default_file_contents()?)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = library_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, "# Interrupted writes\n*.tmp\n").with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        Self::open(root)
    }

    /// Returns the library root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .library directory path
    pub fn library_dir(&self) -> PathBuf {
        self.root.join(".library")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the admin credential pair
    pub fn credentials(&self) -> &AdminCredentials {
        &self.config.library.admin
    }

    /// Returns the JSON store for this library
    pub fn store(&self) -> JsonStore {
        JsonStore::for_library(&self.root)
    }

    /// Loads the ledger with this library's lending rules
    pub fn ledger(&self) -> Result<Ledger<JsonStore>> {
        let ledger = Ledger::open(self.store(), self.config.library.ledger_config())
            .with_context(|| format!("Failed to load ledger from {}", self.library_dir().display()))?;
        Ok(ledger)
    }
}
