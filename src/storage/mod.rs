//! # Storage Layer
//!
//! Persistence for the library ledger in plain, diffable files.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Books | JSON object keyed by book id | `.library/books.json` |
//! | Open loans | JSON object of book id to loan list | `.library/borrowed.json` |
//! | Config | TOML | `.library/config.toml` |
//!
//! ## Write Safety
//!
//! - [`JsonStore`] takes `fs2` locks while reading and writing
//! - Every write goes to a temp file and is renamed into place
//! - A single session per library is assumed; concurrent writers can still
//!   lose updates
//!
//! ## Library Structure
//!
//! ```text
//! .library/
//! ├── books.json       # Catalog, in insertion order
//! ├── borrowed.json    # Open loans, grouped by book
//! ├── config.toml      # Loan period, fine rate, admin credentials
//! └── .gitignore       # Ignores interrupted temp files
//! ```
//!
//! ## Key Types
//!
//! - [`Library`] - Entry point for a library directory
//! - [`JsonStore`] - The ledger's on-disk store
//! - [`Config`] - Library and global configuration

mod config;
mod json;
mod library;

pub use config::{Config, ConfigError, FormatPreference, GlobalConfig, LibraryConfig};
pub use json::JsonStore;
pub use library::{Library, LibraryError};
