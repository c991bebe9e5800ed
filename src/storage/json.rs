//! JSON file storage for the ledger
//!
//! Books live in `.library/books.json` and open loans in
//! `.library/borrowed.json`. Both are rewritten in full on every save.
//! Uses file locking so a reader never sees a half-written file.
//!
//! A save writes both temp files before renaming either one. If the second
//! rename fails, the previous `books.json` is put back so the pair on disk
//! never mixes old loans with new books.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{LedgerState, LedgerStore};

/// Ledger store backed by two JSON files
pub struct JsonStore {
    books_path: PathBuf,
    loans_path: PathBuf,
}

impl JsonStore {
    /// Creates a store over the given files
    pub fn new(books_path: impl Into<PathBuf>, loans_path: impl Into<PathBuf>) -> Self {
        Self {
            books_path: books_path.into(),
            loans_path: loans_path.into(),
        }
    }

    /// Creates the default store for a library
    pub fn for_library(library_root: &Path) -> Self {
        let dir = library_root.join(".library");
        Self::new(dir.join("books.json"), dir.join("borrowed.json"))
    }

    pub fn books_path(&self) -> &Path {
        &self.books_path
    }

    pub fn loans_path(&self) -> &Path {
        &self.loans_path
    }

    /// Reads one file; a missing or blank file yields the default value
    fn read_file<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
        if !path.exists() {
            return Ok(T::default());
        }

        let mut file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .with_context(|| format!("Failed to acquire read lock on {}", path.display()))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Writes `value` to the temp file beside `path` and returns its path
    fn write_temp<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = path.with_extension("json.tmp");

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire write lock on {}", temp_path.display()))?;

        let mut writer = BufWriter::new(&file);
        serde_json::to_writer_pretty(&mut writer, value)
            .with_context(|| format!("Failed to serialize {}", path.display()))?;
        writeln!(writer).context("Failed to write trailing newline")?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", temp_path.display()))?;

        Ok(temp_path)
    }

    fn rename(from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to)
            .with_context(|| format!("Failed to rename {} to {}", from.display(), to.display()))
    }

    /// Puts `books.json` back the way it was before a failed save
    fn restore_books(&self, previous: Option<Vec<u8>>) -> Result<()> {
        let restored = match previous {
            Some(bytes) => fs::write(&self.books_path, bytes),
            None => fs::remove_file(&self.books_path),
        };
        restored.with_context(|| format!("Failed to restore {}", self.books_path.display()))
    }
}

impl LedgerStore for JsonStore {
    fn load(&self) -> Result<LedgerState> {
        let catalog = Self::read_file(&self.books_path)?;
        let loans = Self::read_file(&self.loans_path)?;
        Ok(LedgerState::new(catalog, loans))
    }

    fn save(&mut self, state: &LedgerState) -> Result<()> {
        let books_temp = Self::write_temp(&self.books_path, &state.catalog)?;
        let loans_temp = match Self::write_temp(&self.loans_path, &state.loans) {
            Ok(temp) => temp,
            Err(err) => {
                let _ = fs::remove_file(&books_temp);
                return Err(err);
            }
        };

        let previous_books = fs::read(&self.books_path).ok();
        if let Err(err) = Self::rename(&books_temp, &self.books_path) {
            let _ = fs::remove_file(&books_temp);
            let _ = fs::remove_file(&loans_temp);
            return Err(err);
        }

        if let Err(err) = Self::rename(&loans_temp, &self.loans_path) {
            let _ = fs::remove_file(&loans_temp);
            return Err(match self.restore_books(previous_books) {
                Ok(()) => err,
                Err(restore) => err.context(format!("{:#}", restore)),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Ledger, LedgerConfig};
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonStore {
        JsonStore::new(dir.path().join("books.json"), dir.path().join("borrowed.json"))
    }

    fn populated_ledger(dir: &TempDir) -> Ledger<JsonStore> {
        let mut ledger = Ledger::open(store_in(dir), LedgerConfig::default()).unwrap();
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap() + Duration::microseconds(417);

        ledger
            .add_book("Dune", "Frank Herbert", "B1", "2".parse().unwrap(), "Science Fiction")
            .unwrap();
        ledger
            .add_book("Emma", "Jane Austen", "B2", "1".parse().unwrap(), "Classics")
            .unwrap();
        ledger.borrow_book_at("B2", "Carol", t0).unwrap();
        ledger.borrow_book_at("B1", "Alice", t0).unwrap();
        ledger
            .borrow_book_at("B1", "Bob", t0 + Duration::hours(3))
            .unwrap();
        ledger
    }

    #[test]
    fn read_missing_files_is_empty() {
        let dir = TempDir::new().unwrap();
        let state = store_in(&dir).load().unwrap();
        assert!(state.catalog.is_empty());
        assert!(state.loans.is_empty());
    }

    #[test]
    fn blank_file_is_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("books.json"), "\n").unwrap();
        assert!(store_in(&dir).load().unwrap().catalog.is_empty());
    }

    #[test]
    fn save_and_reload_reproduces_state() {
        let dir = TempDir::new().unwrap();
        let ledger = populated_ledger(&dir);

        let reloaded = Ledger::open(store_in(&dir), LedgerConfig::default()).unwrap();
        assert_eq!(reloaded.state(), ledger.state());
        assert_eq!(reloaded.view_borrowed_records(), ledger.view_borrowed_records());
    }

    #[test]
    fn files_use_documented_field_names() {
        let dir = TempDir::new().unwrap();
        populated_ledger(&dir);

        let books: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("books.json")).unwrap()).unwrap();
        assert_eq!(books["B1"]["total_copies"], 2);
        assert_eq!(books["B1"]["available_copies"], 0);

        let loans: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("borrowed.json")).unwrap()).unwrap();
        assert_eq!(loans["B1"].as_array().unwrap().len(), 2);
        assert_eq!(loans["B1"][0]["borrower_name"], "Alice");
        assert!(loans["B2"][0]["due_timestamp"].as_str().unwrap().starts_with("2024-03-15T09:30:00"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("borrowed.json"), "{not json").unwrap();

        let err = store_in(&dir).load().unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse"));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::new(
            dir.path().join("nested").join("books.json"),
            dir.path().join("nested").join("borrowed.json"),
        );
        store.save(&LedgerState::default()).unwrap();

        assert!(store.books_path().exists());
        assert!(store.loans_path().exists());
    }

    #[test]
    fn atomic_write_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        populated_ledger(&dir);

        assert!(!dir.path().join("books.json.tmp").exists());
        assert!(!dir.path().join("borrowed.json.tmp").exists());
    }

    #[test]
    fn failed_loans_write_leaves_both_files_untouched() {
        let dir = TempDir::new().unwrap();
        let mut ledger = populated_ledger(&dir);
        let books_before = fs::read(dir.path().join("books.json")).unwrap();
        let loans_before = fs::read(dir.path().join("borrowed.json")).unwrap();

        // A directory in the way makes the loans temp file impossible to create
        fs::create_dir(dir.path().join("borrowed.json.tmp")).unwrap();
        let err = ledger
            .add_book("Ubik", "Philip K. Dick", "B3", "1".parse().unwrap(), "Science Fiction")
            .unwrap_err();
        assert!(!err.is_user_facing());

        assert_eq!(fs::read(dir.path().join("books.json")).unwrap(), books_before);
        assert_eq!(fs::read(dir.path().join("borrowed.json")).unwrap(), loans_before);
        assert!(!dir.path().join("books.json.tmp").exists());

        fs::remove_dir(dir.path().join("borrowed.json.tmp")).unwrap();
        let reopened = Ledger::open(store_in(&dir), LedgerConfig::default()).unwrap();
        assert_eq!(reopened.state(), ledger.state());
    }

    #[test]
    fn failed_loans_rename_restores_books() {
        let dir = TempDir::new().unwrap();
        let mut ledger = populated_ledger(&dir);
        let books_before = fs::read(dir.path().join("books.json")).unwrap();
        let loans_before = fs::read(dir.path().join("borrowed.json")).unwrap();

        // A non-empty directory at the target makes the final rename fail
        let loans_path = dir.path().join("borrowed.json");
        fs::remove_file(&loans_path).unwrap();
        fs::create_dir(&loans_path).unwrap();
        fs::write(loans_path.join("keep"), "x").unwrap();

        let err = ledger
            .add_book("Ubik", "Philip K. Dick", "B3", "1".parse().unwrap(), "Science Fiction")
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to rename"));
        assert_eq!(fs::read(dir.path().join("books.json")).unwrap(), books_before);
        assert!(!dir.path().join("books.json.tmp").exists());
        assert!(!dir.path().join("borrowed.json.tmp").exists());

        fs::remove_dir_all(&loans_path).unwrap();
        fs::write(&loans_path, loans_before).unwrap();
        let reopened = Ledger::open(store_in(&dir), LedgerConfig::default()).unwrap();
        assert_eq!(reopened.state(), ledger.state());
    }

    #[test]
    fn failed_first_save_removes_new_books_file() {
        let dir = TempDir::new().unwrap();
        let loans_path = dir.path().join("borrowed.json");
        fs::create_dir(&loans_path).unwrap();
        fs::write(loans_path.join("keep"), "x").unwrap();

        assert!(store_in(&dir).save(&LedgerState::default()).is_err());
        assert!(!dir.path().join("books.json").exists());
    }
}
