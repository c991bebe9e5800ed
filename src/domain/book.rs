//! Book domain model
//!
//! A book is one catalog title with a fixed number of physical copies.
//! Copies move between "available" and "on loan"; the total never changes.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ledger::LedgerError;

/// Catalog key for a book, exactly as entered by the librarian
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for BookId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<&str> for BookId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Number of copies of a title, always at least one
///
/// Parsed from user input at the edge of the system so the ledger only
/// ever sees a range-checked value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CopyCount(NonZeroU32);

impl CopyCount {
    /// Returns `None` for zero
    pub fn new(copies: u32) -> Option<Self> {
        NonZeroU32::new(copies).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl FromStr for CopyCount {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let value: i64 = raw.parse().map_err(|_| {
            LedgerError::InvalidQuantity(format!("Total copies must be a number, got '{}'", raw))
        })?;

        if value <= 0 {
            return Err(LedgerError::InvalidQuantity(format!(
                "Total copies must be positive, got {}",
                value
            )));
        }

        u32::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| LedgerError::InvalidQuantity(format!("Total copies too large: {}", value)))
    }
}

impl fmt::Display for CopyCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Text field a catalog search runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Title,
    Author,
    Category,
}

impl SearchField {
    pub fn label(&self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Author => "author",
            SearchField::Category => "category",
        }
    }
}

/// A catalog title and its copy counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub category: String,
    total_copies: u32,
    available_copies: u32,
}

impl Book {
    /// Creates a book with every copy on the shelf
    pub fn new(
        id: impl Into<BookId>,
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
        copies: CopyCount,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            category: category.into(),
            total_copies: copies.get(),
            available_copies: copies.get(),
        }
    }

    /// Rebuilds a book from persisted counts. Counts are checked by
    /// [`LedgerState::validate`](super::LedgerState::validate), not here.
    pub(crate) fn restore(
        id: BookId,
        title: String,
        author: String,
        category: String,
        total_copies: u32,
        available_copies: u32,
    ) -> Self {
        Self {
            id,
            title,
            author,
            category,
            total_copies,
            available_copies,
        }
    }

    pub fn total_copies(&self) -> u32 {
        self.total_copies
    }

    pub fn available_copies(&self) -> u32 {
        self.available_copies
    }

    /// Copies currently lent out
    pub fn copies_on_loan(&self) -> u32 {
        self.total_copies.saturating_sub(self.available_copies)
    }

    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Returns the text of the given search field
    pub fn field(&self, field: SearchField) -> &str {
        match field {
            SearchField::Title => &self.title,
            SearchField::Author => &self.author,
            SearchField::Category => &self.category,
        }
    }

    /// Case-insensitive substring match against one field
    pub fn matches(&self, field: SearchField, query: &str) -> bool {
        self.field(field)
            .to_lowercase()
            .contains(&query.to_lowercase())
    }

    /// Takes one copy off the shelf. Returns false when none are left.
    pub(crate) fn check_out(&mut self) -> bool {
        if self.available_copies == 0 {
            return false;
        }
        self.available_copies -= 1;
        true
    }

    /// Puts one copy back. Returns false when every copy is already shelved.
    pub(crate) fn check_in(&mut self) -> bool {
        if self.available_copies >= self.total_copies {
            return false;
        }
        self.available_copies += 1;
        true
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Title: {}, Author: {}, Category: {}, Available: {}/{}",
            self.id,
            self.title,
            self.author,
            self.category,
            self.available_copies,
            self.total_copies
        )
    }
}
