//! Ledger state: the catalog and the open loans
//!
//! Both collections keep a stable order so that listings and the persisted
//! JSON agree across reloads.
//!
//! Persisted shapes:
//! - catalog: `{"<book_id>": {"title", "author", "total_copies", "available_copies", "category"}}`
//! - loans: `{"<book_id>": [{"borrower_name", "borrow_timestamp", "due_timestamp"}]}`
//!
//! Files written by older versions used `total`, `available`, `user`,
//! `borrow_date` and `due_date`, with timestamps lacking an offset. Those are
//! still accepted on read and treated as UTC.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::book::{Book, BookId};
use super::loan::Loan;

#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("Book {0} has no copies")]
    NoCopies(BookId),

    #[error("Book {book_id} has {available} available copies but only {total} in total")]
    AvailableExceedsTotal {
        book_id: BookId,
        available: u32,
        total: u32,
    },

    #[error("Book {book_id}: {available} available + {on_loan} on loan does not equal {total} total")]
    CopyMismatch {
        book_id: BookId,
        available: u32,
        on_loan: usize,
        total: u32,
    },
}

/// Books in insertion order, unique by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog(Vec<Book>);

impl Catalog {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.0.iter().find(|book| book.id.as_str() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Book> {
        self.0.iter_mut().find(|book| book.id.as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Appends a book. Returns false, leaving the catalog untouched, if the
    /// id is taken.
    pub fn insert(&mut self, book: Book) -> bool {
        if self.contains(book.id.as_str()) {
            return false;
        }
        self.0.push(book);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Book> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Book] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Open loans, grouped by book
///
/// Loans for the same book are contiguous and keep their borrow order. A
/// book's group is appended the first time it is borrowed and disappears
/// with its last loan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanBook(Vec<Loan>);

impl LoanBook {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds a loan at the end of its book's group
    pub fn push(&mut self, loan: Loan) {
        match self.0.iter().rposition(|open| open.book_id == loan.book_id) {
            Some(last) => self.0.insert(last + 1, loan),
            None => self.0.push(loan),
        }
    }

    /// Removes the first loan, in stored order, for this book and borrower
    pub fn take_first(&mut self, book_id: &str, borrower: &str) -> Option<Loan> {
        let index = self.0.iter().position(|loan| loan.is_held_by(book_id, borrower))?;
        Some(self.0.remove(index))
    }

    pub fn for_book<'a>(&'a self, book_id: &'a str) -> impl Iterator<Item = &'a Loan> + 'a {
        self.0.iter().filter(move |loan| loan.book_id.as_str() == book_id)
    }

    pub fn count_for(&self, book_id: &str) -> usize {
        self.for_book(book_id).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Loan> {
        self.0.iter()
    }

    /// Loans sliced into per-book runs
    pub fn groups(&self) -> impl Iterator<Item = &[Loan]> {
        self.0.chunk_by(|a, b| a.book_id == b.book_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything the ledger persists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerState {
    pub catalog: Catalog,
    pub loans: LoanBook,
}

impl LedgerState {
    pub fn new(catalog: Catalog, loans: LoanBook) -> Self {
        Self { catalog, loans }
    }

    /// Checks every book's copy counts against its open loans
    ///
    /// Loans whose book is missing from the catalog are tolerated.
    pub fn validate(&self) -> Result<(), StateError> {
        for book in self.catalog.iter() {
            let total = book.total_copies();
            let available = book.available_copies();

            if total == 0 {
                return Err(StateError::NoCopies(book.id.clone()));
            }
            if available > total {
                return Err(StateError::AvailableExceedsTotal {
                    book_id: book.id.clone(),
                    available,
                    total,
                });
            }

            let on_loan = self.loans.count_for(book.id.as_str());
            if available as usize + on_loan != total as usize {
                return Err(StateError::CopyMismatch {
                    book_id: book.id.clone(),
                    available,
                    on_loan,
                    total,
                });
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct BookRecord {
    title: String,
    author: String,
    #[serde(alias = "total")]
    total_copies: u32,
    #[serde(alias = "available")]
    available_copies: u32,
    category: String,
}

#[derive(Serialize, Deserialize)]
struct LoanRecord {
    #[serde(alias = "user")]
    borrower_name: String,
    #[serde(alias = "borrow_date", with = "timestamp")]
    borrow_timestamp: DateTime<Utc>,
    #[serde(alias = "due_date", with = "timestamp")]
    due_timestamp: DateTime<Utc>,
}

impl From<&Loan> for LoanRecord {
    fn from(loan: &Loan) -> Self {
        Self {
            borrower_name: loan.borrower.clone(),
            borrow_timestamp: loan.borrowed_at,
            due_timestamp: loan.due_at,
        }
    }
}

impl Serialize for Catalog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for book in &self.0 {
            let record = BookRecord {
                title: book.title.clone(),
                author: book.author.clone(),
                total_copies: book.total_copies(),
                available_copies: book.available_copies(),
                category: book.category.clone(),
            };
            map.serialize_entry(book.id.as_str(), &record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = Catalog;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of book ids to book records")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut catalog = Catalog::new();

                // Entries arrive in file order, which is the catalog order
                while let Some((id, record)) = map.next_entry::<String, BookRecord>()? {
                    let book = Book::restore(
                        BookId::new(id.clone()),
                        record.title,
                        record.author,
                        record.category,
                        record.total_copies,
                        record.available_copies,
                    );
                    if !catalog.insert(book) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate book id '{}'",
                            id
                        )));
                    }
                }

                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

impl Serialize for LoanBook {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        for group in self.groups() {
            let records: Vec<LoanRecord> = group.iter().map(LoanRecord::from).collect();
            map.serialize_entry(group[0].book_id.as_str(), &records)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LoanBook {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LoanBookVisitor;

        impl<'de> Visitor<'de> for LoanBookVisitor {
            type Value = LoanBook;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of book ids to lists of loan records")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut loans = LoanBook::new();

                while let Some((id, records)) = map.next_entry::<String, Vec<LoanRecord>>()? {
                    for record in records {
                        loans.push(Loan {
                            book_id: BookId::new(id.clone()),
                            borrower: record.borrower_name,
                            borrowed_at: record.borrow_timestamp,
                            due_at: record.due_timestamp,
                        });
                    }
                }

                Ok(loans)
            }
        }

        deserializer.deserialize_map(LoanBookVisitor)
    }
}

/// ISO-8601 timestamps: written as RFC 3339 UTC, read with or without offset
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Ok(at.with_timezone(&Utc));
        }
        raw.parse::<NaiveDateTime>()
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
    }
}
