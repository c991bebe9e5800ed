//! Loan domain model
//!
//! A loan is one copy of a book out with a borrower. Loans are open until
//! the copy comes back, at which point the loan is removed and any overdue
//! fine is settled on the return receipt.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::book::{Book, BookId};

/// One borrowed copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    /// Book the copy belongs to
    pub book_id: BookId,

    /// Name given at borrow time, matched exactly on return
    pub borrower: String,

    pub borrowed_at: DateTime<Utc>,

    pub due_at: DateTime<Utc>,
}

impl Loan {
    /// Opens a loan due `loan_period` after `borrowed_at`. `None` if the
    /// due date falls outside the representable range.
    pub fn new(
        book_id: BookId,
        borrower: impl Into<String>,
        borrowed_at: DateTime<Utc>,
        loan_period: Duration,
    ) -> Option<Self> {
        let due_at = borrowed_at.checked_add_signed(loan_period)?;
        Some(Self {
            book_id,
            borrower: borrower.into(),
            borrowed_at,
            due_at,
        })
    }

    /// Returns true if this loan is for `book_id` and held by `borrower`
    pub fn is_held_by(&self, book_id: &str, borrower: &str) -> bool {
        self.book_id.as_str() == book_id && self.borrower == borrower
    }

    pub fn is_overdue(&self, at: DateTime<Utc>) -> bool {
        at > self.due_at
    }

    /// Whole days past due at `at`
    pub fn overdue_days(&self, at: DateTime<Utc>) -> u64 {
        overdue_days(self.due_at, at)
    }
}

/// Whole days between `due_at` and `returned_at`, zero if not late
///
/// Partial days are dropped: 6 days and 23 hours late is 6 days.
pub fn overdue_days(due_at: DateTime<Utc>, returned_at: DateTime<Utc>) -> u64 {
    u64::try_from((returned_at - due_at).num_days()).unwrap_or(0)
}

/// Open loan joined with its book, for listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanView {
    pub book_id: BookId,
    pub title: String,
    pub borrower: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

impl LoanView {
    pub fn new(book: &Book, loan: &Loan) -> Self {
        Self {
            book_id: loan.book_id.clone(),
            title: book.title.clone(),
            borrower: loan.borrower.clone(),
            borrowed_at: loan.borrowed_at,
            due_at: loan.due_at,
        }
    }

    pub fn is_overdue(&self, at: DateTime<Utc>) -> bool {
        at > self.due_at
    }
}

impl fmt::Display for LoanView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Book ID: {}, Title: {}, Borrowed by: {}, Borrow Date: {}, Due Date: {}",
            self.book_id,
            self.title,
            self.borrower,
            self.borrowed_at.format("%Y-%m-%d"),
            self.due_at.format("%Y-%m-%d")
        )
    }
}

/// Result of a successful borrow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorrowReceipt {
    pub book_id: BookId,
    pub title: String,
    pub borrower: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
}

impl fmt::Display for BorrowReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Book borrowed successfully by {}. Due date: {}",
            self.borrower,
            self.due_at.format("%Y-%m-%d")
        )
    }
}

/// Result of a successful return, including any fine owed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnReceipt {
    pub book_id: BookId,
    pub title: String,
    pub borrower: String,
    pub returned_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub overdue_days: u64,
    pub fine: u64,
}

impl ReturnReceipt {
    pub fn is_late(&self) -> bool {
        self.overdue_days > 0
    }
}

impl fmt::Display for ReturnReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_late() {
            write!(
                f,
                "Book returned successfully by {}. Overdue by {} days. Fine: {}",
                self.borrower, self.overdue_days, self.fine
            )
        } else {
            write!(f, "Book returned successfully by {}. No fine.", self.borrower)
        }
    }
}
