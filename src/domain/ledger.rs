//! Inventory ledger
//!
//! The ledger owns the catalog and the open loans and is the only place
//! either changes. For every book it keeps
//! `available_copies + open loans == total_copies`.
//!
//! Each mutation runs against a copy of the state, is saved through the
//! [`LedgerStore`], and only then replaces the live state. A rejected
//! operation or a failed save leaves the ledger as it was.

use anyhow::{anyhow, Context};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::book::{Book, BookId, CopyCount, SearchField};
use super::loan::{BorrowReceipt, Loan, LoanView, ReturnReceipt};
use super::state::LedgerState;
use super::store::LedgerStore;

/// Outcomes a front end shows to the user, plus fatal storage failures
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Book ID already exists: {0}")]
    DuplicateId(BookId),

    #[error("{0}")]
    InvalidQuantity(String),

    #[error("Book not found: {0}")]
    BookNotFound(BookId),

    #[error("No copies available: {0}")]
    NoCopiesAvailable(BookId),

    #[error("No record of {borrower} borrowing {book_id}")]
    NoMatchingLoan { book_id: BookId, borrower: String },

    #[error("Book ID still has open loans on record: {0}")]
    OpenLoansOnRecord(BookId),

    #[error("Due date out of range for a loan of {0}")]
    DueDateOutOfRange(BookId),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl LedgerError {
    /// True for expected outcomes; false for storage failures
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, LedgerError::Storage(_))
    }
}

/// Lending rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Time from borrow to due
    pub loan_period: Duration,

    /// Fine per whole overdue day, in currency units
    pub fine_per_day: u64,
}

impl LedgerConfig {
    pub fn new(loan_period_days: u32, fine_per_day: u64) -> Self {
        Self {
            loan_period: Duration::days(i64::from(loan_period_days)),
            fine_per_day,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new(14, 1)
    }
}

/// The book and loan ledger
pub struct Ledger<S> {
    store: S,
    config: LedgerConfig,
    state: LedgerState,
}

impl<S: LedgerStore> Ledger<S> {
    /// Loads and checks the stored state
    pub fn open(store: S, config: LedgerConfig) -> Result<Self, LedgerError> {
        let state = store.load()?;
        state
            .validate()
            .context("Stored ledger state is inconsistent")?;

        Ok(Self {
            store,
            config,
            state,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Adds a title with every copy on the shelf
    ///
    /// An id with loans left over from a removed catalog entry is refused,
    /// since its copies could not all be on the shelf.
    pub fn add_book(
        &mut self,
        title: &str,
        author: &str,
        book_id: &str,
        total_copies: CopyCount,
        category: &str,
    ) -> Result<Book, LedgerError> {
        self.commit(|state| {
            let book = Book::new(book_id, title, author, category, total_copies);
            if state.catalog.get(book_id).is_some() {
                return Err(LedgerError::DuplicateId(book.id));
            }
            if state.loans.count_for(book_id) > 0 {
                return Err(LedgerError::OpenLoansOnRecord(book.id));
            }
            state.catalog.insert(book.clone());
            Ok(book)
        })
    }

    /// Books whose `field` contains `query`, ignoring case, in catalog order
    pub fn search<'a>(&'a self, field: SearchField, query: &'a str) -> impl Iterator<Item = &'a Book> + 'a {
        self.state
            .catalog
            .iter()
            .filter(move |book| book.matches(field, query))
    }

    pub fn search_by_title<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a Book> + 'a {
        self.search(SearchField::Title, query)
    }

    pub fn search_by_author<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a Book> + 'a {
        self.search(SearchField::Author, query)
    }

    pub fn search_by_category<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a Book> + 'a {
        self.search(SearchField::Category, query)
    }

    /// Lends one copy to `borrower`, due one loan period from now
    pub fn borrow_book(&mut self, book_id: &str, borrower: &str) -> Result<BorrowReceipt, LedgerError> {
        self.borrow_book_at(book_id, borrower, Utc::now())
    }

    /// Same as [`Ledger::borrow_book`] with an explicit clock
    pub fn borrow_book_at(
        &mut self,
        book_id: &str,
        borrower: &str,
        now: DateTime<Utc>,
    ) -> Result<BorrowReceipt, LedgerError> {
        let loan_period = self.config.loan_period;

        self.commit(|state| {
            let book = state
                .catalog
                .get_mut(book_id)
                .ok_or_else(|| LedgerError::BookNotFound(BookId::new(book_id)))?;

            let loan = Loan::new(book.id.clone(), borrower, now, loan_period)
                .ok_or_else(|| LedgerError::DueDateOutOfRange(book.id.clone()))?;

            if !book.check_out() {
                return Err(LedgerError::NoCopiesAvailable(book.id.clone()));
            }

            let receipt = BorrowReceipt {
                book_id: book.id.clone(),
                title: book.title.clone(),
                borrower: borrower.to_string(),
                borrowed_at: now,
                due_at: loan.due_at,
            };
            state.loans.push(loan);

            Ok(receipt)
        })
    }

    /// Closes the first open loan of `book_id` held by `borrower` and
    /// settles the fine
    pub fn return_book(&mut self, book_id: &str, borrower: &str) -> Result<ReturnReceipt, LedgerError> {
        self.return_book_at(book_id, borrower, Utc::now())
    }

    /// Same as [`Ledger::return_book`] with an explicit clock
    pub fn return_book_at(
        &mut self,
        book_id: &str,
        borrower: &str,
        now: DateTime<Utc>,
    ) -> Result<ReturnReceipt, LedgerError> {
        let fine_per_day = self.config.fine_per_day;

        self.commit(|state| {
            let book = state
                .catalog
                .get_mut(book_id)
                .ok_or_else(|| LedgerError::BookNotFound(BookId::new(book_id)))?;

            let loan = state
                .loans
                .take_first(book_id, borrower)
                .ok_or_else(|| LedgerError::NoMatchingLoan {
                    book_id: book.id.clone(),
                    borrower: borrower.to_string(),
                })?;

            if !book.check_in() {
                return Err(anyhow!("Book {} has an open loan but no copies out", book.id).into());
            }

            let overdue_days = loan.overdue_days(now);
            Ok(ReturnReceipt {
                book_id: book.id.clone(),
                title: book.title.clone(),
                borrower: loan.borrower,
                returned_at: now,
                due_at: loan.due_at,
                overdue_days,
                fine: overdue_days.saturating_mul(fine_per_day),
            })
        })
    }

    /// Every book, in catalog order
    pub fn view_all_books(&self) -> &[Book] {
        self.state.catalog.as_slice()
    }

    /// Every open loan with its book's title, in stored order
    pub fn view_borrowed_records(&self) -> Vec<LoanView> {
        self.state
            .loans
            .iter()
            .filter_map(|loan| {
                let book = self.state.catalog.get(loan.book_id.as_str())?;
                Some(LoanView::new(book, loan))
            })
            .collect()
    }

    /// Open loans already past due at `now`
    pub fn overdue_records(&self, now: DateTime<Utc>) -> Vec<LoanView> {
        self.view_borrowed_records()
            .into_iter()
            .filter(|view| view.is_overdue(now))
            .collect()
    }

    pub fn book(&self, book_id: &str) -> Option<&Book> {
        self.state.catalog.get(book_id)
    }

    /// Open loans of one book, in stored order
    pub fn loans_for<'a>(&'a self, book_id: &'a str) -> impl Iterator<Item = &'a Loan> + 'a {
        self.state.loans.for_book(book_id)
    }

    pub fn open_loan_count(&self, book_id: &str) -> usize {
        self.state.loans.count_for(book_id)
    }

    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut LedgerState) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let mut next = self.state.clone();
        let outcome = change(&mut next)?;
        self.store.save(&next)?;
        self.state = next;
        Ok(outcome)
    }
}
