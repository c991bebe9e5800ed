//! Domain models for the library ledger
//!
//! Contains the lending rules without any I/O concerns.

mod book;
mod ledger;
mod loan;
mod session;
mod state;
mod store;

pub use book::{Book, BookId, CopyCount, SearchField};
pub use ledger::{Ledger, LedgerConfig, LedgerError};
pub use loan::{overdue_days, BorrowReceipt, Loan, LoanView, ReturnReceipt};
pub use session::{AdminCredentials, Session, SessionError};
pub use state::{Catalog, LedgerState, LoanBook, StateError};
pub use store::{LedgerStore, MemoryStore};
