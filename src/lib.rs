//! Library Ledger - a local-first book lending tracker
//!
//! Keeps a catalog of titles with fixed copy counts, records which copies
//! are out and with whom, and settles overdue fines on return. State lives
//! in a `.library/` directory as JSON.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{Book, BookId, CopyCount, Ledger, LedgerConfig, LedgerError, Loan, LoanView};
