//! Borrow, return, and loan listing commands

use std::io;

use anyhow::{Context, Result};
use chrono::Utc;

use super::output::{write_loan_table, Output};
use crate::storage::Library;

/// Picks the borrower: flag, then global config, then `$LIBRARY_BORROWER`
fn resolve_borrower(library: &Library, explicit: Option<&str>) -> Result<String> {
    explicit
        .map(str::to_string)
        .or_else(|| library.config().global.effective_borrower())
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!("Borrower name required: pass --borrower or set LIBRARY_BORROWER")
        })
}

pub fn borrow(output: &Output, id: &str, borrower: Option<&str>) -> Result<()> {
    let library = Library::open_current()?;
    let borrower = resolve_borrower(&library, borrower)?;
    output.verbose_ctx("borrow", &format!("{} borrowing {}", borrower, id));

    let mut ledger = library.ledger()?;
    let receipt = ledger.borrow_book(id, &borrower)?;

    if output.is_json() {
        output.data(&receipt);
    } else {
        output.success(&receipt.to_string());
    }

    Ok(())
}

pub fn return_copy(output: &Output, id: &str, borrower: Option<&str>) -> Result<()> {
    let library = Library::open_current()?;
    let borrower = resolve_borrower(&library, borrower)?;
    output.verbose_ctx("return", &format!("{} returning {}", borrower, id));

    let mut ledger = library.ledger()?;
    let receipt = ledger.return_book(id, &borrower)?;
    output.verbose_ctx(
        "return",
        &format!("Due {}, returned {}", receipt.due_at, receipt.returned_at),
    );

    if output.is_json() {
        output.data(&receipt);
    } else {
        output.success(&receipt.to_string());
    }

    Ok(())
}

pub fn list(output: &Output, overdue_only: bool) -> Result<()> {
    let library = Library::open_current()?;
    let ledger = library.ledger()?;

    let loans = if overdue_only {
        ledger.overdue_records(Utc::now())
    } else {
        ledger.view_borrowed_records()
    };
    output.verbose_ctx("loans", &format!("{} open loans listed", loans.len()));

    if output.is_json() {
        output.data(&loans);
    } else if loans.is_empty() {
        if overdue_only {
            println!("No overdue books.");
        } else {
            println!("No borrowed books.");
        }
    } else {
        write_loan_table(&mut io::stdout().lock(), &loans).context("Failed to write loans")?;
    }

    Ok(())
}
