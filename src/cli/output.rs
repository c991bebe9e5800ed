//! Output formatting for CLI commands

use std::io::{self, Write};

use serde::Serialize;

use crate::domain::{Book, LoanView};
use crate::storage::FormatPreference;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<FormatPreference> for OutputFormat {
    fn from(preference: FormatPreference) -> Self {
        match preference {
            FormatPreference::Text => OutputFormat::Text,
            FormatPreference::Json => OutputFormat::Json,
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a verbose debug message (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Prints a verbose debug message with context (only when --verbose is set)
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

/// Writes books as an aligned text table
pub fn write_book_table<'a, W: Write>(
    out: &mut W,
    books: impl IntoIterator<Item = &'a Book>,
) -> io::Result<()> {
    writeln!(
        out,
        "{:<10} {:<30} {:<20} {:<16} AVAILABLE",
        "ID", "TITLE", "AUTHOR", "CATEGORY"
    )?;
    writeln!(out, "{}", "-".repeat(90))?;

    for book in books {
        writeln!(
            out,
            "{:<10} {:<30} {:<20} {:<16} {}/{}",
            book.id,
            book.title,
            book.author,
            book.category,
            book.available_copies(),
            book.total_copies()
        )?;
    }

    Ok(())
}

/// Writes open loans as an aligned text table
pub fn write_loan_table<W: Write>(out: &mut W, loans: &[LoanView]) -> io::Result<()> {
    writeln!(
        out,
        "{:<10} {:<30} {:<20} {:<12} DUE",
        "ID", "TITLE", "BORROWER", "BORROWED"
    )?;
    writeln!(out, "{}", "-".repeat(84))?;

    for loan in loans {
        writeln!(
            out,
            "{:<10} {:<30} {:<20} {:<12} {}",
            loan.book_id,
            loan.title,
            loan.borrower,
            loan.borrowed_at.format("%Y-%m-%d"),
            loan.due_at.format("%Y-%m-%d")
        )?;
    }

    Ok(())
}
