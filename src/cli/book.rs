//! Catalog CLI commands

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use super::output::{write_book_table, write_loan_table, Output};
use crate::domain::{
    Book, BookId, CopyCount, LedgerError, LoanView, SearchField, Session, SessionError,
};
use crate::storage::Library;

#[derive(Subcommand)]
pub enum BookCommands {
    /// Add a book to the catalog (admin only)
    ///
    /// Examples:
    ///   library book add --id B1 --title Dune --author "Frank Herbert" \
    ///       --copies 2 --category "Science Fiction" --admin-user admin --admin-password password
    Add {
        /// Unique book ID
        #[arg(long)]
        id: String,

        /// Book title
        #[arg(long)]
        title: String,

        /// Book author
        #[arg(long)]
        author: String,

        /// Number of copies (positive integer)
        #[arg(long)]
        copies: String,

        /// Category or genre
        #[arg(long)]
        category: String,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// List every book
    List,

    /// Show one book and who has its copies
    Show {
        /// Book ID
        id: String,
    },
}

/// Admin credentials for gated commands
#[derive(Args)]
pub struct AdminArgs {
    /// Admin username
    #[arg(long = "admin-user", env = "LIBRARY_ADMIN_USER")]
    pub username: Option<String>,

    /// Admin password
    #[arg(long = "admin-password", env = "LIBRARY_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

pub fn run(cmd: BookCommands, output: &Output) -> Result<()> {
    match cmd {
        BookCommands::Add {
            id,
            title,
            author,
            copies,
            category,
            admin,
        } => add_book(output, &admin, &id, &title, &author, &copies, &category),
        BookCommands::List => list_books(output),
        BookCommands::Show { id } => show_book(output, &id),
    }
}

fn add_book(
    output: &Output,
    admin: &AdminArgs,
    id: &str,
    title: &str,
    author: &str,
    copies: &str,
    category: &str,
) -> Result<()> {
    let library = Library::open_current()?;

    let mut session = Session::new();
    match (admin.username.as_deref(), admin.password.as_deref()) {
        (Some(username), Some(password)) => {
            session.login(library.credentials(), username, password)?
        }
        _ => return Err(SessionError::AdminRequired.into()),
    }
    output.verbose_ctx("book", "Admin login accepted");

    let copies: CopyCount = copies.parse()?;
    let mut ledger = library.ledger()?;
    let book = ledger.add_book(title, author, id, copies, category)?;
    output.verbose_ctx("book", &format!("Saved catalog with {} books", ledger.view_all_books().len()));

    if output.is_json() {
        output.data(&book);
    } else {
        output.success(&format!("Book added successfully: {} - {}", book.id, book.title));
    }

    Ok(())
}

fn list_books(output: &Output) -> Result<()> {
    let library = Library::open_current()?;
    let ledger = library.ledger()?;
    let books = ledger.view_all_books();

    if output.is_json() {
        output.data(&books);
    } else if books.is_empty() {
        println!("No books in library.");
    } else {
        write_book_table(&mut io::stdout().lock(), books).context("Failed to write book list")?;
    }

    Ok(())
}

fn show_book(output: &Output, id: &str) -> Result<()> {
    let library = Library::open_current()?;
    let ledger = library.ledger()?;

    let book = ledger
        .book(id)
        .ok_or_else(|| LedgerError::BookNotFound(BookId::new(id)))?;
    let loans: Vec<LoanView> = ledger
        .loans_for(id)
        .map(|loan| LoanView::new(book, loan))
        .collect();

    if output.is_json() {
        output.data(&serde_json::json!({
            "book": book,
            "loans": loans,
        }));
    } else {
        let mut out = io::stdout().lock();
        writeln!(out, "Book: {}", book.id)?;
        writeln!(out, "Title: {}", book.title)?;
        writeln!(out, "Author: {}", book.author)?;
        writeln!(out, "Category: {}", book.category)?;
        writeln!(
            out,
            "Available: {}/{}",
            book.available_copies(),
            book.total_copies()
        )?;
        writeln!(out, "On loan: {}", book.copies_on_loan())?;
        if !book.is_available() {
            writeln!(out, "No copies on the shelf.")?;
        }

        if !loans.is_empty() {
            writeln!(out)?;
            write_loan_table(&mut out, &loans)?;
        }
    }

    Ok(())
}

/// Searches one catalog field
pub fn search(output: &Output, field: SearchField, query: &str) -> Result<()> {
    let library = Library::open_current()?;
    let ledger = library.ledger()?;

    let results: Vec<&Book> = ledger.search(field, query).collect();
    output.verbose_ctx("search", &format!("Found {} results", results.len()));

    if output.is_json() {
        output.data(&results);
    } else if results.is_empty() {
        println!("No books found.");
    } else {
        write_book_table(&mut io::stdout().lock(), results).context("Failed to write results")?;
    }

    Ok(())
}
