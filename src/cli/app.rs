//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{book, loan, menu, tui};
use crate::domain::SearchField;
use crate::storage::{GlobalConfig, Library};

#[derive(Parser)]
#[command(name = "library")]
#[command(author, version, about = "Track a book catalog and the copies lent out")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new library
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage the catalog
    #[command(subcommand)]
    Book(book::BookCommands),

    /// Search the catalog by title, author, or category
    Search {
        /// Field to search
        #[arg(value_enum)]
        field: SearchField,

        /// Text to look for (case-insensitive)
        query: String,
    },

    /// Borrow a copy of a book
    Borrow {
        /// Book ID
        id: String,

        /// Borrower name (defaults to config, then $LIBRARY_BORROWER)
        #[arg(long, short)]
        borrower: Option<String>,
    },

    /// Return a borrowed copy
    Return {
        /// Book ID
        id: String,

        /// Borrower name (defaults to config, then $LIBRARY_BORROWER)
        #[arg(long, short)]
        borrower: Option<String>,
    },

    /// List open loans
    Loans {
        /// Only show loans past their due date
        #[arg(long)]
        overdue: bool,
    },

    /// Run the interactive console menu
    Menu,

    /// Open the form-based terminal UI
    Tui,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let global = GlobalConfig::load()?;
    let format = cli
        .format
        .unwrap_or_else(|| OutputFormat::from(global.default_format));
    let output = Output::new(format, cli.verbose);

    output.verbose("Library ledger starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing library at: {}", path));
            let library = Library::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created .library directory at: {}", library.library_dir().display()),
            );
            output.success(&format!("Initialized library at {}", library.root().display()));
        }

        Commands::Book(cmd) => book::run(cmd, &output)?,

        Commands::Search { field, query } => {
            output.verbose_ctx(
                "search",
                &format!("Searching {} for: {}", field.label(), query),
            );
            book::search(&output, field, &query)?
        }

        Commands::Borrow { id, borrower } => loan::borrow(&output, &id, borrower.as_deref())?,
        Commands::Return { id, borrower } => loan::return_copy(&output, &id, borrower.as_deref())?,
        Commands::Loans { overdue } => loan::list(&output, overdue)?,

        Commands::Menu => menu::run(&output)?,
        Commands::Tui => tui::run(&output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
