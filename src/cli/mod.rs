//! # Command-Line Interface
//!
//! Three front ends over the same ledger.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Library setup | `init` |
//! | Catalog | Books and search | `book add`, `book list`, `book show`, `search title dune` |
//! | Lending | Copies out and back | `borrow B1`, `return B1`, `loans --overdue` |
//! | Interactive | Menu and TUI | `menu`, `tui` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! The default can be changed with `default_format` in the global config.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr:
//! ```bash
//! library --verbose borrow B1 --borrower Alice
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod book;
mod loan;
mod menu;
mod output;
mod tui;

pub use app::{run, Cli, Commands};
pub use menu::run_session;
pub use output::{Output, OutputFormat};
