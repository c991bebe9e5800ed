//! Form-based terminal UI over the ledger
//!
//! Mirrors the console menu: the same screens, one form each, with results
//! listed underneath.

mod app;
mod event;
mod view;

use std::io::{self, Stdout};
use std::panic::{self, AssertUnwindSafe};

use anyhow::{anyhow, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::CrosstermBackend;

use super::Output;
use crate::storage::Library;
use app::App;
use event::EventHandler;

pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

fn init_terminal() -> Result<Terminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(ratatui::Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Launch the TUI
pub fn run(output: &Output) -> Result<()> {
    output.verbose_ctx("tui", "Initializing TUI application");

    // Load before touching the terminal so errors print normally
    let library = Library::open_current()?;
    let ledger = library.ledger()?;
    let mut app = App::new(ledger, library.credentials().clone());

    let mut terminal = init_terminal()?;
    let events = EventHandler::new(250);

    let result = panic::catch_unwind(AssertUnwindSafe(|| app.run(&mut terminal, events)));

    // Restore even on panic
    let restore_result = restore_terminal();

    match result {
        Ok(inner) => {
            restore_result?;
            inner
        }
        Err(payload) => {
            if let Some(s) = payload.downcast_ref::<&str>() {
                Err(anyhow!("TUI panicked: {}", s))
            } else if let Some(s) = payload.downcast_ref::<String>() {
                Err(anyhow!("TUI panicked: {}", s))
            } else {
                Err(anyhow!("TUI panicked with unknown error"))
            }
        }
    }
}
