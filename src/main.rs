//! Library Ledger - local-first book lending tracker

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = library_ledger::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
