//! Numbered console menu
//!
//! Reads one choice per line and prompts for the fields each action needs.
//! Expected outcomes are printed and the menu comes back; storage failures
//! end the session with an error. End of input exits like choice 9.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use super::output::Output;
use crate::domain::{
    AdminCredentials, Book, CopyCount, Ledger, LedgerError, LedgerStore, SearchField, Session,
};
use crate::storage::Library;

/// Runs the menu against the library in the current directory
pub fn run(output: &Output) -> Result<()> {
    let library = Library::open_current()?;
    let mut ledger = library.ledger()?;
    output.verbose_ctx("menu", &format!("Library at {}", library.root().display()));

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_session(
        &mut ledger,
        library.credentials(),
        stdin.lock(),
        stdout.lock(),
        output,
    )
}

enum Step {
    Continue,
    Exit,
}

struct Console<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    fn say(&mut self, line: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.out, "{}", line)
    }

    /// Prompts for one line. `None` at end of input.
    fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", label)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompts for every label in turn. `None` if input ends part way.
    fn ask_all<const N: usize>(&mut self, labels: [&str; N]) -> io::Result<Option<[String; N]>> {
        let mut values = Vec::with_capacity(N);
        for label in labels {
            match self.ask(label)? {
                Some(value) => values.push(value),
                None => return Ok(None),
            }
        }
        Ok(values.try_into().ok())
    }

    fn show_menu(&mut self, is_admin: bool) -> io::Result<()> {
        self.say("\nWelcome to Digital Library System")?;
        if !is_admin {
            self.say("0. Admin Login")?;
        }
        self.say(if is_admin {
            "1. Add Book"
        } else {
            "1. (Admin Only) Add Book"
        })?;
        self.say("2. Search by Title")?;
        self.say("3. Search by Author")?;
        self.say("4. Search by Category")?;
        self.say("5. Borrow Book")?;
        self.say("6. Return Book")?;
        self.say("7. View All Books")?;
        self.say("8. View Borrowed Records")?;
        self.say("9. Exit")
    }

    fn list_books<'a>(&mut self, books: impl IntoIterator<Item = &'a Book>) -> io::Result<()> {
        let mut any = false;
        for book in books {
            any = true;
            self.say(book)?;
        }
        if !any {
            self.say("No books found.")?;
        }
        Ok(())
    }

    /// Prints an expected outcome, or hands back a storage failure
    fn report(&mut self, err: LedgerError) -> Result<()> {
        if err.is_user_facing() {
            self.say(err)?;
            Ok(())
        } else {
            Err(err.into())
        }
    }
}

/// Runs the menu loop over any input and output
pub fn run_session<S, R, W>(
    ledger: &mut Ledger<S>,
    credentials: &AdminCredentials,
    input: R,
    out: W,
    output: &Output,
) -> Result<()>
where
    S: LedgerStore,
    R: BufRead,
    W: Write,
{
    let mut console = Console { input, out };
    let mut session = Session::new();

    loop {
        console.show_menu(session.is_admin())?;
        let Some(choice) = console.ask("Enter your choice: ")? else {
            break;
        };
        output.verbose_ctx("menu", &format!("Choice: {}", choice));

        let step = match choice.as_str() {
            "0" if !session.is_admin() => login(&mut console, &mut session, credentials)?,
            "1" => add_book(&mut console, &session, ledger)?,
            "2" => search(&mut console, ledger, SearchField::Title)?,
            "3" => search(&mut console, ledger, SearchField::Author)?,
            "4" => search(&mut console, ledger, SearchField::Category)?,
            "5" => borrow(&mut console, ledger)?,
            "6" => return_copy(&mut console, ledger)?,
            "7" => {
                let books = ledger.view_all_books();
                if books.is_empty() {
                    console.say("No books in library.")?;
                } else {
                    for book in books {
                        console.say(book)?;
                    }
                }
                Step::Continue
            }
            "8" => {
                let records = ledger.view_borrowed_records();
                if records.is_empty() {
                    console.say("No borrowed books.")?;
                } else {
                    for record in &records {
                        console.say(record)?;
                    }
                }
                Step::Continue
            }
            "9" => {
                console.say("Exiting...")?;
                Step::Exit
            }
            _ => {
                console.say("Invalid choice. Try again.")?;
                Step::Continue
            }
        };

        if let Step::Exit = step {
            break;
        }
    }

    Ok(())
}

fn login<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    session: &mut Session,
    credentials: &AdminCredentials,
) -> Result<Step> {
    let Some([username, password]) =
        console.ask_all(["Enter admin username: ", "Enter admin password: "])?
    else {
        return Ok(Step::Exit);
    };

    match session.login(credentials, &username, &password) {
        Ok(()) => console.say("Admin login successful.")?,
        Err(err) => console.say(format!("{}.", err))?,
    }
    Ok(Step::Continue)
}

fn add_book<S: LedgerStore, R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    session: &Session,
    ledger: &mut Ledger<S>,
) -> Result<Step> {
    if let Err(err) = session.require_admin() {
        console.say(format!("{}.", err))?;
        return Ok(Step::Continue);
    }

    let Some([title, author, id, copies, category]) = console.ask_all([
        "Enter Title: ",
        "Enter Author: ",
        "Enter Book ID: ",
        "Enter Total Copies: ",
        "Enter Category: ",
    ])?
    else {
        return Ok(Step::Exit);
    };

    let added = copies
        .parse::<CopyCount>()
        .and_then(|copies| ledger.add_book(&title, &author, &id, copies, &category));
    match added {
        Ok(_) => console.say("Book added successfully.")?,
        Err(err) => console.report(err)?,
    }
    Ok(Step::Continue)
}

fn search<S: LedgerStore, R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    ledger: &Ledger<S>,
    field: SearchField,
) -> Result<Step> {
    let label = match field {
        SearchField::Title => "Enter Title to search: ",
        SearchField::Author => "Enter Author to search: ",
        SearchField::Category => "Enter Category to search: ",
    };
    let Some(query) = console.ask(label)? else {
        return Ok(Step::Exit);
    };

    console.list_books(ledger.search(field, &query))?;
    Ok(Step::Continue)
}

fn borrow<S: LedgerStore, R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    ledger: &mut Ledger<S>,
) -> Result<Step> {
    let Some([id, borrower]) = console.ask_all(["Enter Book ID: ", "Enter Your Name: "])? else {
        return Ok(Step::Exit);
    };
    if borrower.is_empty() {
        console.say("Borrower name required.")?;
        return Ok(Step::Continue);
    }

    match ledger.borrow_book(&id, &borrower) {
        Ok(receipt) => console.say(receipt)?,
        Err(err) => console.report(err)?,
    }
    Ok(Step::Continue)
}

fn return_copy<S: LedgerStore, R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    ledger: &mut Ledger<S>,
) -> Result<Step> {
    let Some([id, borrower]) = console.ask_all(["Enter Book ID: ", "Enter Your Name: "])? else {
        return Ok(Step::Exit);
    };
    if borrower.is_empty() {
        console.say("Borrower name required.")?;
        return Ok(Step::Continue);
    }

    match ledger.return_book(&id, &borrower) {
        Ok(receipt) => console.say(receipt)?,
        Err(err) => console.report(err)?,
    }
    Ok(Step::Continue)
}
