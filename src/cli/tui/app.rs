//! TUI application state and logic

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::event::{Event, EventHandler};
use super::{view, Terminal};
use crate::domain::{
    AdminCredentials, Book, CopyCount, Ledger, LedgerError, LedgerStore, LoanView, SearchField,
    Session,
};

/// One entry of the side menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    AddBook,
    SearchTitle,
    SearchAuthor,
    SearchCategory,
    Borrow,
    Return,
    AllBooks,
    Loans,
}

impl Screen {
    pub const ALL: [Screen; 9] = [
        Screen::Login,
        Screen::AddBook,
        Screen::SearchTitle,
        Screen::SearchAuthor,
        Screen::SearchCategory,
        Screen::Borrow,
        Screen::Return,
        Screen::AllBooks,
        Screen::Loans,
    ];

    pub fn title(self, is_admin: bool) -> &'static str {
        match self {
            Screen::Login => "Admin Login",
            Screen::AddBook if is_admin => "Add Book",
            Screen::AddBook => "(Admin Only) Add Book",
            Screen::SearchTitle => "Search by Title",
            Screen::SearchAuthor => "Search by Author",
            Screen::SearchCategory => "Search by Category",
            Screen::Borrow => "Borrow Book",
            Screen::Return => "Return Book",
            Screen::AllBooks => "View All Books",
            Screen::Loans => "View Borrowed Records",
        }
    }

    /// Input labels, in tab order
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Screen::Login => &["Username", "Password"],
            Screen::AddBook => &["Title", "Author", "Book ID", "Total Copies", "Category"],
            Screen::SearchTitle => &["Title"],
            Screen::SearchAuthor => &["Author"],
            Screen::SearchCategory => &["Category"],
            Screen::Borrow | Screen::Return => &["Book ID", "Your Name"],
            Screen::AllBooks | Screen::Loans => &[],
        }
    }

    pub fn is_masked(self, field: usize) -> bool {
        self == Screen::Login && field == 1
    }

    fn search_field(self) -> Option<SearchField> {
        match self {
            Screen::SearchTitle => Some(SearchField::Title),
            Screen::SearchAuthor => Some(SearchField::Author),
            Screen::SearchCategory => Some(SearchField::Category),
            _ => None,
        }
    }
}

/// Which panel receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Menu,
    Form,
}

/// Rows shown under the form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Results {
    #[default]
    None,
    Books(Vec<Book>),
    Loans(Vec<LoanView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// Application state
pub struct App<S> {
    ledger: Ledger<S>,
    credentials: AdminCredentials,
    session: Session,

    /// Index into [`Screen::ALL`]
    screen_index: usize,

    focus: Focus,

    /// One value per field of the current screen
    inputs: Vec<String>,

    field_index: usize,

    results: Results,

    status: Option<Status>,

    should_quit: bool,
}

impl<S: LedgerStore> App<S> {
    pub fn new(ledger: Ledger<S>, credentials: AdminCredentials) -> Self {
        let mut app = Self {
            ledger,
            credentials,
            session: Session::new(),
            screen_index: 0,
            focus: Focus::Menu,
            inputs: Vec::new(),
            field_index: 0,
            results: Results::None,
            status: None,
            should_quit: false,
        };
        app.select(0);
        app
    }

    /// Run the main application loop
    pub fn run(&mut self, terminal: &mut Terminal, events: EventHandler) -> Result<()> {
        while !self.should_quit() {
            terminal.draw(|frame| view::draw(frame, self))?;

            match events.next()? {
                Event::Key(key) => self.handle_key(key)?,
                Event::Tick => {}
            }
        }

        Ok(())
    }

    /// Handle key events. Only storage failures are returned as errors.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        match self.focus {
            Focus::Menu => self.handle_menu_key(key),
            Focus::Form => self.handle_form_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> Result<()> {
        let count = Screen::ALL.len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.select((self.screen_index + 1) % count),
            KeyCode::Char('k') | KeyCode::Up => self.select((self.screen_index + count - 1) % count),
            KeyCode::Char('r') => self.refresh_listing(),
            KeyCode::Char('o') => {
                let message = if self.session.is_admin() {
                    self.session.logout();
                    "Logged out."
                } else {
                    "Not logged in."
                };
                self.status = Some(Status::Info(message.to_string()));
            }
            KeyCode::Enter | KeyCode::Tab | KeyCode::Right => {
                if self.screen().fields().is_empty() {
                    self.refresh_listing();
                } else {
                    self.focus = Focus::Form;
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        let count = self.inputs.len();
        match key.code {
            KeyCode::Esc => self.focus = Focus::Menu,
            KeyCode::Tab | KeyCode::Down => self.field_index = (self.field_index + 1) % count,
            KeyCode::BackTab | KeyCode::Up => {
                self.field_index = (self.field_index + count - 1) % count
            }
            KeyCode::Backspace => {
                if let Some(value) = self.inputs.get_mut(self.field_index) {
                    value.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(value) = self.inputs.get_mut(self.field_index) {
                    value.push(c);
                }
            }
            KeyCode::Enter => {
                if self.field_index + 1 < count {
                    self.field_index += 1;
                } else {
                    self.submit()?;
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Switches screens and clears the form
    fn select(&mut self, index: usize) {
        self.screen_index = index;
        self.inputs = vec![String::new(); self.screen().fields().len()];
        self.field_index = 0;
        self.results = Results::None;
        self.refresh_listing();
    }

    fn refresh_listing(&mut self) {
        match self.screen() {
            Screen::AllBooks => {
                self.results = Results::Books(self.ledger.view_all_books().to_vec());
            }
            Screen::Loans => {
                self.results = Results::Loans(self.ledger.view_borrowed_records());
            }
            _ => {}
        }
    }

    fn clear_inputs(&mut self) {
        self.inputs.iter_mut().for_each(String::clear);
        self.field_index = 0;
    }

    fn submit(&mut self) -> Result<()> {
        let screen = self.screen();

        if let Some(field) = screen.search_field() {
            let books: Vec<Book> = self.ledger.search(field, &self.inputs[0]).cloned().collect();
            self.status = Some(if books.is_empty() {
                Status::Info("No books found.".to_string())
            } else {
                Status::Info(format!("{} found", books.len()))
            });
            self.results = Results::Books(books);
            return Ok(());
        }

        match screen {
            Screen::Login => {
                let outcome = self
                    .session
                    .login(&self.credentials, &self.inputs[0], &self.inputs[1]);
                self.clear_inputs();
                self.status = Some(match outcome {
                    Ok(()) => {
                        self.focus = Focus::Menu;
                        Status::Info("Admin login successful.".to_string())
                    }
                    Err(err) => Status::Error(format!("{}.", err)),
                });
            }
            Screen::AddBook => {
                if let Err(err) = self.session.require_admin() {
                    self.status = Some(Status::Error(format!("{}.", err)));
                    return Ok(());
                }
                let added = self.inputs[3].parse::<CopyCount>().and_then(|copies| {
                    self.ledger.add_book(
                        &self.inputs[0],
                        &self.inputs[1],
                        &self.inputs[2],
                        copies,
                        &self.inputs[4],
                    )
                });
                match added {
                    Ok(book) => {
                        self.clear_inputs();
                        self.results = Results::Books(vec![book]);
                        self.status = Some(Status::Info("Book added successfully.".to_string()));
                    }
                    Err(err) => self.report(err)?,
                }
            }
            Screen::Borrow | Screen::Return => {
                let borrower = self.inputs[1].trim().to_string();
                if borrower.is_empty() {
                    self.status = Some(Status::Error("Borrower name required.".to_string()));
                    return Ok(());
                }
                let id = self.inputs[0].trim().to_string();
                let message = if screen == Screen::Borrow {
                    self.ledger.borrow_book(&id, &borrower).map(|r| r.to_string())
                } else {
                    self.ledger.return_book(&id, &borrower).map(|r| r.to_string())
                };
                match message {
                    Ok(message) => {
                        self.clear_inputs();
                        self.status = Some(Status::Info(message));
                    }
                    Err(err) => self.report(err)?,
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn report(&mut self, err: LedgerError) -> Result<()> {
        if !err.is_user_facing() {
            return Err(err.into());
        }
        self.status = Some(Status::Error(err.to_string()));
        Ok(())
    }

    // Accessors for views

    pub fn screen(&self) -> Screen {
        Screen::ALL[self.screen_index]
    }

    pub fn screen_index(&self) -> usize {
        self.screen_index
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn field_index(&self) -> usize {
        self.field_index
    }

    pub fn results(&self) -> &Results {
        &self.results
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }
}
