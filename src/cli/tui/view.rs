//! Layout: screen menu on the left, form and results on the right

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Row, Table},
};

use super::app::{App, Focus, Results, Screen, Status};
use crate::domain::{Book, LedgerStore, LoanView};

/// Draw the whole frame
pub fn draw<S: LedgerStore>(frame: &mut Frame, app: &App<S>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(3)])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(30)])
        .split(rows[0]);

    // Two border rows around one line per field
    let form_height = app.inputs().len() as u16 + 2;
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(form_height.max(3)), Constraint::Min(5)])
        .split(columns[1]);

    draw_menu(frame, app, columns[0]);
    draw_form(frame, app, right[0]);
    draw_results(frame, app, right[1]);
    draw_status_bar(frame, app, rows[1]);
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn draw_menu<S: LedgerStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let focused = app.focus() == Focus::Menu;

    let items: Vec<ListItem> = Screen::ALL
        .iter()
        .map(|screen| ListItem::new(screen.title(app.is_admin())))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title("Library")
                .borders(Borders::ALL)
                .border_style(border_style(focused)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.screen_index()));

    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_form<S: LedgerStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let screen = app.screen();
    let focused = app.focus() == Focus::Form;

    let lines: Vec<Line> = if screen.fields().is_empty() {
        vec![Line::from("Press Enter or r to refresh")]
    } else {
        screen
            .fields()
            .iter()
            .zip(app.inputs())
            .enumerate()
            .map(|(i, (label, value))| {
                let shown = if screen.is_masked(i) {
                    "*".repeat(value.chars().count())
                } else {
                    value.clone()
                };
                let active = focused && i == app.field_index();
                let cursor = if active { "_" } else { "" };
                let style = if active {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::styled(format!("{:<14}", format!("{}:", label)), style),
                    Span::raw(format!("{}{}", shown, cursor)),
                ])
            })
            .collect()
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(screen.title(app.is_admin()))
            .borders(Borders::ALL)
            .border_style(border_style(focused)),
    );

    frame.render_widget(paragraph, area);
}

fn book_row(book: &Book) -> Row<'static> {
    Row::new(vec![
        book.id.to_string(),
        book.title.clone(),
        book.author.clone(),
        book.category.clone(),
        format!("{}/{}", book.available_copies(), book.total_copies()),
    ])
}

fn loan_row(loan: &LoanView) -> Row<'static> {
    Row::new(vec![
        loan.book_id.to_string(),
        loan.title.clone(),
        loan.borrower.clone(),
        loan.borrowed_at.format("%Y-%m-%d").to_string(),
        loan.due_at.format("%Y-%m-%d").to_string(),
    ])
}

fn draw_results<S: LedgerStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let header_style = Style::default().add_modifier(Modifier::BOLD);
    let widths = [
        Constraint::Length(10),
        Constraint::Percentage(35),
        Constraint::Percentage(25),
        Constraint::Percentage(20),
        Constraint::Length(11),
    ];

    let (title, header, rows): (&str, [&str; 5], Vec<Row>) = match app.results() {
        Results::None => {
            let block = Block::default().title("Results").borders(Borders::ALL);
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        }
        Results::Books(books) if books.is_empty() => {
            let block = Block::default().title("Books").borders(Borders::ALL);
            frame.render_widget(Paragraph::new("No books in library.").block(block), area);
            return;
        }
        Results::Loans(loans) if loans.is_empty() => {
            let block = Block::default().title("Loans").borders(Borders::ALL);
            frame.render_widget(Paragraph::new("No borrowed books.").block(block), area);
            return;
        }
        Results::Books(books) => (
            "Books",
            ["ID", "Title", "Author", "Category", "Available"],
            books.iter().map(book_row).collect(),
        ),
        Results::Loans(loans) => (
            "Loans",
            ["ID", "Title", "Borrower", "Borrowed", "Due"],
            loans.iter().map(loan_row).collect(),
        ),
    };

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(header_style))
        .block(Block::default().title(title).borders(Borders::ALL));

    frame.render_widget(table, area);
}

fn draw_status_bar<S: LedgerStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let (message, style) = match app.status() {
        Some(Status::Info(text)) => (text.clone(), Style::default().fg(Color::Green)),
        Some(Status::Error(text)) => (text.clone(), Style::default().fg(Color::Red)),
        None => {
            let hint = match app.focus() {
                Focus::Menu => "j/k:move Enter:open r:refresh o:logout q:quit",
                Focus::Form => "Tab:next field Enter:submit Esc:menu",
            };
            (hint.to_string(), Style::default())
        }
    };

    let ledger = app.ledger();
    let role = if app.is_admin() { "admin" } else { "guest" };
    let text = format!(
        "[{}] {} books, {} on loan | {}",
        role,
        ledger.view_all_books().len(),
        ledger.state().loans.len(),
        message
    );

    let paragraph = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}
