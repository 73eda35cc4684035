//! UI rendering

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};
use shelf_core::{BookStore, Field, RecordEditor};

use super::app::{App, InputMode};

/// Width of the label column in the form
const LABEL_WIDTH: u16 = 9;

/// Main UI rendering function
pub fn draw<S: BookStore>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_filters_bar(frame, app, chunks[0]);
    draw_books_table(frame, app, chunks[1]);
    draw_pager(frame, app, chunks[2]);

    match app.input_mode {
        InputMode::Search => draw_search_input(frame, app, chunks[3]),
        InputMode::Normal | InputMode::Form => draw_status_bar(frame, app, chunks[3]),
    }

    if app.inventory.editor().is_open() {
        draw_form(frame, app.inventory.editor(), app.form_focus);
    }

    // Draw help overlay if visible
    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Search term and active filters
fn draw_filters_bar<S: BookStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let filters = app.inventory.filters();
    let label = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let search = if filters.search.is_empty() {
        Span::styled("-", dim)
    } else {
        Span::raw(filters.search.as_str())
    };

    let line = Line::from(vec![
        Span::styled("Search: ", label),
        search,
        Span::raw("   "),
        Span::styled("Genre: ", label),
        Span::raw(filters.genre.map_or("All", |g| g.as_str())),
        Span::raw("   "),
        Span::styled("Status: ", label),
        Span::raw(filters.status.map_or("All", |s| s.as_str())),
    ]);

    let border_style = if app.input_mode == InputMode::Search {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .title(" Book Inventory ")
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Table of the visible page
fn draw_books_table<S: BookStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let block = Block::default()
        .title(format!(" Books ({}) ", app.inventory.filtered().len()))
        .borders(Borders::ALL);

    let books = app.visible_books();

    if app.is_loading || books.is_empty() {
        let message = if app.is_loading {
            "Loading..."
        } else {
            "No books found."
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(
            message,
            Style::default().add_modifier(Modifier::DIM),
        )))
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(["Title", "Author", "Genre", "Year", "Status"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = books
        .iter()
        .map(|book| {
            Row::new(vec![
                Cell::from(book.title().to_string()),
                Cell::from(book.author().to_string()),
                Cell::from(book.genre().as_str()),
                Cell::from(book.year().to_string()),
                Cell::from(book.status().as_str()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(38),
        Constraint::Percentage(28),
        Constraint::Length(12),
        Constraint::Length(6),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    state.select(Some(app.row_index));

    frame.render_stateful_widget(table, area, &mut state);
}

/// "Page x of y" footer
fn draw_pager<S: BookStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let pages = app.inventory.page_count().max(1);
    let text = format!("Page {} of {}", app.inventory.page(), pages);

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Draw the status bar at the bottom
fn draw_status_bar<S: BookStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let content = if app.is_loading {
        "Loading...".to_string()
    } else if let Some(msg) = &app.status_message {
        msg.clone()
    } else if app.input_mode == InputMode::Form {
        "Tab:next field  ←/→:choose  Enter:save  Esc:cancel".to_string()
    } else {
        "a:add  e:edit  d:del  /:search  f:genre  s:status  c:clear  r:reload  ?:help  q:quit"
            .to_string()
    };

    let paragraph = Paragraph::new(content).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Draw search input at the bottom
fn draw_search_input<S: BookStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let prefix = "/";

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::Cyan)),
        Span::raw(app.search_input.as_str()),
        Span::styled(
            format!("  ({} matches)", app.inventory.filtered().len()),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    let paragraph = Paragraph::new(line);
    frame.render_widget(paragraph, area);

    // Position cursor
    let cursor_x = area.x + prefix.len() as u16 + app.search_cursor as u16;
    frame.set_cursor_position((cursor_x, area.y));
}

/// Centered rectangle of at most `width` x `height`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Draw the add/edit form as a modal
fn draw_form(frame: &mut Frame, editor: &RecordEditor, focus: Field) {
    // One blank line, two lines per field, one blank line, buttons, borders
    let height = 1 + Field::ALL.len() as u16 * 2 + 2 + 2;
    let popup_area = centered(frame.area(), 56, height);

    frame.render_widget(Clear, popup_area);

    let (title, submit) = if editor.is_edit() {
        (" Edit Book ", "Update")
    } else {
        (" Add New Book ", "Add")
    };

    let draft = editor.draft();
    let mut lines = vec![Line::from("")];

    for field in Field::ALL {
        let focused = field == focus;
        let label_style = if focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let value = match field {
            Field::Title => Span::raw(draft.title.clone()),
            Field::Author => Span::raw(draft.author.clone()),
            Field::Year => Span::raw(draft.year.clone()),
            Field::Genre => select_span(draft.genre.map(|g| g.as_str()), "Select genre", focused),
            Field::Status => {
                select_span(draft.status.map(|s| s.as_str()), "Select status", focused)
            }
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<width$}", format!("{}:", field.label()), width = LABEL_WIDTH as usize),
                label_style,
            ),
            value,
        ]));

        let error = editor
            .error_for(field)
            .map(|e| e.message().to_string())
            .unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!("{:width$}{}", "", error, width = LABEL_WIDTH as usize),
            Style::default().fg(Color::Red),
        )));
    }

    lines.push(Line::from(""));
    lines.push(
        Line::from(vec![
            Span::styled(
                format!("[ {} ]", submit),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled("[ Cancel ]", Style::default().add_modifier(Modifier::DIM)),
        ])
        .alignment(Alignment::Center),
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    frame.render_widget(Paragraph::new(lines).block(block), popup_area);

    // Cursor at the end of the focused text field
    let text = match focus {
        Field::Title => Some(&draft.title),
        Field::Author => Some(&draft.author),
        Field::Year => Some(&draft.year),
        Field::Genre | Field::Status => None,
    };
    if let Some(text) = text {
        let row = Field::ALL.iter().position(|f| *f == focus).unwrap_or(0) as u16;
        let x = popup_area.x + 1 + LABEL_WIDTH + text.chars().count() as u16;
        let y = popup_area.y + 2 + row * 2;
        if x < popup_area.right().saturating_sub(1) && y < popup_area.bottom().saturating_sub(1) {
            frame.set_cursor_position((x, y));
        }
    }
}

/// A select field value, with arrows when focused
fn select_span(value: Option<&str>, placeholder: &str, focused: bool) -> Span<'static> {
    let text = value.unwrap_or(placeholder);
    let style = if value.is_some() {
        Style::default()
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    if focused {
        Span::styled(format!("< {} >", text), style.add_modifier(Modifier::REVERSED))
    } else {
        Span::styled(text.to_string(), style)
    }
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = centered(frame.area(), 50, 24);

    // Clear the popup area
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  h/l, ←/→    Previous/next page"),
        Line::from(""),
        Line::from("Search and filters:"),
        Line::from("  /           Search title and author"),
        Line::from("  f           Cycle genre filter"),
        Line::from("  s           Cycle status filter"),
        Line::from("  c           Clear search and filters"),
        Line::from(""),
        Line::from("Commands:"),
        Line::from("  a           Add book"),
        Line::from("  e, Enter    Edit book"),
        Line::from("  d           Delete book"),
        Line::from("  r           Reload"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from("Form: Tab moves, ←/→ chooses, Enter saves"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use shelf_core::{Book, BookFields, Genre, InventoryController, MemoryBookStore, Status};

    use crate::tui::app::Action;

    fn render(app: &App<MemoryBookStore>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    async fn app_with(n: usize) -> App<MemoryBookStore> {
        let books = (1..=n)
            .map(|i| {
                Book::new(
                    i.to_string(),
                    BookFields {
                        title: format!("Book {}", i),
                        author: "Author".to_string(),
                        genre: Genre::Fantasy,
                        year: 1999,
                        status: Status::Issued,
                    },
                )
            })
            .collect();
        let mut app = App::new(InventoryController::new(MemoryBookStore::with_books(books)));
        app.perform(Action::Reload).await;
        app
    }

    #[tokio::test]
    async fn test_table_and_pager() {
        let app = app_with(12).await;
        let screen = render(&app);
        assert!(screen.contains("Book 1 "));
        assert!(screen.contains("Fantasy"));
        assert!(screen.contains("Page 1 of 2"));
        assert!(!screen.contains("Book 11"));
    }

    #[tokio::test]
    async fn test_empty_and_loading() {
        let mut app = app_with(0).await;
        assert!(render(&app).contains("No books found."));

        app.is_loading = true;
        assert!(render(&app).contains("Loading..."));
    }

    #[tokio::test]
    async fn test_form_titles_and_errors() {
        let mut app = app_with(1).await;
        app.open_add_form();
        let screen = render(&app);
        assert!(screen.contains("Add New Book"));
        assert!(screen.contains("[ Add ]"));

        app.perform(Action::Submit).await;
        assert!(render(&app).contains("Title is required"));

        app.cancel_form();
        app.open_edit_form();
        let screen = render(&app);
        assert!(screen.contains("Edit Book"));
        assert!(screen.contains("[ Update ]"));
    }

    #[test]
    fn test_centered_fits() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = centered(area, 56, 16);
        assert!(popup.width <= 36);
        assert!(popup.height <= 8);
        assert_eq!(popup.x, (40 - popup.width) / 2);
    }
}
