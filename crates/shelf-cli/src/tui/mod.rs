//! shelf TUI
//!
//! Terminal user interface for the book inventory.
//!
//! ## Layout
//!
//! - Top: search term and active filters
//! - Middle: table of the current page (Title, Author, Genre, Year, Status)
//! - Bottom: pager and key hints
//!
//! ## Navigation
//!
//! - j/k or ↑/↓: Move selection up/down
//! - h/l or ←/→: Previous/next page
//! - /: Live search on title and author
//! - f / s: Cycle genre / status filter
//! - c: Clear search and filters
//! - q: Quit
//!
//! ## Commands
//!
//! - a: Add book
//! - e or Enter: Edit selected book
//! - d: Delete selected book
//! - r: Reload from the server
//!
//! ## Form
//!
//! - Tab / Shift+Tab: Next / previous field
//! - ←/→: Change genre or status
//! - Enter: Add / Update
//! - Esc: Cancel

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use shelf_core::{BookStore, Config, HttpBookStore, InventoryController};
use tracing::info;
use tracing_subscriber::EnvFilter;

use app::{Action, App, InputMode};

/// Run the TUI application
pub async fn run(config: Config) -> Result<()> {
    // Initialize TUI logging (file-based, only if SHELF_LOG is set)
    init_tui_logging(&config);

    let store = HttpBookStore::from_config(&config).context("Failed to create HTTP client")?;
    let mut app = App::new(InventoryController::new(store));

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Initial load
    let result = match perform(&mut terminal, &mut app, Action::Reload).await {
        Ok(()) => run_app(&mut terminal, &mut app).await,
        Err(e) => Err(e),
    };

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend, S: BookStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<()> {
    loop {
        // Check for status message timeout
        app.check_status_timeout();

        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for terminal events
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        // Check for terminal events (non-blocking)
        if event::poll(std::time::Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // If help is showing, any key dismisses it
                if app.show_help {
                    app.show_help = false;
                    continue;
                }

                let action = match app.input_mode {
                    InputMode::Normal => handle_normal_mode(app, key.code, key.modifiers),
                    InputMode::Search => handle_search_mode(app, key.code),
                    InputMode::Form => handle_form_mode(app, key.code, key.modifiers),
                };

                if let Some(action) = action {
                    perform(terminal, app, action).await?;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Show the loading state, then run a remote action
async fn perform<B: Backend, S: BookStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    action: Action,
) -> Result<()> {
    app.is_loading = true;
    terminal.draw(|frame| ui::draw(frame, app))?;

    app.perform(action).await;
    app.is_loading = false;
    Ok(())
}

/// Handle key events in normal mode
fn handle_normal_mode<S: BookStore>(
    app: &mut App<S>,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Option<Action> {
    // Clear status message on navigation keys
    if matches!(
        code,
        KeyCode::Char('j' | 'k' | 'h' | 'l') | KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right
    ) {
        app.status_message = None;
    }

    match code {
        // Quit
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        // Rows
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),

        // Pages
        KeyCode::Char('h') | KeyCode::Left => app.prev_page(),
        KeyCode::Char('l') | KeyCode::Right => app.next_page(),

        // Search and filters
        KeyCode::Char('/') => app.enter_search_mode(),
        KeyCode::Char('f') => app.cycle_genre_filter(),
        KeyCode::Char('s') => app.cycle_status_filter(),
        KeyCode::Char('c') => app.clear_filters(),

        // Commands
        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Char('e') | KeyCode::Enter => app.open_edit_form(),
        KeyCode::Char('d') => return app.delete_selected(),
        KeyCode::Char('r') => return Some(Action::Reload),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }

    None
}

/// Handle key events in search mode
fn handle_search_mode<S: BookStore>(app: &mut App<S>, code: KeyCode) -> Option<Action> {
    match code {
        // Cancel search
        KeyCode::Esc => app.exit_search_mode(false),

        // Confirm search (stay in filtered view)
        KeyCode::Enter => app.exit_search_mode(true),

        // Text input
        KeyCode::Char(c) => app.insert_char(c),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),

        _ => {}
    }

    None
}

/// Handle key events while the add/edit form is open
fn handle_form_mode<S: BookStore>(
    app: &mut App<S>,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Option<Action> {
    match code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => app.cancel_form(),

        KeyCode::Enter => return Some(Action::Submit),

        KeyCode::Tab | KeyCode::Down => app.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.focus_prev(),

        KeyCode::Left => app.form_cycle(false),
        KeyCode::Right => app.form_cycle(true),
        KeyCode::Char(' ') if app.form_focus.is_select() => app.form_cycle(true),

        KeyCode::Char(c) => app.form_insert_char(c),
        KeyCode::Backspace => app.form_delete_char(),

        _ => {}
    }

    None
}

/// Initialize logging for TUI mode
///
/// Only initializes if SHELF_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_tui_logging(config: &Config) {
    // Only log if SHELF_LOG is set
    let Ok(log_level) = std::env::var("SHELF_LOG") else {
        return;
    };

    if config.log_file.is_none() {
        if let Err(e) = config.ensure_data_dir() {
            eprintln!("Warning: {}", e);
            return;
        }
    }

    let log_path = config.log_path();

    // Create log file
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!("shelf_core={},shelf_cli={}", log_level, log_level));

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::{Book, BookFields, Field, Genre, MemoryBookStore, Status};

    fn press<S: BookStore>(app: &mut App<S>, code: KeyCode) -> Option<Action> {
        match app.input_mode {
            InputMode::Normal => handle_normal_mode(app, code, KeyModifiers::NONE),
            InputMode::Search => handle_search_mode(app, code),
            InputMode::Form => handle_form_mode(app, code, KeyModifiers::NONE),
        }
    }

    async fn app_with_books() -> App<MemoryBookStore> {
        let books = vec![Book::new(
            "1",
            BookFields {
                title: "Emma".to_string(),
                author: "Austen".to_string(),
                genre: Genre::Fiction,
                year: 1815,
                status: Status::Available,
            },
        )];
        let mut app = App::new(InventoryController::new(MemoryBookStore::with_books(books)));
        app.perform(Action::Reload).await;
        app
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut app = app_with_books().await;
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = app_with_books().await;
        handle_normal_mode(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_remote_keys_return_actions() {
        let mut app = app_with_books().await;
        assert_eq!(press(&mut app, KeyCode::Char('r')), Some(Action::Reload));
        assert_eq!(
            press(&mut app, KeyCode::Char('d')),
            Some(Action::Delete("1".to_string()))
        );
        assert_eq!(press(&mut app, KeyCode::Char('j')), None);
    }

    #[tokio::test]
    async fn test_search_mode_keys() {
        let mut app = app_with_books().await;
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode, InputMode::Search);

        // 'q' is text while searching
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert!(app.visible_books().is_empty());

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.visible_books().len(), 1);
    }

    #[tokio::test]
    async fn test_form_keys() {
        let mut app = app_with_books().await;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Form);
        assert!(app.inventory.editor().is_edit());

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.form_focus, Field::Genre);
        press(&mut app, KeyCode::Right);
        assert_eq!(
            app.inventory.editor().draft().genre,
            Some(Genre::NonFiction)
        );

        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::Char('!'));
        assert_eq!(app.inventory.editor().draft().author, "Austen!");

        assert_eq!(press(&mut app, KeyCode::Enter), Some(Action::Submit));

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(!app.inventory.editor().is_open());
    }

    #[tokio::test]
    async fn test_help_toggle() {
        let mut app = app_with_books().await;
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
    }
}
