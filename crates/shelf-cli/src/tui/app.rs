//! Application state and logic

use std::time::{Duration, Instant};

use shelf_core::{Book, BookStore, Field, Genre, InventoryController, Status, SubmitOutcome};

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Live search (after pressing /)
    Search,
    /// Add/edit form is open
    Form,
}

/// Remote work requested by a key press
///
/// Key handlers only update local state; anything that talks to the
/// store is returned as an action so the loop can show "Loading..."
/// before awaiting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Reload the collection
    Reload,
    /// Delete the book with this id
    Delete(String),
    /// Validate and save the open form
    Submit,
}

/// Application state
pub struct App<S> {
    /// Loaded books, filters, paging and the record editor
    pub inventory: InventoryController<S>,
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Search input buffer
    pub search_input: String,
    /// Cursor position in search input (in characters)
    pub search_cursor: usize,
    /// Selected row on the visible page
    pub row_index: usize,
    /// Focused form field
    pub form_focus: Field,
    /// Whether a remote call is in flight
    pub is_loading: bool,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Whether help overlay is visible
    pub show_help: bool,
}

impl<S: BookStore> App<S> {
    pub fn new(inventory: InventoryController<S>) -> Self {
        Self {
            inventory,
            should_quit: false,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            search_cursor: 0,
            row_index: 0,
            form_focus: Field::Title,
            is_loading: false,
            status_message: None,
            status_message_time: None,
            show_help: false,
        }
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Books on the current page
    pub fn visible_books(&self) -> Vec<&Book> {
        self.inventory.visible_page()
    }

    /// Get the currently selected book
    pub fn selected_book(&self) -> Option<&Book> {
        self.visible_books().get(self.row_index).copied()
    }

    pub fn move_up(&mut self) {
        self.row_index = self.row_index.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        let rows = self.visible_books().len();
        if self.row_index + 1 < rows {
            self.row_index += 1;
        }
    }

    pub fn next_page(&mut self) {
        self.inventory.next_page();
        self.row_index = 0;
    }

    pub fn prev_page(&mut self) {
        self.inventory.prev_page();
        self.row_index = 0;
    }

    /// Keep the selection inside the visible page
    pub fn clamp_row(&mut self) {
        let rows = self.visible_books().len();
        self.row_index = self.row_index.min(rows.saturating_sub(1));
    }

    /// Enter search mode, editing the current term
    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Search;
        self.search_input = self.inventory.filters().search.clone();
        self.search_cursor = self.search_input.chars().count();
    }

    /// Leave search mode; `keep` false drops the term
    pub fn exit_search_mode(&mut self, keep: bool) {
        self.input_mode = InputMode::Normal;
        if !keep {
            self.search_input.clear();
            self.search_cursor = 0;
            self.inventory.set_search_term("");
            self.row_index = 0;
        }
    }

    /// Insert character at cursor position
    pub fn insert_char(&mut self, c: char) {
        let at = byte_offset(&self.search_input, self.search_cursor);
        self.search_input.insert(at, c);
        self.search_cursor += 1;
        self.apply_search();
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        if self.search_cursor > 0 {
            self.search_cursor -= 1;
            let at = byte_offset(&self.search_input, self.search_cursor);
            self.search_input.remove(at);
            self.apply_search();
        }
    }

    /// Move cursor left
    pub fn cursor_left(&mut self) {
        if self.search_cursor > 0 {
            self.search_cursor -= 1;
        }
    }

    /// Move cursor right
    pub fn cursor_right(&mut self) {
        if self.search_cursor < self.search_input.chars().count() {
            self.search_cursor += 1;
        }
    }

    fn apply_search(&mut self) {
        self.inventory.set_search_term(self.search_input.clone());
        self.row_index = 0;
    }

    pub fn cycle_genre_filter(&mut self) {
        self.inventory.cycle_genre_filter();
        self.row_index = 0;
    }

    pub fn cycle_status_filter(&mut self) {
        self.inventory.cycle_status_filter();
        self.row_index = 0;
    }

    pub fn clear_filters(&mut self) {
        self.inventory.clear_filters();
        self.search_input.clear();
        self.search_cursor = 0;
        self.row_index = 0;
    }

    /// Open the form for a new book
    pub fn open_add_form(&mut self) {
        self.inventory.open_editor(None);
        self.input_mode = InputMode::Form;
        self.form_focus = Field::Title;
    }

    /// Open the form for the selected book
    pub fn open_edit_form(&mut self) {
        let Some(id) = self.selected_book().map(|b| b.id.clone()) else {
            return;
        };
        if self.inventory.open_editor(Some(&id)) {
            self.input_mode = InputMode::Form;
            self.form_focus = Field::Title;
        }
    }

    /// Close the form without saving
    pub fn cancel_form(&mut self) {
        self.inventory.cancel_editor();
        self.input_mode = InputMode::Normal;
    }

    pub fn focus_next(&mut self) {
        self.form_focus = self.form_focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.form_focus = self.form_focus.prev();
    }

    /// Type into the focused text field
    pub fn form_insert_char(&mut self, c: char) {
        let focus = self.form_focus;
        let draft = self.inventory.editor_mut().draft_mut();
        match focus {
            Field::Title => draft.title.push(c),
            Field::Author => draft.author.push(c),
            Field::Year => draft.year.push(c),
            Field::Genre | Field::Status => {}
        }
    }

    /// Delete the last character of the focused text field
    pub fn form_delete_char(&mut self) {
        let focus = self.form_focus;
        let draft = self.inventory.editor_mut().draft_mut();
        match focus {
            Field::Title => {
                draft.title.pop();
            }
            Field::Author => {
                draft.author.pop();
            }
            Field::Year => {
                draft.year.pop();
            }
            Field::Genre | Field::Status => {}
        }
    }

    /// Step the focused select field through its options
    pub fn form_cycle(&mut self, forward: bool) {
        let focus = self.form_focus;
        let draft = self.inventory.editor_mut().draft_mut();
        match focus {
            Field::Genre => {
                draft.genre = Some(match (draft.genre, forward) {
                    (None, true) => Genre::ALL[0],
                    (None, false) => Genre::ALL[Genre::ALL.len() - 1],
                    (Some(genre), true) => genre.next(),
                    (Some(genre), false) => genre.prev(),
                });
            }
            Field::Status => {
                draft.status = Some(match draft.status {
                    None => Status::ALL[0],
                    Some(status) => status.next(),
                });
            }
            Field::Title | Field::Author | Field::Year => {}
        }
    }

    /// Request deletion of the selected book
    pub fn delete_selected(&self) -> Option<Action> {
        self.selected_book().map(|b| Action::Delete(b.id.clone()))
    }

    /// Run a remote action against the store
    ///
    /// Failures are already logged by the controller; the list simply
    /// stays as it was.
    pub async fn perform(&mut self, action: Action) {
        match action {
            Action::Reload => {
                if self.inventory.refresh().await.is_ok() {
                    self.set_status(format!("Loaded {} books", self.inventory.books().len()));
                }
            }
            Action::Delete(id) => {
                let title = self
                    .inventory
                    .book(&id)
                    .map(|b| b.title().to_string())
                    .unwrap_or_else(|| id.clone());
                if self.inventory.remove(&id).await.is_ok() {
                    self.set_status(format!("Deleted '{}'", title));
                }
            }
            Action::Submit => match self.inventory.submit_editor().await {
                SubmitOutcome::Saved { .. } => {
                    self.set_status("Saved");
                }
                SubmitOutcome::Invalid(errors) => {
                    if let Some(first) = errors.fields().next() {
                        self.form_focus = first;
                    }
                }
                SubmitOutcome::SaveFailed(_) | SubmitOutcome::NotOpen => {}
            },
        }

        self.input_mode = match self.input_mode {
            InputMode::Form if !self.inventory.editor().is_open() => InputMode::Normal,
            mode => mode,
        };
        self.clamp_row();
    }
}

/// Byte index of the `chars`-th character
fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i)
}
