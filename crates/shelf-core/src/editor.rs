//! Record editor
//!
//! Create/edit dialog flow for a single book. The editor owns the draft,
//! validates it on submit and hands back a [`Submission`] for the caller
//! to persist.
//!
//! States: `Closed` -> `OpenCreate` | `OpenEdit` -> (submit ok) `Closed`,
//! (submit failed) stays open with field errors, (cancel) `Closed`.

use tracing::debug;

use crate::models::{Book, BookFields, Genre, Status};
use crate::validate::{self, Draft, Field, FieldError, ValidationErrors};

/// Editor state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Closed,
    /// Adding a new book
    OpenCreate,
    /// Editing the stored book with this id
    OpenEdit { id: String },
}

/// Where a validated draft should be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    Create,
    Update(String),
}

/// A validated draft ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub target: SaveTarget,
    pub fields: BookFields,
}

/// Replacement values applied to the draft before submitting
///
/// Unset values keep whatever the draft already holds.
#[derive(Debug, Clone, Default)]
pub struct DraftOverrides {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<Genre>,
    pub year: Option<String>,
    pub status: Option<Status>,
}

impl DraftOverrides {
    fn apply(self, draft: &mut Draft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(author) = self.author {
            draft.author = author;
        }
        if let Some(genre) = self.genre {
            draft.genre = Some(genre);
        }
        if let Some(year) = self.year {
            draft.year = year;
        }
        if let Some(status) = self.status {
            draft.status = Some(status);
        }
    }
}

/// Create/edit dialog state
#[derive(Debug, Clone)]
pub struct RecordEditor {
    state: EditorState,
    draft: Draft,
    errors: ValidationErrors,
}

impl Default for RecordEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordEditor {
    pub fn new() -> Self {
        Self {
            state: EditorState::Closed,
            draft: Draft::empty(),
            errors: ValidationErrors::default(),
        }
    }

    /// Open for editing `existing`, or for a new book when `None`
    ///
    /// The draft is always replaced, so nothing carries over from a
    /// previous session.
    pub fn open(&mut self, existing: Option<&Book>) {
        match existing {
            Some(book) => {
                debug!("Opening editor for book {}", book.id);
                self.state = EditorState::OpenEdit {
                    id: book.id.clone(),
                };
                self.draft = Draft::from_fields(&book.fields);
            }
            None => {
                debug!("Opening editor for a new book");
                self.state = EditorState::OpenCreate;
                self.draft = Draft::empty();
            }
        }
        self.errors = ValidationErrors::default();
    }

    /// Reopen with the values of a submission that could not be saved
    pub fn restore(&mut self, submission: Submission) {
        self.state = match submission.target {
            SaveTarget::Create => EditorState::OpenCreate,
            SaveTarget::Update(id) => EditorState::OpenEdit { id },
        };
        self.draft = Draft::from_fields(&submission.fields);
        self.errors = ValidationErrors::default();
    }

    /// Validate the current draft
    ///
    /// On success the editor closes and the cleaned fields are returned.
    /// On failure it stays open and the errors are kept for display.
    /// Submitting a closed editor yields `None`.
    pub fn submit(&mut self) -> Option<Result<Submission, ValidationErrors>> {
        self.submit_with(DraftOverrides::default())
    }

    /// Apply `overrides` to the draft, then [`submit`](Self::submit)
    pub fn submit_with(
        &mut self,
        overrides: DraftOverrides,
    ) -> Option<Result<Submission, ValidationErrors>> {
        let target = match &self.state {
            EditorState::Closed => return None,
            EditorState::OpenCreate => SaveTarget::Create,
            EditorState::OpenEdit { id } => SaveTarget::Update(id.clone()),
        };

        overrides.apply(&mut self.draft);

        match validate::validate(&self.draft) {
            Ok(fields) => {
                self.close();
                Some(Ok(Submission { target, fields }))
            }
            Err(errors) => {
                debug!("Draft rejected: {}", errors);
                self.errors = errors.clone();
                Some(Err(errors))
            }
        }
    }

    /// Discard the draft and close
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.state = EditorState::Closed;
        self.draft = Draft::empty();
        self.errors = ValidationErrors::default();
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != EditorState::Closed
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.state, EditorState::OpenEdit { .. })
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    /// Errors from the last failed submit
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error_for(&self, field: Field) -> Option<&FieldError> {
        self.errors.get(field)
    }
}
