//! Form validation
//!
//! Checks a [`Draft`] against the book field rules and either produces
//! cleaned [`BookFields`] or reports every failing field at once.

use std::collections::BTreeMap;
use std::fmt;
use std::num::IntErrorKind;

use chrono::Datelike;
use thiserror::Error;

use crate::models::{BookFields, Genre, Status};

/// Earliest accepted publication year
pub const MIN_YEAR: i32 = 1500;

/// A book being edited, as typed into the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub author: String,
    pub genre: Option<Genre>,
    /// Year exactly as entered
    pub year: String,
    pub status: Option<Status>,
}

impl Draft {
    /// An empty draft (nothing selected, nothing typed)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Draft pre-filled from stored fields
    pub fn from_fields(fields: &BookFields) -> Self {
        Self {
            title: fields.title.clone(),
            author: fields.author.clone(),
            genre: Some(fields.genre),
            year: fields.year.to_string(),
            status: Some(fields.status),
        }
    }
}

/// Form fields, in form order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Author,
    Genre,
    Year,
    Status,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Title,
        Field::Author,
        Field::Genre,
        Field::Year,
        Field::Status,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Author => "Author",
            Field::Genre => "Genre",
            Field::Year => "Year",
            Field::Status => "Status",
        }
    }

    /// Move to the next field (wrapping)
    pub fn next(self) -> Self {
        match self {
            Field::Title => Field::Author,
            Field::Author => Field::Genre,
            Field::Genre => Field::Year,
            Field::Year => Field::Status,
            Field::Status => Field::Title,
        }
    }

    /// Move to the previous field (wrapping)
    pub fn prev(self) -> Self {
        match self {
            Field::Title => Field::Status,
            Field::Author => Field::Title,
            Field::Genre => Field::Author,
            Field::Year => Field::Genre,
            Field::Status => Field::Year,
        }
    }

    /// Whether the field is chosen from a fixed set rather than typed
    pub fn is_select(self) -> bool {
        matches!(self, Field::Genre | Field::Status)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a single field failed validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Empty text or nothing selected
    #[error("{0}")]
    RequiredFieldMissing(String),
    /// Year outside `MIN_YEAR..=current year`
    #[error("{0}")]
    OutOfRange(String),
    /// Year text is not an integer
    #[error("{0}")]
    NotANumber(String),
}

impl FieldError {
    pub fn message(&self) -> &str {
        match self {
            FieldError::RequiredFieldMissing(msg)
            | FieldError::OutOfRange(msg)
            | FieldError::NotANumber(msg) => msg,
        }
    }
}

/// All field failures of one validation pass
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", self.joined())]
pub struct ValidationErrors {
    errors: BTreeMap<Field, FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: Field) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    /// Failing fields in form order
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.errors.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldError)> {
        self.errors.iter().map(|(field, err)| (*field, err))
    }

    fn insert(&mut self, field: Field, error: FieldError) {
        self.errors.insert(field, error);
    }

    /// `Field: message` pairs in form order, separated by `; `
    fn joined(&self) -> String {
        self.iter()
            .map(|(field, err)| format!("{}: {}", field, err))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validate a draft against the current calendar year
pub fn validate(draft: &Draft) -> Result<BookFields, ValidationErrors> {
    validate_for_year(draft, current_year())
}

/// Validate a draft with an explicit upper bound for the year
pub fn validate_for_year(draft: &Draft, max_year: i32) -> Result<BookFields, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let title = draft.title.trim();
    if title.is_empty() {
        errors.insert(Field::Title, required("Title"));
    }

    let author = draft.author.trim();
    if author.is_empty() {
        errors.insert(Field::Author, required("Author"));
    }

    if draft.genre.is_none() {
        errors.insert(Field::Genre, required("Genre"));
    }

    let year = match parse_year(&draft.year, max_year) {
        Ok(year) => Some(year),
        Err(e) => {
            errors.insert(Field::Year, e);
            None
        }
    };

    if draft.status.is_none() {
        errors.insert(Field::Status, required("Status"));
    }

    match (draft.genre, year, draft.status) {
        (Some(genre), Some(year), Some(status)) if errors.is_empty() => Ok(BookFields {
            title: title.to_string(),
            author: author.to_string(),
            genre,
            year,
            status,
        }),
        _ => Err(errors),
    }
}

/// The current local calendar year
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

fn parse_year(raw: &str, max_year: i32) -> Result<i32, FieldError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(required("Year"));
    }

    let year: i32 = raw.parse().map_err(|e: std::num::ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow => too_late(),
        IntErrorKind::NegOverflow => too_early(),
        _ => FieldError::NotANumber("Year must be a whole number".to_string()),
    })?;

    if year < MIN_YEAR {
        return Err(too_early());
    }
    if year > max_year {
        return Err(too_late());
    }

    Ok(year)
}

fn too_early() -> FieldError {
    FieldError::OutOfRange(format!("Minimum year is {}", MIN_YEAR))
}

fn too_late() -> FieldError {
    FieldError::OutOfRange("Future year not allowed".to_string())
}

fn required(label: &str) -> FieldError {
    FieldError::RequiredFieldMissing(format!("{} is required", label))
}
