//! Data models for shelf
//!
//! Defines the book record and its closed value sets (genre, status).
//! Field names match the JSON documents held by the remote collection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Book genre
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Genre {
    Fiction,
    #[serde(rename = "Non-fiction")]
    NonFiction,
    Fantasy,
    #[serde(rename = "Sci-fi")]
    SciFi,
}

impl Genre {
    /// All genres, in display order
    pub const ALL: [Genre; 4] = [Genre::Fiction, Genre::NonFiction, Genre::Fantasy, Genre::SciFi];

    /// The label used on the wire and in the UI
    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Fiction => "Fiction",
            Genre::NonFiction => "Non-fiction",
            Genre::Fantasy => "Fantasy",
            Genre::SciFi => "Sci-fi",
        }
    }

    /// Next genre in display order (wrapping)
    pub fn next(self) -> Self {
        match self {
            Genre::Fiction => Genre::NonFiction,
            Genre::NonFiction => Genre::Fantasy,
            Genre::Fantasy => Genre::SciFi,
            Genre::SciFi => Genre::Fiction,
        }
    }

    /// Previous genre in display order (wrapping)
    pub fn prev(self) -> Self {
        match self {
            Genre::Fiction => Genre::SciFi,
            Genre::NonFiction => Genre::Fiction,
            Genre::Fantasy => Genre::NonFiction,
            Genre::SciFi => Genre::Fantasy,
        }
    }
}

/// Circulation status of a book
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    Available,
    Issued,
}

impl Status {
    /// All statuses, in display order
    pub const ALL: [Status; 2] = [Status::Available, Status::Issued];

    /// The label used on the wire and in the UI
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Available => "Available",
            Status::Issued => "Issued",
        }
    }

    /// The other status
    pub fn next(self) -> Self {
        match self {
            Status::Available => Status::Issued,
            Status::Issued => Status::Available,
        }
    }
}

/// Error parsing a genre or status label
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} '{value}'. Expected one of: {expected}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    expected: String,
}

fn parse_label<T: Copy>(
    kind: &'static str,
    value: &str,
    all: &[T],
    label: fn(T) -> &'static str,
) -> Result<T, ParseEnumError> {
    let wanted = value.trim();
    all.iter()
        .copied()
        .find(|item| label(*item).eq_ignore_ascii_case(wanted))
        .ok_or_else(|| ParseEnumError {
            kind,
            value: value.to_string(),
            expected: all
                .iter()
                .map(|item| label(*item))
                .collect::<Vec<_>>()
                .join(", "),
        })
}

impl FromStr for Genre {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("genre", s, &Genre::ALL, Genre::as_str)
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("status", s, &Status::ALL, Status::as_str)
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The editable fields of a book (a record without its id)
///
/// This is the body sent when creating or replacing a book.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub genre: Genre,
    pub year: i32,
    pub status: Status,
}

/// A book stored in the remote collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    /// Identifier assigned by the remote store
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: BookFields,
}

impl Book {
    /// Attach a store-assigned id to a set of fields
    pub fn new(id: impl Into<String>, fields: BookFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn title(&self) -> &str {
        &self.fields.title
    }

    pub fn author(&self) -> &str {
        &self.fields.author
    }

    pub fn genre(&self) -> Genre {
        self.fields.genre
    }

    pub fn year(&self) -> i32 {
        self.fields.year
    }

    pub fn status(&self) -> Status {
        self.fields.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dune() -> BookFields {
        BookFields {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            genre: Genre::SciFi,
            year: 1965,
            status: Status::Available,
        }
    }

    #[test]
    fn test_genre_wire_labels() {
        assert_eq!(serde_json::to_value(Genre::NonFiction).unwrap(), json!("Non-fiction"));
        assert_eq!(serde_json::to_value(Genre::SciFi).unwrap(), json!("Sci-fi"));
        let parsed: Genre = serde_json::from_value(json!("Fantasy")).unwrap();
        assert_eq!(parsed, Genre::Fantasy);
    }

    #[test]
    fn test_genre_from_str_is_case_insensitive() {
        assert_eq!("sci-fi".parse::<Genre>().unwrap(), Genre::SciFi);
        assert_eq!("NON-FICTION".parse::<Genre>().unwrap(), Genre::NonFiction);
        assert_eq!(" Fiction ".parse::<Genre>().unwrap(), Genre::Fiction);
    }

    #[test]
    fn test_unknown_label_lists_expected_values() {
        let err = "Horror".parse::<Genre>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Horror"));
        assert!(msg.contains("Non-fiction"));

        assert!("Lost".parse::<Status>().is_err());
    }

    #[test]
    fn test_genre_cycling() {
        let mut genre = Genre::Fiction;
        for _ in 0..Genre::ALL.len() {
            genre = genre.next();
        }
        assert_eq!(genre, Genre::Fiction);
        assert_eq!(Genre::Fiction.prev(), Genre::SciFi);
        assert_eq!(Status::Available.next(), Status::Issued);
        assert_eq!(Status::Issued.next(), Status::Available);
    }

    #[test]
    fn test_fields_serialize_without_id() {
        let value = serde_json::to_value(dune()).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Dune",
                "author": "Herbert",
                "genre": "Sci-fi",
                "year": 1965,
                "status": "Available"
            })
        );
    }

    #[test]
    fn test_book_reads_store_document() {
        let doc = json!({
            "_id": "65a1f0",
            "title": "Dune",
            "author": "Herbert",
            "genre": "Sci-fi",
            "year": 1965,
            "status": "Available"
        });
        let book: Book = serde_json::from_value(doc).unwrap();
        assert_eq!(book.id, "65a1f0");
        assert_eq!(book.fields, dune());
        assert_eq!(book.year(), 1965);
    }

    #[test]
    fn test_book_rejects_string_year() {
        let doc = json!({
            "_id": "1",
            "title": "Dune",
            "author": "Herbert",
            "genre": "Sci-fi",
            "year": "1965",
            "status": "Available"
        });
        assert!(serde_json::from_value::<Book>(doc).is_err());
    }
}
