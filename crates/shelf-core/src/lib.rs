//! shelf Core Library
//!
//! This crate provides the core functionality for shelf, a book inventory
//! kept in a remote REST collection.
//!
//! # Architecture
//!
//! - **Remote collection**: source of truth for all books
//! - **Controller**: holds a full copy of the collection and reloads it
//!   after every mutation; search, filters and paging are client-side
//!
//! # Quick Start
//!
//! ```text
//! let store = HttpBookStore::from_config(&Config::load()?)?;
//! let mut inventory = InventoryController::new(store);
//! inventory.refresh().await?;
//!
//! inventory.set_search_term("dune");
//! for book in inventory.visible_page() {
//!     println!("{}", book.title());
//! }
//! ```
//!
//! # Modules
//!
//! - `controller`: list state, filters, paging, mutation sequencing (main entry point)
//! - `editor`: create/edit dialog state machine
//! - `validate`: form rules for a book draft
//! - `store`: collection clients (HTTP and in-memory)
//! - `models`: book record, genre and status
//! - `config`: application configuration

pub mod config;
pub mod controller;
pub mod editor;
pub mod models;
pub mod store;
pub mod validate;

pub use config::Config;
pub use controller::{Filters, InventoryController, SubmitOutcome, PAGE_SIZE};
pub use editor::{DraftOverrides, EditorState, RecordEditor, SaveTarget, Submission};
pub use models::{Book, BookFields, Genre, ParseEnumError, Status};
pub use store::{BookStore, HttpBookStore, MemoryBookStore, StoreError, StoreResult};
pub use validate::{Draft, Field, FieldError, ValidationErrors};
