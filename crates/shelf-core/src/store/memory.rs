//! In-memory collection
//!
//! Same contract as the HTTP store without a server: ids are assigned on
//! create, unknown ids yield `NotFound`, updates replace every field.
//! Insertion order is kept, like the remote listing.

use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::error::{StoreError, StoreResult};
use super::BookStore;
use crate::models::{Book, BookFields};

/// In-process book collection
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    books: Mutex<Vec<Book>>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing books (ids kept as given)
    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: Mutex::new(books),
        }
    }

    /// Number of stored books
    pub async fn len(&self) -> usize {
        self.books.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.lock().await.is_empty()
    }
}

impl BookStore for MemoryBookStore {
    async fn list(&self) -> StoreResult<Vec<Book>> {
        Ok(self.books.lock().await.clone())
    }

    async fn create(&self, fields: &BookFields) -> StoreResult<Book> {
        let book = Book::new(Uuid::new_v4().simple().to_string(), fields.clone());
        debug!("Created book {} in memory", book.id);
        self.books.lock().await.push(book.clone());
        Ok(book)
    }

    async fn update(&self, id: &str, fields: &BookFields) -> StoreResult<()> {
        let mut books = self.books.lock().await;
        let book = books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        book.fields = fields.clone();
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut books = self.books.lock().await;
        let pos = books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        books.remove(pos);
        Ok(())
    }
}
