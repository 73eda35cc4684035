//! Remote book collection
//!
//! [`BookStore`] is the four-operation interface to the collection
//! endpoint. Every call is a single attempt: no retries, no backoff.
//!
//! - [`HttpBookStore`]: the REST collection (`{base_url}/books`)
//! - [`MemoryBookStore`]: in-process collection for tests and demos
//!
//! `update` is a full replacement. The complete set of fields is always
//! sent; nothing is merged with the stored document.

mod error;
mod http;
mod memory;

pub use error::{StoreError, StoreResult};
pub use http::HttpBookStore;
pub use memory::MemoryBookStore;

use crate::models::{Book, BookFields};

/// Name of the collection under the base URL
pub const COLLECTION: &str = "books";

/// CRUD access to the remote book collection
#[allow(async_fn_in_trait)]
pub trait BookStore {
    /// Fetch every book, in the order the store returns them
    async fn list(&self) -> StoreResult<Vec<Book>>;

    /// Store a new book and return it with its assigned id
    async fn create(&self, fields: &BookFields) -> StoreResult<Book>;

    /// Replace the stored book `id` with `fields`
    async fn update(&self, id: &str, fields: &BookFields) -> StoreResult<()>;

    /// Remove the stored book `id`
    async fn delete(&self, id: &str) -> StoreResult<()>;
}
