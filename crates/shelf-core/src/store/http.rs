//! HTTP collection client
//!
//! Talks to a crudcrud-style REST collection:
//!
//! - `GET    {base}/books`      -> JSON array of documents with `_id`
//! - `POST   {base}/books`      -> stored document echoed back with `_id`
//! - `PUT    {base}/books/{id}` -> success status, body ignored
//! - `DELETE {base}/books/{id}` -> success status

use std::time::Duration;

use reqwest::{Client, Response, Url};
use tracing::{debug, warn};

use super::error::{StoreError, StoreResult};
use super::{BookStore, COLLECTION};
use crate::config::Config;
use crate::models::{Book, BookFields};

/// REST client for the book collection
#[derive(Debug, Clone)]
pub struct HttpBookStore {
    client: Client,
    collection_url: Url,
}

impl HttpBookStore {
    /// Create a client for the collection under `base_url`
    ///
    /// No request timeout is set; the transport default applies.
    pub fn new(base_url: &str) -> StoreResult<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Create a client with an optional per-request timeout
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> StoreResult<Self> {
        let collection_url = parse_collection_url(base_url)?;

        let mut builder = Client::builder().user_agent(concat!("shelf/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| StoreError::Network {
            url: collection_url.to_string(),
            source,
        })?;

        Ok(Self {
            client,
            collection_url,
        })
    }

    /// Create a client from the loaded configuration
    pub fn from_config(config: &Config) -> StoreResult<Self> {
        Self::with_timeout(
            &config.base_url,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    /// The collection endpoint URL
    pub fn collection_url(&self) -> &str {
        self.collection_url.as_str()
    }

    /// URL of one document, with the id escaped as a single path segment
    ///
    /// Empty and dot ids can never name a document.
    fn item_url(&self, id: &str) -> StoreResult<String> {
        if matches!(id, "" | "." | "..") {
            return Err(StoreError::NotFound { id: id.to_string() });
        }

        let mut url = self.collection_url.clone();
        url.path_segments_mut()
            .map_err(|()| invalid_url(self.collection_url.as_str(), "cannot be a base"))?
            .push(id);
        Ok(url.into())
    }
}

/// Parse the base URL and append the collection segment
fn parse_collection_url(base_url: &str) -> StoreResult<Url> {
    let mut url = Url::parse(base_url).map_err(|e| invalid_url(base_url, e))?;
    url.path_segments_mut()
        .map_err(|()| invalid_url(base_url, "cannot be a base"))?
        .pop_if_empty()
        .push(COLLECTION);
    Ok(url)
}

impl BookStore for HttpBookStore {
    async fn list(&self) -> StoreResult<Vec<Book>> {
        let url = self.collection_url.to_string();
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| network(&url, source))?;
        let response = check_status(response, "GET", &url, None).await?;

        let documents: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| invalid_response(&url, e))?;

        let books = decode_books(documents);
        debug!("Loaded {} books", books.len());
        Ok(books)
    }

    async fn create(&self, fields: &BookFields) -> StoreResult<Book> {
        let url = self.collection_url.to_string();
        debug!("POST {} title={:?}", url, fields.title);

        let response = self
            .client
            .post(&url)
            .json(fields)
            .send()
            .await
            .map_err(|source| network(&url, source))?;
        let response = check_status(response, "POST", &url, None).await?;

        let book: Book = response
            .json()
            .await
            .map_err(|e| invalid_response(&url, e))?;
        debug!("Created book {}", book.id);
        Ok(book)
    }

    async fn update(&self, id: &str, fields: &BookFields) -> StoreResult<()> {
        let url = self.item_url(id)?;
        debug!("PUT {}", url);

        let response = self
            .client
            .put(&url)
            .json(fields)
            .send()
            .await
            .map_err(|source| network(&url, source))?;
        check_status(response, "PUT", &url, Some(id)).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let url = self.item_url(id)?;
        debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|source| network(&url, source))?;
        check_status(response, "DELETE", &url, Some(id)).await?;
        Ok(())
    }
}

/// Map a non-success response to a typed error
///
/// `id` is set for item requests, where 404 means the book is gone.
async fn check_status(
    response: Response,
    method: &'static str,
    url: &str,
    id: Option<&str>,
) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match (status.as_u16(), id) {
        (404, Some(id)) => Err(StoreError::NotFound { id: id.to_string() }),
        (code @ (400 | 422), _) => {
            let details = response.text().await.unwrap_or_default();
            Err(StoreError::Rejected {
                status: code,
                details,
            })
        }
        (code, _) => Err(StoreError::Status {
            method,
            url: url.to_string(),
            status: code,
        }),
    }
}

/// Decode collection documents, skipping any that are not valid books
///
/// The collection accepts arbitrary JSON, so one foreign document must not
/// hide the rest of the inventory.
fn decode_books(documents: Vec<serde_json::Value>) -> Vec<Book> {
    documents
        .into_iter()
        .filter_map(|doc| match serde_json::from_value::<Book>(doc.clone()) {
            Ok(book) => Some(book),
            Err(e) => {
                let id = doc.get("_id").and_then(|v| v.as_str()).unwrap_or("?");
                warn!("Skipping undecodable record {}: {}", id, e);
                None
            }
        })
        .collect()
}

fn network(url: &str, source: reqwest::Error) -> StoreError {
    StoreError::Network {
        url: url.to_string(),
        source,
    }
}

fn invalid_url(url: &str, details: impl std::fmt::Display) -> StoreError {
    StoreError::InvalidUrl {
        url: url.to_string(),
        details: details.to_string(),
    }
}

fn invalid_response(url: &str, error: reqwest::Error) -> StoreError {
    StoreError::InvalidResponse {
        url: url.to_string(),
        details: error.to_string(),
    }
}
