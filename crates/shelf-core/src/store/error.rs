//! Remote store error handling
//!
//! Provides typed errors for collection requests with descriptive messages
//! and recovery suggestions.

use thiserror::Error;

/// Errors that can occur while talking to the book collection
#[derive(Error, Debug)]
pub enum StoreError {
    /// Request never completed (DNS, connect, TLS, timeout, reset)
    #[error("Request to '{url}' failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with an unexpected non-success status
    #[error("{method} '{url}' returned HTTP {status}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
    },

    /// The book no longer exists remotely
    #[error("Book '{id}' not found")]
    NotFound { id: String },

    /// Server refused the submitted book
    #[error("Server rejected the book (HTTP {status}): {details}")]
    Rejected { status: u16, details: String },

    /// Configured base URL is not usable as a collection root
    #[error("Invalid base URL '{url}': {details}")]
    InvalidUrl { url: String, details: String },

    /// Response body could not be understood
    #[error("Invalid response from '{url}': {details}")]
    InvalidResponse { url: String, details: String },
}

impl StoreError {
    /// Transport failures and unexpected statuses
    pub fn is_network(&self) -> bool {
        matches!(self, StoreError::Network { .. } | StoreError::Status { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::Network { .. } => {
                Some("Check your connection and the configured base_url, then reload.")
            }
            StoreError::Status { status, .. } if *status >= 500 => {
                Some("The collection service is having trouble. Try again later.")
            }
            StoreError::NotFound { .. } => {
                Some("The book was removed elsewhere. Reload to see the current list.")
            }
            StoreError::Rejected { .. } => Some("Check the book fields and submit again."),
            StoreError::InvalidUrl { .. } => {
                Some("Set base_url to an http(s) URL, e.g. with 'shelf config set base_url'.")
            }
            _ => None,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
