//! Error types for the export pipeline.

use crate::state::Status;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection, TLS, timeout or body-read failure
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A retry-wrapped call kept failing past the retry bound
    #[error("giving up on {url} after {attempts} attempts: {cause}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        cause: String,
    },

    /// The first listing page did not come back with 200, so the scope is unknown
    #[error("could not fetch the first listing page: HTTP {status}")]
    ListingUnavailable { status: u16 },

    /// The first listing page body could not be parsed
    #[error("invalid listing response: {0}")]
    InvalidListing(#[source] serde_json::Error),

    #[error("invalid status transition for {identifier}: {from} -> {to}")]
    InvalidTransition {
        identifier: String,
        from: Status,
        to: Status,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Errors that abort the whole run instead of a single item.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::RetriesExhausted { .. }
                | Error::ListingUnavailable { .. }
                | Error::InvalidListing(_)
                | Error::InvalidTransition { .. }
        )
    }

    /// Errors the retry policy absorbs with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(Box::new(e))
    }
}
