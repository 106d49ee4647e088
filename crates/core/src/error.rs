#![allow(missing_docs)]

//! Error types shared across the core crate.

use thiserror::Error;

/// Failures raised while talking to the upstream catalog.
///
/// These never escape [`crate::catalog::CatalogService`]; the facade turns
/// them into fallback data plus an advisory message.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The catalog answered with a non-success status code.
    #[error("catalog returned {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },
    /// The response body did not have the expected shape.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// A live transport was requested without an API key.
    #[error("no API key configured for the live catalog")]
    MissingApiKey,
    /// Building the HTTP client failed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Failures raised by local edits to the in-memory library.
#[derive(Debug, Error, PartialEq)]
pub enum LibraryError {
    #[error("title is required")]
    MissingTitle,
    #[error("rating {0} is outside 0-10")]
    RatingOutOfRange(f64),
    #[error("personal rating {0} is outside 0-10")]
    PersonalRatingOutOfRange(u8),
    #[error("release date '{0}' is not YYYY-MM-DD")]
    InvalidReleaseDate(String),
    #[error("no game with id {0}")]
    UnknownGame(u64),
}
