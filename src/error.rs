//! Error types for the collector.
//!
//! Each concern gets its own enum so callers can pick a policy per failure
//! class: fetch failures stop pagination, timestamp failures drop a single
//! record, criteria failures reject the run before any request is made.

use thiserror::Error;

/// Failure of a single search request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("search API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not the expected JSON document.
    #[error("failed to decode search response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL could not be turned into an endpoint.
    #[error("invalid search endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// A publication timestamp that does not match the API's fixed format.
#[derive(Debug, Error)]
#[error("unparseable publication timestamp '{raw}': {source}")]
pub struct ParseError {
    pub raw: String,
    #[source]
    pub source: chrono::ParseError,
}

/// Rejected search criteria.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("start date {start} is after end date {end}")]
    InvertedWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("page size {0} is outside 1..={max}", max = crate::models::MAX_PAGE_SIZE)]
    PageSize(usize),

    #[error("search query is empty")]
    EmptyQuery,
}

/// Failure while writing the tabular export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV buffer: {0}")]
    Buffer(String),
}
