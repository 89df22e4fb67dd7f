//! Typed errors for the rentscout pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`); the CLI wraps these
//! with context at the process edge. A model refusal is deliberately *not*
//! represented here — see [`RatingOutcome`](crate::types::rating::RatingOutcome).

use thiserror::Error;

/// Errors that can surface from a pipeline run.
///
/// Routing and rating failures never appear here: per-listing, they degrade
/// to exclusion at their call sites. What aborts a run is a failed top-level
/// search fetch or an unusable checkpoint artifact.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// Fetching or decoding the search response failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Cache or output artifact could not be read or written
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors fetching or decoding a search or listing page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed or returned a non-success status
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The embedded payload was absent or malformed
    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    /// A search URL could not be constructed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Errors extracting the embedded JSON payload from a document.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The anchor's open/close boundaries were not found in the raw text
    #[error("payload anchor not found in document")]
    AnchorMissing,

    /// The anchored text is not valid JSON
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload parsed but an expected key was absent
    #[error("payload missing key: {path}")]
    Shape { path: String },
}

/// Errors resolving a travel time.
#[derive(Debug, Error)]
pub enum RouteError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Response body is not valid JSON
    #[error("routing response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The service returned no `features`, i.e. the route is unresolvable
    #[error("no route between the given points")]
    NoRoute,
}

/// Errors from the rating capability.
#[derive(Debug, Error)]
pub enum RatingError {
    /// Network error (connection failed, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// API error (non-2xx response, rate limit, invalid request)
    #[error("API error: {0}")]
    Api(String),

    /// Parse error (invalid JSON, response not matching the schema)
    #[error("parse error: {0}")]
    Parse(String),
}

/// Errors reading or writing the flat-file artifacts.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors (missing or malformed environment).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for page-fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for routing operations.
pub type RouteResult<T> = std::result::Result<T, RouteError>;
