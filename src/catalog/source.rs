use std::fmt;

use async_trait::async_trait;

use super::types::{Entry, PageRef};

/// Errors that can occur while talking to a catalog source.
/// Variants carry enough info to determine retryability (future use).
#[derive(Debug)]
pub enum SourceError {
    /// Network-level failure (timeout, DNS, connection refused). Retryable.
    Network(String),
    /// API returned an error response. Retryable if status >= 500 or 429.
    Api { status: u16, message: String },
    /// Failed to parse the source's response. Not retryable.
    Parse(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Network(msg) => write!(f, "network error: {msg}"),
            SourceError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            SourceError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// A catalog provider: somewhere series can be searched, and their
/// chapters and pages listed.
#[async_trait]
pub trait Source: Send + Sync {
    /// Returns the name of the source, as used in config and entries.
    fn name(&self) -> &str;

    /// Search the catalog for series matching the query.
    async fn search(&self, query: &str) -> Result<Vec<Entry>, SourceError>;

    /// List the chapters of a series previously returned by `search`.
    async fn chapters(&self, series: &Entry) -> Result<Vec<Entry>, SourceError>;

    /// Resolve the downloadable pages of a chapter previously returned by
    /// `chapters`.
    async fn pages(&self, chapter: &Entry) -> Result<Vec<PageRef>, SourceError>;
}
