//! Error types for the quarry application.

use quarry_search::SearchError;

/// Top-level error type for loading configuration, running a scrape, and
/// persisting its output.
#[derive(Debug, thiserror::Error)]
pub enum QuarryError {
    /// Configuration file could not be parsed or is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Scraping engine setup error.
    #[error("search error: {0}")]
    Search(#[from] SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, QuarryError>;
