//! Error types for the quarry-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. Per-query failures never escape an agent;
//! only setup errors surface from [`crate::AgentPool::run`].

/// Errors that can occur while fetching, parsing, or orchestrating a run.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request to the search endpoint failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The search endpoint answered with a non-success status code.
    #[error("unexpected HTTP status: {0}")]
    Status(u16),

    /// A single fetch attempt exceeded the per-request timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Failed to parse search engine response HTML.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid scrape configuration.
    #[error("config error: {0}")]
    Config(String),

    /// An item was enqueued after the task queue was closed.
    #[error("task queue is closed")]
    QueueClosed,

    /// An agent task terminated abnormally.
    #[error("agent error: {0}")]
    Agent(String),
}

/// Convenience type alias for quarry-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
