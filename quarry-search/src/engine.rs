//! Trait definitions for the two collaborators an agent drives.
//!
//! A [`Fetcher`] performs one network round trip for a query and returns
//! the raw results page. A [`ResultParser`] turns that page into structured
//! [`SearchResult`] values. Agents only see these traits, so tests and
//! alternative transports plug in without touching the pool.

use crate::error::SearchError;
use crate::types::SearchResult;

/// Retrieves the raw results page for a query.
///
/// One call is one attempt: implementations must not retry internally,
/// since retry and backoff are owned by [`crate::agent::RetryingAgent`].
///
/// All implementations must be `Send + Sync` so a single instance can be
/// shared by every agent in the pool.
pub trait Fetcher: Send + Sync {
    /// Fetch the raw content for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] on transport failure, non-success status, or
    /// timeout. Every error is treated as a retryable failed attempt.
    fn fetch(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<String, SearchError>> + Send;
}

/// Extracts structured results from a raw results page.
pub trait ResultParser: Send + Sync {
    /// Parse `raw` into results in page order.
    ///
    /// A page with no recognisable results parses to an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Parse`] when the content cannot be processed
    /// at all. The agent counts this as a failed attempt.
    fn parse(&self, raw: &str) -> Result<Vec<SearchResult>, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A mock fetcher for testing trait bounds and async execution.
    struct MockFetcher {
        body: Option<String>,
    }

    impl Fetcher for MockFetcher {
        async fn fetch(&self, _query: &str) -> Result<String, SearchError> {
            self.body
                .clone()
                .ok_or_else(|| SearchError::Http("mock fetch failure".into()))
        }
    }

    /// Parses one result per non-empty line, formatted `title|url`.
    struct LineParser;

    impl ResultParser for LineParser {
        fn parse(&self, raw: &str) -> Result<Vec<SearchResult>, SearchError> {
            raw.lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| {
                    let (title, url) = line
                        .split_once('|')
                        .ok_or_else(|| SearchError::Parse(format!("bad line: {line}")))?;
                    Ok(SearchResult::new(title, url, ""))
                })
                .collect()
        }
    }

    #[test]
    fn mocks_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockFetcher>();
        assert_send_sync::<LineParser>();
    }

    #[tokio::test]
    async fn fetch_then_parse() {
        let fetcher = MockFetcher {
            body: Some("Rust|https://www.rust-lang.org/\nDocs|https://doc.rust-lang.org/".into()),
        };
        let raw = fetcher.fetch("rust").await.expect("fetch should succeed");
        let results = LineParser.parse(&raw).expect("parse should succeed");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].domain, "www.rust-lang.org");
        assert_eq!(results[1].title, "Docs");
    }

    #[tokio::test]
    async fn fetch_propagates_errors() {
        let fetcher = MockFetcher { body: None };
        let err = fetcher.fetch("rust").await.unwrap_err();
        assert!(err.to_string().contains("mock fetch failure"));
    }

    #[test]
    fn parse_propagates_errors() {
        let err = LineParser.parse("no separator here").unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }
}
