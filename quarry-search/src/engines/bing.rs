//! Bing results page parser.

use super::Layout;
use crate::engine::ResultParser;
use crate::error::SearchError;
use crate::types::SearchResult;

/// Bing HTML results parser.
///
/// Organic results are `li.b_algo` items with the link inside the `h2`.
/// Relative links (Bing's own verticals) are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct BingParser;

impl ResultParser for BingParser {
    fn parse(&self, raw: &str) -> Result<Vec<SearchResult>, SearchError> {
        let layout = Layout::new("li.b_algo", "h2", "h2 a", ".b_caption p, .b_lineclamp2")?;
        let results = layout.extract(raw, |hit| {
            let absolute = hit.href.starts_with("https://") || hit.href.starts_with("http://");
            absolute.then(|| SearchResult::new(hit.title, hit.href, hit.snippet))
        });
        tracing::debug!(count = results.len(), "Bing results parsed");
        Ok(results)
    }
}
