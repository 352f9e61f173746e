//! DuckDuckGo results page parser (HTML endpoint).
//!
//! `html.duckduckgo.com` serves a static page with no JavaScript, which makes
//! it the most reliable engine to scrape. Result links go through a
//! `/l/?uddg=<target>` redirect that is unwrapped here.

use url::Url;

use super::Layout;
use crate::engine::ResultParser;
use crate::error::SearchError;
use crate::types::SearchResult;

const RESULT_CONTAINER: &str =
    ".result.results_links:not(.result--ad), .web-result:not(.result--ad)";

/// DuckDuckGo HTML results parser. Sponsored results are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDuckGoParser;

/// Resolve a result href to the target URL.
///
/// Protocol-relative hrefs get `https:`; redirect links yield their `uddg`
/// parameter; anything that is not an absolute http(s) URL yields `None`.
fn target_url(href: &str) -> Option<String> {
    let absolute = match href.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => href.to_owned(),
    };
    let parsed = Url::parse(&absolute).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let is_redirect = parsed
        .host_str()
        .is_some_and(|host| host.ends_with("duckduckgo.com"))
        && parsed.path().starts_with("/l/");
    if !is_redirect {
        return Some(absolute);
    }
    parsed
        .query_pairs()
        .find_map(|(key, value)| (key == "uddg").then(|| value.into_owned()))
}

impl ResultParser for DuckDuckGoParser {
    fn parse(&self, raw: &str) -> Result<Vec<SearchResult>, SearchError> {
        let layout = Layout::new(RESULT_CONTAINER, ".result__a", ".result__a", ".result__snippet")?;
        let results = layout.extract(raw, |hit| {
            let url = target_url(hit.href)?;
            Some(SearchResult::new(hit.title, url, hit.snippet))
        });
        tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
        Ok(results)
    }
}
