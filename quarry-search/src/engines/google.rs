//! Google results page parser.
//!
//! Google has the highest quality results but employs aggressive
//! bot detection, so the fetcher may see consent or CAPTCHA pages that
//! parse to zero results rather than an error.

use url::Url;

use super::Layout;
use crate::engine::ResultParser;
use crate::error::SearchError;
use crate::types::SearchResult;

/// Google HTML results parser.
///
/// Organic results live in `div.g` containers with the title in an `h3`,
/// the link in `div.yuRUbf > a`, and the snippet in `div.VwiC3b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoogleParser;

impl GoogleParser {
    /// Unwrap Google's `/url?q=<target>` redirect links.
    ///
    /// Direct links pass through unchanged.
    fn extract_url(href: &str) -> Option<String> {
        if href.is_empty() {
            return None;
        }
        if !href.starts_with("/url?") {
            return Some(href.to_string());
        }
        let parsed = Url::parse(&format!("https://www.google.com{href}")).ok()?;
        parsed
            .query_pairs()
            .find(|(key, _)| key == "q" || key == "url")
            .map(|(_, value)| value.into_owned())
    }
}

impl ResultParser for GoogleParser {
    fn parse(&self, raw: &str) -> Result<Vec<SearchResult>, SearchError> {
        parse_google_html(raw)
    }
}

/// Collapse runs of whitespace and strip punctuation from scraped text.
///
/// Keeps letters, digits, underscores and single spaces.
pub fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}

/// Parse a Google HTML results page into search results.
pub(crate) fn parse_google_html(html: &str) -> Result<Vec<SearchResult>, SearchError> {
    let layout = Layout::new("div.g", "h3", "div.yuRUbf > a", "div.VwiC3b")?;
    let results = layout.extract(html, |hit| {
        let url = GoogleParser::extract_url(hit.href)?;
        Some(SearchResult::new(
            clean_text(&hit.title),
            url,
            clean_text(&hit.snippet),
        ))
    });
    tracing::debug!(count = results.len(), "Google results parsed");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_GOOGLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div id="search">
  <div class="g">
    <div class="yuRUbf"><a href="https://www.rust-lang.org/"><h3>Rust Programming   Language</h3></a></div>
    <div class="VwiC3b">A language empowering everyone to build reliable, efficient software.</div>
  </div>
  <div class="g">
    <div class="yuRUbf"><a href="/url?q=https://doc.rust-lang.org/book/&amp;sa=U"><h3>The Book!</h3></a></div>
  </div>
  <div class="g">
    <h3>Result without link</h3>
  </div>
  <div class="g">
    <div class="yuRUbf"><a href="https://en.wikipedia.org/wiki/Rust_(programming_language)"><h3>Rust - Wikipedia</h3></a></div>
    <div class="VwiC3b">Rust is a multi-paradigm,
        general-purpose programming language.</div>
  </div>
</div>
</body>
</html>"#;

    #[test]
    fn parse_mock_html_returns_results() {
        let results = parse_google_html(MOCK_GOOGLE_HTML).expect("should parse");
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(results[0].domain, "www.rust-lang.org");
        assert_eq!(
            results[0].snippet,
            "A language empowering everyone to build reliable efficient software"
        );

        assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
        assert_eq!(results[1].title, "The Book");
        assert!(results[1].snippet.is_empty());

        assert_eq!(results[2].domain, "en.wikipedia.org");
        assert_eq!(
            results[2].snippet,
            "Rust is a multiparadigm generalpurpose programming language"
        );
    }

    #[test]
    fn parse_empty_html_returns_empty() {
        let results = GoogleParser.parse("<html><body></body></html>").expect("should parse");
        assert!(results.is_empty());
    }

    #[test]
    fn clean_text_collapses_and_strips() {
        assert_eq!(clean_text("  Hello,\n\n  world!  "), "Hello world");
        assert_eq!(clean_text("snake_case stays"), "snake_case stays");
        assert_eq!(clean_text("Zürich café"), "Zürich café");
    }

    #[test]
    fn extract_url_direct_and_redirect() {
        assert_eq!(
            GoogleParser::extract_url("https://example.org/a"),
            Some("https://example.org/a".to_string())
        );
        assert_eq!(
            GoogleParser::extract_url("/url?q=https%3A%2F%2Fexample.org%2Fb&sa=U"),
            Some("https://example.org/b".to_string())
        );
        assert_eq!(GoogleParser::extract_url(""), None);
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GoogleParser>();
    }
}
