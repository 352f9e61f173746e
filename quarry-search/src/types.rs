//! Core types for search results, engine identification, and run output.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// A search query. Opaque to the engine; immutable once enqueued.
pub type Query = String;

/// A single search result scraped from a results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the search result page.
    pub title: String,
    /// The URL of the search result. Two results are duplicates iff their
    /// URLs are equal.
    pub url: String,
    /// A text snippet summarising the page content.
    pub snippet: String,
    /// Host component of `url`, used for blacklist filtering.
    pub domain: String,
}

impl SearchResult {
    /// Build a result, deriving `domain` from `url`.
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        let url = url.into();
        let domain = domain_of(&url);
        Self {
            title: title.into(),
            url,
            snippet: snippet.into(),
            domain,
        }
    }
}

/// Extract the domain of a URL: its host, plus `:port` when a
/// non-default port is given explicitly.
///
/// Returns an empty string for URLs that cannot be parsed or have no host.
///
/// # Examples
///
/// ```
/// use quarry_search::types::domain_of;
///
/// assert_eq!(domain_of("https://Docs.Rust-Lang.org/book/"), "docs.rust-lang.org");
/// assert_eq!(domain_of("http://localhost:8080/x"), "localhost:8080");
/// assert_eq!(domain_of("not a url"), "");
/// ```
pub fn domain_of(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return String::new();
    };
    match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

/// Supported search engines whose result pages Quarry can scrape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    /// Google web search. Aggressive bot detection.
    #[default]
    Google,
    /// DuckDuckGo HTML endpoint.
    DuckDuckGo,
    /// Bing web search.
    Bing,
}

impl SearchEngine {
    /// Returns the human-readable name of this engine.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Bing => "Bing",
        }
    }

    /// Returns the default results-page URL template. `{query}` is replaced
    /// by the percent-encoded query.
    pub fn url_template(&self) -> &'static str {
        match self {
            Self::Google => "https://www.google.com/search?q={query}&num=100",
            Self::DuckDuckGo => "https://html.duckduckgo.com/html/?q={query}",
            Self::Bing => "https://www.bing.com/search?q={query}&setlang=en",
        }
    }

    /// Returns all available engine variants.
    pub fn all() -> &'static [SearchEngine] {
        &[Self::Google, Self::DuckDuckGo, Self::Bing]
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "duckduckgo" | "ddg" => Ok(Self::DuckDuckGo),
            "bing" => Ok(Self::Bing),
            other => {
                let known: Vec<String> = Self::all()
                    .iter()
                    .map(|e| e.name().to_ascii_lowercase())
                    .collect();
                Err(format!(
                    "unknown search engine: {other} (expected one of: {})",
                    known.join(", ")
                ))
            }
        }
    }
}

/// Final output of a run: an ordered mapping from query to its results.
///
/// Iteration and serialization follow insertion order, which is the order
/// of the input queries. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    entries: Vec<(Query, Vec<SearchResult>)>,
}

impl SearchResults {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the results for `query`, keeping the original
    /// position of an existing key.
    pub fn insert(&mut self, query: Query, results: Vec<SearchResult>) {
        match self.entries.iter_mut().find(|(q, _)| *q == query) {
            Some((_, existing)) => *existing = results,
            None => self.entries.push((query, results)),
        }
    }

    /// Results recorded for `query`, if the key exists.
    pub fn get(&self, query: &str) -> Option<&[SearchResult]> {
        self.entries
            .iter()
            .find(|(q, _)| q == query)
            .map(|(_, results)| results.as_slice())
    }

    /// Number of queries in the mapping.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no queries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(query, results)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SearchResult])> {
        self.entries
            .iter()
            .map(|(q, results)| (q.as_str(), results.as_slice()))
    }

    /// Queries in input order.
    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(q, _)| q.as_str())
    }

    /// Total number of results across all queries.
    pub fn total_results(&self) -> usize {
        self.entries.iter().map(|(_, results)| results.len()).sum()
    }
}

impl IntoIterator for SearchResults {
    type Item = (Query, Vec<SearchResult>);
    type IntoIter = std::vec::IntoIter<(Query, Vec<SearchResult>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for SearchResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (query, results) in &self.entries {
            map.serialize_entry(query, results)?;
        }
        map.end()
    }
}
