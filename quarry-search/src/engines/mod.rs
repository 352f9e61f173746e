//! Results page parsers for each supported search engine.
//!
//! Each module provides a struct implementing [`crate::engine::ResultParser`]
//! for one engine's HTML. [`EngineParser`] dispatches on [`SearchEngine`].

pub mod bing;
pub mod duckduckgo;
pub mod google;

pub use bing::BingParser;
pub use duckduckgo::DuckDuckGoParser;
pub use google::GoogleParser;

use scraper::{ElementRef, Html, Selector};

use crate::engine::ResultParser;
use crate::error::SearchError;
use crate::types::{SearchEngine, SearchResult};

/// One organic result as found on the page, before engine-specific cleanup.
pub(crate) struct RawHit<'a> {
    /// Title text with whitespace collapsed.
    pub title: String,
    pub href: &'a str,
    /// Snippet text with whitespace collapsed; empty when the result has none.
    pub snippet: String,
}

/// Compiled selectors describing where an engine puts its organic results.
///
/// `title`, `link` and `snippet` are matched inside each `container`.
pub(crate) struct Layout {
    container: Selector,
    title: Selector,
    link: Selector,
    snippet: Selector,
}

impl Layout {
    pub(crate) fn new(
        container: &str,
        title: &str,
        link: &str,
        snippet: &str,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            container: compile(container)?,
            title: compile(title)?,
            link: compile(link)?,
            snippet: compile(snippet)?,
        })
    }

    /// Run `build` on every container that has a non-empty title and a link.
    pub(crate) fn extract<F>(&self, html: &str, mut build: F) -> Vec<SearchResult>
    where
        F: FnMut(RawHit<'_>) -> Option<SearchResult>,
    {
        let document = Html::parse_document(html);
        document
            .select(&self.container)
            .filter_map(|container| {
                let title = container.select(&self.title).next().map(squashed_text)?;
                if title.is_empty() {
                    return None;
                }
                let href = container
                    .select(&self.link)
                    .next()
                    .and_then(|a| a.value().attr("href"))?;
                let snippet = container
                    .select(&self.snippet)
                    .next()
                    .map(squashed_text)
                    .unwrap_or_default();
                build(RawHit {
                    title,
                    href,
                    snippet,
                })
            })
            .collect()
    }
}

fn compile(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("invalid selector {css:?}: {e:?}")))
}

/// Element text with runs of whitespace collapsed to one space.
fn squashed_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parser for whichever engine a run is configured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineParser {
    engine: SearchEngine,
}

impl EngineParser {
    pub fn new(engine: SearchEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> SearchEngine {
        self.engine
    }
}

impl ResultParser for EngineParser {
    fn parse(&self, raw: &str) -> Result<Vec<SearchResult>, SearchError> {
        match self.engine {
            SearchEngine::Google => GoogleParser.parse(raw),
            SearchEngine::DuckDuckGo => DuckDuckGoParser.parse(raw),
            SearchEngine::Bing => BingParser.parse(raw),
        }
    }
}
