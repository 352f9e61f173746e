//! Application configuration: what to scrape, where to write it, and how.
//!
//! [`QuarryConfig`] is loaded from TOML. Every field has a default, so a
//! config file only needs the values it changes. Command-line flags are
//! applied on top through [`ConfigOverrides`].

use std::path::{Path, PathBuf};

use quarry_search::{ScrapeConfig, SearchEngine};
use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, Result};

/// Queries scraped when neither the command line nor the config names any.
pub const DEFAULT_QUERIES: &[&str] = &[
    "artificial intelligence",
    "machine learning",
    "natural language processing",
    "computer vision",
    "robotics",
];

/// Output file written when none is configured.
pub const DEFAULT_OUTPUT: &str = "search_results.json";

/// Top-level configuration for a quarry run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarryConfig {
    /// Queries to scrape, in output order.
    pub queries: Vec<String>,
    /// Path of the JSON results file.
    pub output: PathBuf,
    /// Agent pool, retry, and post-processing settings.
    pub scrape: ScrapeConfig,
}

impl Default for QuarryConfig {
    fn default() -> Self {
        Self {
            queries: DEFAULT_QUERIES.iter().map(|q| (*q).to_owned()).collect(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            scrape: ScrapeConfig::default(),
        }
    }
}

impl QuarryConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| QuarryError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| QuarryError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/quarry/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("quarry").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("quarry")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/quarry-config/config.toml")
        }
    }

    /// Load `path` if given, otherwise the default config file if one
    /// exists, otherwise the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be loaded. An
    /// explicitly given path that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Self::default_config_path();
                if default.is_file() {
                    tracing::debug!(path = %default.display(), "loading default config file");
                    Self::from_file(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Check the scrape settings and that there is something to scrape.
    ///
    /// # Errors
    ///
    /// Returns [`QuarryError::Search`] for invalid scrape settings and
    /// [`QuarryError::Config`] for an empty output path.
    pub fn validate(&self) -> Result<()> {
        self.scrape.validate()?;
        if self.output.as_os_str().is_empty() {
            return Err(QuarryError::Config("output path must not be empty".into()));
        }
        Ok(())
    }
}

/// Values given on the command line. `None` (or an empty list) leaves the
/// configured value untouched.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub queries: Vec<String>,
    pub num_agents: Option<usize>,
    pub max_results: Option<usize>,
    pub output: Option<PathBuf>,
    pub engine: Option<SearchEngine>,
    pub blacklist: Vec<String>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut QuarryConfig) {
        if !self.queries.is_empty() {
            config.queries = self.queries;
        }
        if let Some(n) = self.num_agents {
            config.scrape.num_agents = n;
        }
        if let Some(m) = self.max_results {
            config.scrape.max_results_per_query = m;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(engine) = self.engine {
            config.scrape.engine = engine;
        }
        if !self.blacklist.is_empty() {
            config.scrape.blacklist = self.blacklist;
        }
    }
}
