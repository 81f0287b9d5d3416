use crate::error::Result;
use crate::fetch::http::backoff_for;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Which fetch capability to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchBackend {
    /// Plain HTTP client
    #[default]
    Http,
    /// A browser driven over WebDriver
    #[serde(rename = "webdriver")]
    WebDriver,
}

/// Which field-extraction strategy to use on leaf pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorKind {
    /// Anchor text found on line N, value read a fixed number of lines away
    #[default]
    LineOffset,
    /// CSS selectors against the parsed document
    Selector,
}

/// Configuration for a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// First index page of the paginated listing
    pub start_url: String,

    /// Maximum number of leaf records processed at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Skip TLS certificate verification (HTTP backend only)
    #[serde(default)]
    pub insecure_tls: bool,

    /// Fetch backend
    #[serde(default)]
    pub backend: FetchBackend,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Timeout for a single fetch
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Retries for transient transport errors
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries, doubled each attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Deadline for one leaf record (primary page + trip reports)
    #[serde(default = "default_record_timeout_secs")]
    pub record_timeout_secs: u64,

    /// Field-extraction strategy
    #[serde(default)]
    pub extractor: ExtractorKind,

    /// Regex patterns for links to ignore on index pages
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_max_concurrency() -> usize {
    4
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_record_timeout_secs() -> u64 {
    180
}

impl HarvestConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            max_concurrency: default_max_concurrency(),
            insecure_tls: false,
            backend: FetchBackend::default(),
            webdriver_url: default_webdriver_url(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            record_timeout_secs: default_record_timeout_secs(),
            extractor: ExtractorKind::default(),
            exclude_patterns: Vec::new(),
        }
    }

    /// Longest a single HTTP fetch can take with every retry used
    pub fn worst_case_fetch(&self) -> Duration {
        let attempts = self.max_retries.saturating_add(1);
        let fetching = Duration::from_secs(self.fetch_timeout_secs).saturating_mul(attempts);
        let base = Duration::from_millis(self.retry_backoff_ms);
        let backing_off = (0..self.max_retries)
            .map(|attempt| backoff_for(base, attempt))
            .fold(Duration::ZERO, Duration::saturating_add);
        fetching.saturating_add(backing_off)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }
}
