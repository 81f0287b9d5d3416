pub mod http;
pub mod memory;
pub mod webdriver;

pub use http::HttpFetcher;
pub use memory::MemoryFetcher;
pub use webdriver::WebDriverFetcher;

use crate::config::{FetchBackend, HarvestConfig};
use crate::error::Result;
use std::sync::Arc;

/// Suffix that turns a hike page URL into its trip-report listing
pub const TRIP_REPORT_SUFFIX: &str = "/@@related_tripreport_listing";

/// Fetch capability: URL in, HTML source out.
///
/// Implementations own retries and timeouts; callers see either the page
/// or a `HarvestError::Transport`.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;

    /// Releases whatever the fetcher holds open
    async fn shutdown(&self) {}
}

/// Trip-report sub-resource for a leaf page
pub fn trip_report_url(leaf_url: &str) -> String {
    format!("{}{}", leaf_url, TRIP_REPORT_SUFFIX)
}

/// Builds the fetcher selected by the configuration
pub fn from_config(config: &HarvestConfig) -> Result<Arc<dyn Fetcher>> {
    match config.backend {
        FetchBackend::Http => Ok(Arc::new(HttpFetcher::new(config)?)),
        FetchBackend::WebDriver => {
            let mut webdriver_url = config.webdriver_url.clone();
            // Override the WebDriver URL with an environment variable if provided
            if let Ok(from_env) = std::env::var("WEBDRIVER_URL") {
                if !from_env.is_empty() {
                    webdriver_url = from_env;
                }
            }
            if config.insecure_tls {
                ::log::warn!("insecure_tls has no effect on the WebDriver backend");
            }
            Ok(Arc::new(WebDriverFetcher::new(
                webdriver_url,
                std::time::Duration::from_secs(config.fetch_timeout_secs),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trip_report_url() {
        assert_eq!(
            trip_report_url("https://hikes.example.org/go-hiking/hikes/lake-serene"),
            "https://hikes.example.org/go-hiking/hikes/lake-serene/@@related_tripreport_listing"
        );
    }
}
