use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};
use crate::fetch::Fetcher;
use reqwest::StatusCode;
use std::time::Duration;

const USER_AGENT: &str = concat!("hike-harvest/", env!("CARGO_PKG_VERSION"));

/// Fetches pages over HTTP(S), retrying transient failures with exponential backoff
pub struct HttpFetcher {
    client: reqwest::Client,
    max_retries: u32,
    retry_backoff: Duration,
}

/// What one attempt came back with
enum Attempt {
    Page(String),
    Retry(String),
    Fail(String),
}

impl HttpFetcher {
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        if config.insecure_tls {
            ::log::warn!("TLS certificate verification is disabled");
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .danger_accept_invalid_certs(config.insecure_tls)
            .build()
            .map_err(|e| HarvestError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    async fn attempt(&self, url: &str) -> Attempt {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
                return Attempt::Retry(e.to_string());
            }
            Err(e) => return Attempt::Fail(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            let message = format!("HTTP {}", status);
            return if is_transient(status) {
                Attempt::Retry(message)
            } else {
                Attempt::Fail(message)
            };
        }

        match response.text().await {
            Ok(body) => Attempt::Page(body),
            Err(e) if e.is_timeout() => Attempt::Retry(e.to_string()),
            Err(e) => Attempt::Fail(e.to_string()),
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before retry number `attempt` (0-based)
pub(crate) fn backoff_for(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        ::log::debug!("GET {}", url);

        for attempt in 0..=self.max_retries {
            match self.attempt(url).await {
                Attempt::Page(body) => return Ok(body),
                Attempt::Fail(message) => return Err(HarvestError::transport(url, message)),
                Attempt::Retry(message) if attempt == self.max_retries => {
                    return Err(HarvestError::transport(
                        url,
                        format!("{} (gave up after {} retries)", message, self.max_retries),
                    ));
                }
                Attempt::Retry(message) => {
                    let backoff = backoff_for(self.retry_backoff, attempt);
                    ::log::warn!(
                        "Transient error on {} (attempt {}/{}): {}, backing off {:.1}s",
                        url,
                        attempt + 1,
                        self.max_retries,
                        message,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        Err(HarvestError::transport(url, "no attempts made"))
    }
}
