use crate::error::{HarvestError, Result};
use crate::fetch::Fetcher;
use fantoccini::{Client, ClientBuilder};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Common alternative WebDriver endpoints tried when the configured one refuses
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444",
];

/// Fetches pages through a browser session.
///
/// One session is shared and navigation is serialized on it, so concurrent
/// callers queue on the lock. The session is opened on first use.
pub struct WebDriverFetcher {
    webdriver_url: String,
    page_timeout: Duration,
    client: Mutex<Option<Client>>,
}

impl WebDriverFetcher {
    pub fn new(webdriver_url: String, page_timeout: Duration) -> Self {
        Self {
            webdriver_url,
            page_timeout,
            client: Mutex::new(None),
        }
    }

    async fn navigate(&self, client: &Client, url: &str) -> std::result::Result<String, String> {
        let load = async {
            client.goto(url).await.map_err(|e| e.to_string())?;
            client.source().await.map_err(|e| e.to_string())
        };
        match timeout(self.page_timeout, load).await {
            Ok(result) => result,
            Err(_) => Err(format!("timed out after {}s", self.page_timeout.as_secs())),
        }
    }
}

/// Connects to the configured WebDriver, then to well-known fallbacks
async fn connect_to_webdriver(webdriver_url: &str) -> Option<Client> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Some(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
        }
    }

    for url in FALLBACK_WEBDRIVER_URLS {
        if *url == webdriver_url {
            continue;
        }
        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Some(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    None
}

fn is_lost_session(message: &str) -> bool {
    message.contains("Unable to find session") || message.contains("invalid session id")
}

#[async_trait::async_trait]
impl Fetcher for WebDriverFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let mut guard = self.client.lock().await;

        for attempt in 0..2 {
            if guard.is_none() {
                *guard = connect_to_webdriver(&self.webdriver_url).await;
            }
            let Some(client) = guard.as_ref() else {
                return Err(HarvestError::transport(url, "no WebDriver session available"));
            };

            match self.navigate(client, url).await {
                Ok(source) => return Ok(source),
                Err(message) if attempt == 0 && is_lost_session(&message) => {
                    ::log::warn!("Lost WebDriver session while loading {}, reconnecting", url);
                    *guard = None;
                }
                Err(message) => return Err(HarvestError::transport(url, message)),
            }
        }

        Err(HarvestError::transport(url, "WebDriver session lost twice"))
    }

    async fn shutdown(&self) {
        let client = self.client.lock().await.take();
        if let Some(client) = client {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            }
        }
    }
}
