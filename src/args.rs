use clap::{Parser, ValueEnum};
use hike_harvest::{ExtractorKind, FetchBackend, HarvestConfig, Result};
use std::path::PathBuf;

pub const DEFAULT_START_URL: &str = "https://www.wta.org/go-outside/hikes";

#[derive(Parser, Debug)]
#[command(name = "hike-harvest")]
#[command(about = "Harvests hike records from a paginated listing into a CSV table")]
#[command(version)]
pub struct Args {
    /// First index page of the listing [default: the WTA hike finder]
    pub uri: Option<String>,

    /// JSON configuration file; command-line flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output CSV file [default: <date>_wta_hikes.csv]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of hike pages processed at once
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Fetch backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// WebDriver server URL (webdriver backend)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Timeout for a single fetch, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Retries for transient transport errors
    #[arg(long)]
    pub retries: Option<u32>,

    /// Field-extraction strategy
    #[arg(long, value_enum)]
    pub extractor: Option<ExtractorArg>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Http,
    Webdriver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExtractorArg {
    LineOffset,
    Selector,
}

impl From<BackendArg> for FetchBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Http => FetchBackend::Http,
            BackendArg::Webdriver => FetchBackend::WebDriver,
        }
    }
}

impl From<ExtractorArg> for ExtractorKind {
    fn from(arg: ExtractorArg) -> Self {
        match arg {
            ExtractorArg::LineOffset => ExtractorKind::LineOffset,
            ExtractorArg::Selector => ExtractorKind::Selector,
        }
    }
}

impl Args {
    /// Configuration file (if any) with command-line overrides applied
    pub fn build_config(&self) -> Result<HarvestConfig> {
        let mut config = match &self.config {
            Some(path) => HarvestConfig::from_file(path)?,
            None => HarvestConfig::new(self.uri.as_deref().unwrap_or(DEFAULT_START_URL)),
        };

        if let Some(uri) = &self.uri {
            config.start_url = uri.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrency = concurrency;
        }
        if self.insecure {
            config.insecure_tls = true;
        }
        if let Some(backend) = self.backend {
            config.backend = backend.into();
        }
        if let Some(webdriver_url) = &self.webdriver_url {
            config.webdriver_url = webdriver_url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.fetch_timeout_secs = timeout;
        }
        if let Some(retries) = self.retries {
            config.max_retries = retries;
        }
        if let Some(extractor) = self.extractor {
            config.extractor = extractor.into();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["hike-harvest"]);
        let config = args.build_config().unwrap();
        assert_eq!(config.start_url, DEFAULT_START_URL);
        assert!(!config.insecure_tls);
        assert_eq!(config.backend, FetchBackend::Http);
    }

    #[test]
    fn test_flags_override() {
        let args = Args::parse_from([
            "hike-harvest",
            "https://hikes.example.org/go-outside/hikes",
            "--insecure",
            "-j",
            "8",
            "--backend",
            "webdriver",
            "--extractor",
            "selector",
            "--retries",
            "0",
        ]);
        let config = args.build_config().unwrap();
        assert_eq!(config.start_url, "https://hikes.example.org/go-outside/hikes");
        assert!(config.insecure_tls);
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.backend, FetchBackend::WebDriver);
        assert_eq!(config.extractor, ExtractorKind::Selector);
        assert_eq!(config.max_retries, 0);
    }
}
