use thiserror::Error;

/// Errors surfaced by a harvest run
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Fetching a page failed (network, timeout, HTTP status)
    #[error("transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    /// A page lacks structure the traversal cannot do without
    #[error("structure error on {url}: {message}")]
    Structure { url: String, message: String },

    /// A URL could not be parsed
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the output table failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The configuration could not be read
    #[error("config error: {0}")]
    Config(String),
}

impl HarvestError {
    pub fn transport(url: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub fn structure(url: &str, message: impl Into<String>) -> Self {
        Self::Structure {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<serde_json::Error> for HarvestError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<regex::Error> for HarvestError {
    fn from(e: regex::Error) -> Self {
        Self::Config(format!("invalid pattern: {}", e))
    }
}

/// A value sat where a field was expected but did not parse under its rule.
/// Never escapes the extractor: the field is stored as null.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse {field} from {value:?}")]
pub struct ParseError {
    pub field: &'static str,
    pub value: String,
}

impl ParseError {
    pub fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
