use crate::error::{HarvestError, Result};
use regex::Regex;
use url::Url;

/// Static assets never count as index or leaf pages
const DEFAULT_EXCLUDE_PATTERNS: &[&str] =
    &[r"\.(jpg|jpeg|png|gif|css|js|ico|svg|woff|woff2|ttf|eot|pdf)$"];

/// Decides which absolute URLs found on a page belong to the site being harvested
#[derive(Debug)]
pub struct LinkFilter {
    required_host: String,
    exclude_regexes: Vec<Regex>,
}

impl LinkFilter {
    /// Create a filter scoped to the host of `start_url`, plus extra exclude patterns
    pub fn for_site(start_url: &str, exclude_patterns: &[String]) -> Result<Self> {
        let root = Url::parse(start_url).map_err(|source| HarvestError::InvalidUrl {
            url: start_url.to_string(),
            source,
        })?;
        let required_host = root
            .host_str()
            .ok_or_else(|| HarvestError::structure(start_url, "start URL has no host"))?
            .to_string();

        let mut exclude_regexes =
            Vec::with_capacity(DEFAULT_EXCLUDE_PATTERNS.len() + exclude_patterns.len());
        for pattern in DEFAULT_EXCLUDE_PATTERNS {
            exclude_regexes.push(Regex::new(pattern)?);
        }
        for pattern in exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            required_host,
            exclude_regexes,
        })
    }

    pub fn host(&self) -> &str {
        &self.required_host
    }

    /// Parses `candidate` and returns it normalized if it is a site link
    pub fn accept(&self, candidate: &str) -> Option<String> {
        let url = Url::parse(candidate).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        if url.host_str() != Some(self.required_host.as_str()) {
            return None;
        }

        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|re| re.is_match(url_str)) {
            ::log::trace!("Link filter rejected: {}", url_str);
            return None;
        }

        Some(normalize_url(url))
    }
}

/// Drops the fragment; leaves the rest of the URL as written
fn normalize_url(mut url: Url) -> String {
    url.set_fragment(None);
    url.to_string()
}
