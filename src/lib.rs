//! Harvests hike records from a paginated listing site.
//!
//! The pipeline: walk the pagination to find every index page, collect the
//! leaf links each index page lists, extract one record per leaf page (plus
//! its trip-report listing), and assemble the records into an aligned table.

pub mod assemble;
pub mod collector;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod progress;
pub mod render;
pub mod table;
pub mod utils;
pub mod walker;


// Re-export commonly used types for convenience
pub use config::{ExtractorKind, FetchBackend, HarvestConfig};
pub use error::{HarvestError, Result};
pub use fetch::Fetcher;
pub use progress::{NullProgress, Progress};
pub use table::{Column, HikeRecord, Table};

use assemble::{AssembleOptions, AssemblyStats};
use filter::LinkFilter;
use std::sync::Arc;

/// Everything one harvest run produced
#[derive(Debug)]
pub struct Harvest {
    /// Index pages visited, start page first
    pub index_pages: Vec<String>,
    /// Leaf links in discovery order
    pub leaf_links: Vec<String>,
    pub table: Table,
    pub stats: AssemblyStats,
}

/// Runs the whole pipeline against one site
pub struct Harvester {
    config: HarvestConfig,
    fetcher: Arc<dyn Fetcher>,
}

impl Harvester {
    /// Create a harvester using the fetch backend named in the configuration
    pub fn new(config: HarvestConfig) -> Result<Self> {
        let fetcher = fetch::from_config(&config)?;
        Ok(Self { config, fetcher })
    }

    /// Create a harvester with a caller-supplied fetcher
    pub fn with_fetcher(config: HarvestConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Every index page of the listing, the start page first
    pub async fn index_pages(&self) -> Result<Vec<String>> {
        let filter = LinkFilter::for_site(&self.config.start_url, &self.config.exclude_patterns)?;
        let walked = walker::walk(self.fetcher.as_ref(), &filter, &self.config.start_url).await?;

        let mut pages = Vec::with_capacity(walked.len() + 1);
        pages.push(self.config.start_url.clone());
        pages.extend(walked);
        Ok(pages)
    }

    /// Walks, collects, extracts and assembles
    pub async fn run(&self, progress: &mut dyn Progress) -> Result<Harvest> {
        let result = self.run_inner(progress).await;
        self.fetcher.shutdown().await;
        result
    }

    async fn run_inner(&self, progress: &mut dyn Progress) -> Result<Harvest> {
        let index_pages = self.index_pages().await?;
        progress.log(&format!("Found {} index pages", index_pages.len()));

        let leaf_links = collector::collect_leaf_links(self.fetcher.as_ref(), &index_pages).await?;
        progress.log(&format!("Found {} hikes", leaf_links.len()));

        let options = AssembleOptions::from_config(&self.config);
        let (table, stats) =
            assemble::assemble(Arc::clone(&self.fetcher), &leaf_links, &options, progress).await?;

        Ok(Harvest {
            index_pages,
            leaf_links,
            table,
            stats,
        })
    }
}
