use crate::error::{HarvestError, Result};
use crate::fetch::Fetcher;
use crate::render::text::attr_value;
use crate::render::{RenderedPage, render};
use url::Url;

/// Marks the link of one listed item on an index page
pub const LISTING_TITLE_MARKER: &str = "listitem-title";

/// Leaf-record URLs on one rendered index page, in page order
pub fn leaf_links_on(page: &RenderedPage) -> Vec<String> {
    page.find_all(LISTING_TITLE_MARKER)
        .filter_map(|i| page.line(i))
        .filter_map(|line| attr_value(line, "href"))
        .filter(|href| {
            Url::parse(href)
                .map(|url| matches!(url.scheme(), "http" | "https"))
                .unwrap_or(false)
        })
        .map(str::to_string)
        .collect()
}

/// Visits every index page once and gathers the leaf-record URLs they list.
///
/// Order of discovery is kept and duplicates across index pages are not
/// removed. Finding no leaf links at all is a structure error.
pub async fn collect_leaf_links(fetcher: &dyn Fetcher, index_pages: &[String]) -> Result<Vec<String>> {
    ::log::info!("Getting leaf links from {} index pages", index_pages.len());

    let mut leaf_links = Vec::new();
    for index_url in index_pages {
        let html = fetcher.fetch(index_url).await?;
        let found = leaf_links_on(&render(&html));
        ::log::debug!("Found {} leaf links on {}", found.len(), index_url);
        leaf_links.extend(found);
    }

    if leaf_links.is_empty() {
        let first = index_pages.first().map(String::as_str).unwrap_or_default();
        return Err(HarvestError::structure(
            first,
            "no leaf links found on any index page",
        ));
    }

    ::log::info!("Found {} leaf links", leaf_links.len());
    Ok(leaf_links)
}
