//! Discovers every index page of a paginated listing.
//!
//! Each index page carries pagination controls. In the line view they look like
//!
//! ```text
//! <li class="active">      <- current page, number two lines below
//!  <span>
//!   3
//! ...
//! <li class="last">        <- jump-to-last control, number two lines below
//! ...
//! <li class="next">        <- next control, last numbered link three lines above
//! ```
//!
//! Links between the current-page marker and the first control are the
//! navigation links of that page.

use crate::error::{HarvestError, Result};
use crate::fetch::Fetcher;
use crate::filter::LinkFilter;
use crate::render::text::attr_value;
use crate::render::{RenderedPage, render};
use std::collections::HashSet;

pub const ACTIVE_MARKER: &str = "\"active\"";
pub const LAST_MARKER: &str = "\"last\"";
pub const NEXT_MARKER: &str = "\"next\"";

const ACTIVE_VALUE_OFFSET: isize = 2;
const LAST_VALUE_OFFSET: isize = 2;
const NEXT_LAST_VALUE_OFFSET: isize = -3;

/// Where one index page sits in the pagination, as read from its own controls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// Page number advertised by the current-page marker
    pub active_page_number: Option<u32>,
    /// Total page count, once discovered
    pub last_page_number: Option<u32>,
    /// First line of the navigation range
    pub index_start: usize,
    /// One past the last line of the navigation range
    pub index_end: usize,
}

/// Which controls the page showed, and so what the walk does next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControls {
    /// A jump-to-last control: the final page is not linked yet, keep walking
    MoreBeyond,
    /// A next control without jump-to-last: every remaining page is linked here
    AllVisible,
    /// No controls, and this is the known last page
    Exhausted,
    /// No pagination markup at all
    Unpaginated,
}

/// Reads the pagination controls of one rendered index page.
///
/// `known_last` carries the page count learned on earlier pages.
pub fn scan_pagination(
    page: &RenderedPage,
    known_last: Option<u32>,
    url: &str,
) -> Result<(PaginationState, PageControls)> {
    let mut state = PaginationState {
        last_page_number: known_last,
        ..PaginationState::default()
    };

    for (i, line) in page.lines().iter().enumerate() {
        if line.contains(ACTIVE_MARKER) {
            state.index_start = i;
            state.active_page_number =
                Some(page_number_at(page, i, ACTIVE_VALUE_OFFSET, url, "current page")?);
        }

        if line.contains(LAST_MARKER) {
            state.index_end = i;
            state.last_page_number =
                Some(page_number_at(page, i, LAST_VALUE_OFFSET, url, "last page")?);
            return Ok((state, PageControls::MoreBeyond));
        } else if line.contains(NEXT_MARKER) {
            state.index_end = i;
            state.last_page_number =
                Some(page_number_at(page, i, NEXT_LAST_VALUE_OFFSET, url, "last page")?);
            return Ok((state, PageControls::AllVisible));
        } else if state.active_page_number.is_some()
            && state.active_page_number == state.last_page_number
        {
            return Ok((state, PageControls::Exhausted));
        }
    }

    if state.active_page_number.is_none() {
        return Ok((state, PageControls::Unpaginated));
    }

    Err(HarvestError::structure(
        url,
        format!(
            "page {} has no next or last control and is not the last page",
            state.active_page_number.unwrap_or_default()
        ),
    ))
}

/// Strict integer parse of the line `offset` away from `index`
fn page_number_at(
    page: &RenderedPage,
    index: usize,
    offset: isize,
    url: &str,
    what: &str,
) -> Result<u32> {
    let value = page.value_at(index, offset).ok_or_else(|| {
        HarvestError::structure(url, format!("{} number missing near line {}", what, index))
    })?;
    value.trim().parse::<u32>().map_err(|_| {
        HarvestError::structure(url, format!("{} number is not numeric: {:?}", what, value))
    })
}

/// Site links inside `[index_start, index_end)`, in page order
pub fn navigation_links(
    page: &RenderedPage,
    state: &PaginationState,
    filter: &LinkFilter,
) -> Vec<String> {
    page.range(state.index_start, state.index_end)
        .iter()
        .filter_map(|line| attr_value(line, "href"))
        .filter_map(|href| filter.accept(href))
        .collect()
}

/// Finds every index page reachable from `start_url` by following its
/// pagination. The result is deduplicated, in discovery order, and never
/// contains `start_url` itself.
///
/// Pages are visited strictly one after another: each step depends on the
/// controls of the previous page.
pub async fn walk(fetcher: &dyn Fetcher, filter: &LinkFilter, start_url: &str) -> Result<Vec<String>> {
    ::log::info!("Getting all links to index pages from {}", start_url);

    let mut found = Vec::new();
    let mut seen = HashSet::new();
    let mut visited = HashSet::new();
    let mut current = start_url.to_string();
    let mut last_page = None;
    let mut steps: u32 = 0;

    loop {
        steps += 1;
        visited.insert(current.clone());

        let html = fetcher.fetch(&current).await?;
        let page = render(&html);
        let (state, controls) = scan_pagination(&page, last_page, &current)?;
        last_page = state.last_page_number;

        ::log::debug!(
            "Index page {} (step {}): active {:?}, last {:?}, {:?}",
            current,
            steps,
            state.active_page_number,
            state.last_page_number,
            controls
        );

        match controls {
            PageControls::Unpaginated => {
                ::log::info!("{} has no pagination controls", current);
                break;
            }
            PageControls::Exhausted => break,
            PageControls::MoreBeyond | PageControls::AllVisible => {}
        }

        let links = navigation_links(&page, &state, filter);
        for link in &links {
            if link != start_url && seen.insert(link.clone()) {
                found.push(link.clone());
            }
        }

        if controls == PageControls::AllVisible {
            break;
        }

        let next = links.first().ok_or_else(|| {
            HarvestError::structure(&current, "no navigation links after the current-page marker")
        })?;
        if visited.contains(next) {
            return Err(HarvestError::structure(
                &current,
                format!("pagination leads back to {}", next),
            ));
        }
        if let Some(last) = last_page {
            if steps >= last {
                return Err(HarvestError::structure(
                    &current,
                    format!("pagination did not end within {} pages", last),
                ));
            }
        }
        current = next.clone();
    }

    ::log::info!("Found {} index pages besides {}", found.len(), start_url);
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures::{self, SITE};

    fn lines(raw: &[&str]) -> RenderedPage {
        RenderedPage::from_lines(raw.iter().copied())
    }

    #[test]
    fn test_last_control_means_more_beyond() {
        let page = render(&fixtures::index_page(1, &[1, 2, 3], Some(9), true, &[]));
        let (state, controls) = scan_pagination(&page, None, SITE).unwrap();
        assert_eq!(controls, PageControls::MoreBeyond);
        assert_eq!(state.active_page_number, Some(1));
        assert_eq!(state.last_page_number, Some(9));
        assert!(state.index_start <= state.index_end);
    }

    #[test]
    fn test_next_without_last_reads_backwards() {
        let page = render(&fixtures::index_page(2, &[1, 2, 3, 4], None, true, &[]));
        let (state, controls) = scan_pagination(&page, Some(9), SITE).unwrap();
        assert_eq!(controls, PageControls::AllVisible);
        assert_eq!(state.active_page_number, Some(2));
        assert_eq!(state.last_page_number, Some(4));
    }

    #[test]
    fn test_known_last_page_without_controls_is_exhausted() {
        let page = render(&fixtures::index_page(5, &[3, 4, 5], None, false, &[]));
        let (_, controls) = scan_pagination(&page, Some(5), SITE).unwrap();
        assert_eq!(controls, PageControls::Exhausted);
    }

    #[test]
    fn test_no_markup_is_unpaginated() {
        let page = lines(&["<html>", " <body>", " </body>", "</html>"]);
        let (_, controls) = scan_pagination(&page, None, SITE).unwrap();
        assert_eq!(controls, PageControls::Unpaginated);
    }

    #[test]
    fn test_active_without_controls_is_structure_error() {
        let page = render(&fixtures::index_page(2, &[1, 2, 3], None, false, &[]));
        let err = scan_pagination(&page, Some(9), SITE).unwrap_err();
        assert!(matches!(err, HarvestError::Structure { .. }));
    }

    #[test]
    fn test_non_numeric_page_number_is_structure_error() {
        let page = lines(&["<li class=\"active\">", " <span>", "  three", " </span>"]);
        let err = scan_pagination(&page, None, SITE).unwrap_err();
        assert!(matches!(err, HarvestError::Structure { .. }));

        let page = lines(&["<li class=\"last\">", " <a>"]);
        let err = scan_pagination(&page, None, SITE).unwrap_err();
        assert!(matches!(err, HarvestError::Structure { .. }));
    }

    #[test]
    fn test_navigation_links_start_at_active_marker() {
        let page = render(&fixtures::index_page(2, &[1, 2, 3, 4], Some(9), true, &[]));
        let (state, _) = scan_pagination(&page, None, SITE).unwrap();
        let filter = fixtures::filter();
        let links = navigation_links(&page, &state, &filter);
        assert_eq!(links, vec![fixtures::index_url(3), fixtures::index_url(4)]);
    }

    #[tokio::test]
    async fn test_walk_follows_last_control_until_all_visible() {
        let fetcher = fixtures::five_page_site();
        let filter = fixtures::filter();
        let pages = walk(&fetcher, &filter, &fixtures::index_url(1)).await.unwrap();
        assert_eq!(
            pages,
            vec![
                fixtures::index_url(2),
                fixtures::index_url(3),
                fixtures::index_url(4),
                fixtures::index_url(5),
            ]
        );
        // pages 1, 2 and 3 were read; 3 links every remaining page
        assert_eq!(fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_walk_is_idempotent() {
        let fetcher = fixtures::five_page_site();
        let filter = fixtures::filter();
        let first = walk(&fetcher, &filter, &fixtures::index_url(1)).await.unwrap();
        let second = walk(&fetcher, &filter, &fixtures::index_url(1)).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_walk_stops_on_known_last_page() {
        let fetcher = crate::fetch::MemoryFetcher::new()
            .with_page(
                &fixtures::index_url(4),
                fixtures::index_page(4, &[3, 4, 5], Some(5), false, &[]),
            )
            .with_page(
                &fixtures::index_url(5),
                fixtures::index_page(5, &[3, 4, 5], None, false, &[]),
            );
        let filter = fixtures::filter();
        let pages = walk(&fetcher, &filter, &fixtures::index_url(4)).await.unwrap();
        assert_eq!(pages, vec![fixtures::index_url(5)]);
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_walk_unpaginated_listing() {
        let fetcher = crate::fetch::MemoryFetcher::new()
            .with_page(SITE, "<html><body><p>Only page</p></body></html>");
        let pages = walk(&fetcher, &fixtures::filter(), SITE).await.unwrap();
        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn test_walk_without_navigation_links_fails() {
        // last control but nothing linked after the active marker
        let fetcher = crate::fetch::MemoryFetcher::new().with_page(
            &fixtures::index_url(3),
            fixtures::index_page(3, &[1, 2, 3], Some(9), false, &[]),
        );
        let err = walk(&fetcher, &fixtures::filter(), &fixtures::index_url(3))
            .await
            .unwrap_err();
        assert!(matches!(err, HarvestError::Structure { .. }));
    }

    #[tokio::test]
    async fn test_walk_refuses_to_loop() {
        // page 2 claims page 1 is its next page
        let fetcher = crate::fetch::MemoryFetcher::new()
            .with_page(
                &fixtures::index_url(1),
                fixtures::index_page(1, &[1, 2], Some(9), false, &[]),
            )
            .with_page(
                &fixtures::index_url(2),
                format!(
                    "<html><body><ul><li class=\"active\"><span>2</span></li>\
                     <li><a href=\"{}\">1</a></li>\
                     <li class=\"last\"><a href=\"{}\">9</a></li></ul></body></html>",
                    fixtures::index_url(1),
                    fixtures::index_url(9)
                ),
            );
        let err = walk(&fetcher, &fixtures::filter(), &fixtures::index_url(1))
            .await
            .unwrap_err();
        assert!(matches!(err, HarvestError::Structure { .. }));
    }

    #[tokio::test]
    async fn test_walk_stops_at_page_count_bound() {
        // page 2 claims it is the last page yet still offers a page 3
        let fetcher = crate::fetch::MemoryFetcher::new()
            .with_page(
                &fixtures::index_url(1),
                fixtures::index_page(1, &[1, 2], Some(3), false, &[]),
            )
            .with_page(
                &fixtures::index_url(2),
                fixtures::index_page(2, &[2, 3], Some(2), false, &[]),
            )
            .with_page(
                &fixtures::index_url(3),
                fixtures::index_page(3, &[3, 4], Some(4), false, &[]),
            );
        let err = walk(&fetcher, &fixtures::filter(), &fixtures::index_url(1))
            .await
            .unwrap_err();
        match err {
            HarvestError::Structure { url, message } => {
                assert_eq!(url, fixtures::index_url(2));
                assert!(message.contains("within 2 pages"), "{}", message);
            }
            other => panic!("expected structure error, got {:?}", other),
        }
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_walk_transport_error_is_fatal() {
        let fetcher = crate::fetch::MemoryFetcher::new();
        let err = walk(&fetcher, &fixtures::filter(), SITE).await.unwrap_err();
        assert!(err.is_transport());
    }
}
