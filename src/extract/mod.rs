//! Pulls the fields of one hike out of its page and its trip-report listing.
//!
//! A strategy only locates raw text for each field ([`FieldSource`],
//! [`ReportSource`]); the parsing rules in [`fields`] turn that text into
//! values. A missing anchor or a value that does not parse leaves the field
//! null and the rest of the record intact.

pub mod fields;
pub mod lines;
pub mod selector;

pub use lines::LineOffsetPage;
pub use selector::SelectorPage;

use crate::config::ExtractorKind;
use crate::error::{HarvestError, ParseError, Result};
use crate::fetch::{Fetcher, trip_report_url};
use crate::table::HikeRecord;
use std::time::Duration;
use tokio::time::timeout;

/// Raw text of each field on a hike page, located by some strategy
pub trait FieldSource {
    fn title(&self) -> Option<String>;
    fn region(&self) -> Option<String>;
    fn distance(&self) -> Option<String>;
    fn gain(&self) -> Option<String>;
    fn highest_point(&self) -> Option<String>;
    fn rating(&self) -> Option<String>;
    fn rating_count(&self) -> Option<String>;
}

/// Raw text of the trip-report fields
pub trait ReportSource {
    fn report_count(&self) -> Option<String>;
    /// Date of the first listed (most recent) report
    fn first_report_date(&self) -> Option<String>;
}

/// Keeps a parsed value, or logs why it was dropped
fn keep<T>(link: &str, parsed: std::result::Result<T, ParseError>) -> Option<T> {
    match parsed {
        Ok(value) => Some(value),
        Err(e) => {
            ::log::debug!("{}: {}", link, e);
            None
        }
    }
}

/// Fills the primary-page fields of `record`
pub fn read_primary(source: &dyn FieldSource, record: &mut HikeRecord) {
    let link = record.link.clone();

    record.title = source.title();
    record.region = source.region();

    if let Some(raw) = source.distance() {
        if let Some((distance, kind)) = keep(&link, fields::parse_distance(&raw)) {
            record.distance = Some(distance);
            record.distance_type = kind;
        }
    }

    record.gain = source
        .gain()
        .and_then(|raw| keep(&link, fields::parse_float("gain", &raw)));
    record.highest_point = source
        .highest_point()
        .and_then(|raw| keep(&link, fields::parse_float("highest point", &raw)));
    record.rating = source
        .rating()
        .and_then(|raw| keep(&link, fields::parse_rating(&raw)));
    record.rating_count = source
        .rating_count()
        .and_then(|raw| keep(&link, fields::parse_rating_count(&raw)));
}

/// Fills the trip-report fields of `record`
pub fn read_reports(source: &dyn ReportSource, record: &mut HikeRecord) {
    let link = record.link.clone();

    record.report_count = source
        .report_count()
        .and_then(|raw| keep(&link, fields::parse_int("report count", &raw)));
    record.report_date = source
        .first_report_date()
        .and_then(|raw| keep(&link, fields::parse_report_date(&raw)));
}

/// Builds the record for `link` from already-fetched HTML
pub fn extract_record(
    kind: ExtractorKind,
    link: &str,
    primary_html: &str,
    report_html: Option<&str>,
) -> HikeRecord {
    let mut record = HikeRecord::new(link);

    match kind {
        ExtractorKind::LineOffset => {
            read_primary(&LineOffsetPage::render(primary_html), &mut record);
            if let Some(html) = report_html {
                read_reports(&LineOffsetPage::render(html), &mut record);
            }
        }
        ExtractorKind::Selector => {
            read_primary(&SelectorPage::parse(primary_html), &mut record);
            if let Some(html) = report_html {
                read_reports(&SelectorPage::parse(html), &mut record);
            }
        }
    }

    record
}

/// Fetches `url`, giving up after `deadline`
async fn fetch_within(fetcher: &dyn Fetcher, url: &str, deadline: Duration) -> Result<String> {
    match timeout(deadline, fetcher.fetch(url)).await {
        Ok(result) => result,
        Err(_) => Err(HarvestError::transport(
            url,
            format!("no response within {:.1}s", deadline.as_secs_f64()),
        )),
    }
}

/// Fetches a hike page and its trip-report listing and extracts the record.
///
/// Each of the two fetches gets `deadline` on its own. Failing to fetch the
/// hike page in time is an error. Failing to fetch the trip reports in time
/// only leaves the report fields null.
pub async fn extract(
    fetcher: &dyn Fetcher,
    kind: ExtractorKind,
    link: &str,
    deadline: Duration,
) -> Result<HikeRecord> {
    let primary_html = fetch_within(fetcher, link, deadline).await?;

    let report_link = trip_report_url(link);
    let report_html = match fetch_within(fetcher, &report_link, deadline).await {
        Ok(html) => Some(html),
        Err(e) => {
            ::log::warn!("Trip reports unavailable for {}: {}", link, e);
            None
        }
    };

    Ok(extract_record(kind, link, &primary_html, report_html.as_deref()))
}
