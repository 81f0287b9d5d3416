//! Parsing rules applied to the raw text found at each field's anchor.
//! Shared by every extraction strategy.

use crate::error::ParseError;
use crate::table::Distance;
use chrono::NaiveDate;

/// Textual date format used on trip reports, e.g. `Oct 05, 2025`
pub const REPORT_DATE_FORMAT: &str = "%b %d, %Y";

/// Distance and its type from a line such as `3.2 miles, roundtrip`.
///
/// The type is whatever follows `, `, or whatever follows `of trails`,
/// trimmed; nothing after `of trails` means no type.
/// A line matching neither gives [`Distance::Invalid`] and no type.
pub fn parse_distance(raw: &str) -> Result<(Distance, Option<String>), ParseError> {
    let raw = raw.trim();
    let number = raw
        .find(" mile")
        .map(|end| &raw[..end])
        .ok_or_else(|| ParseError::new("distance", raw))?;
    let miles = parse_float("distance", number)?;

    if raw.contains(',') {
        let kind = raw
            .split_once(", ")
            .or_else(|| raw.split_once(','))
            .map(|(_, rest)| rest.trim().to_string())
            .unwrap_or_default();
        Ok((Distance::Miles(miles), Some(kind)))
    } else if let Some((_, rest)) = raw.split_once("of trails") {
        let kind = rest.trim();
        Ok((Distance::Miles(miles), (!kind.is_empty()).then(|| kind.to_string())))
    } else {
        Ok((Distance::Invalid, None))
    }
}

/// Plain float, e.g. elevation gain or highest point
pub fn parse_float(field: &'static str, raw: &str) -> Result<f64, ParseError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ParseError::new(field, raw))
}

/// Plain integer, e.g. trip-report count
pub fn parse_int(field: &'static str, raw: &str) -> Result<i64, ParseError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ParseError::new(field, raw))
}

/// Rating from `4.5 out of 5`
pub fn parse_rating(raw: &str) -> Result<f64, ParseError> {
    let number = raw.find(" out of").map_or(raw, |end| &raw[..end]);
    parse_float("rating", number)
}

/// Vote count from `(123 votes)`
pub fn parse_rating_count(raw: &str) -> Result<i64, ParseError> {
    let start = raw.find('(').ok_or_else(|| ParseError::new("rating count", raw))? + 1;
    let end = raw[start..]
        .find(" vote")
        .map(|len| start + len)
        .ok_or_else(|| ParseError::new("rating count", raw))?;
    parse_int("rating count", &raw[start..end])
}

/// Trip-report date from `Oct 05, 2025`
pub fn parse_report_date(raw: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(raw.trim(), REPORT_DATE_FORMAT)
        .map_err(|_| ParseError::new("report date", raw))
}
