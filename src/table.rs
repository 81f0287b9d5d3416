use crate::error::{HarvestError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Written in the distance column when the distance line matched neither known layout
pub const INVALID_DISTANCE: &str = "ERROR";

/// Output date format
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Distance as read from a hike page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Distance {
    Miles(f64),
    /// The line was there but matched neither `, <type>` nor `of trails`
    Invalid,
}

/// One harvested record; every field but `link` may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HikeRecord {
    pub title: Option<String>,
    pub region: Option<String>,
    pub distance: Option<Distance>,
    pub distance_type: Option<String>,
    pub gain: Option<f64>,
    pub highest_point: Option<f64>,
    pub rating: Option<f64>,
    pub rating_count: Option<i64>,
    pub report_date: Option<NaiveDate>,
    pub report_count: Option<i64>,
    pub link: String,
}

impl HikeRecord {
    pub fn new(link: &str) -> Self {
        Self {
            link: link.to_string(),
            ..Self::default()
        }
    }

    /// A record whose page could not be read: every field null, link kept
    pub fn omitted(link: &str) -> Self {
        Self::new(link)
    }

    fn into_cells(self) -> [Cell; Column::COUNT] {
        [
            self.title.map_or(Cell::Null, Cell::Text),
            self.region.map_or(Cell::Null, Cell::Text),
            match self.distance {
                Some(Distance::Miles(miles)) => Cell::Float(miles),
                Some(Distance::Invalid) => Cell::Sentinel(INVALID_DISTANCE),
                None => Cell::Null,
            },
            self.distance_type.map_or(Cell::Null, Cell::Text),
            self.gain.map_or(Cell::Null, Cell::Float),
            self.highest_point.map_or(Cell::Null, Cell::Float),
            self.rating.map_or(Cell::Null, Cell::Float),
            self.rating_count.map_or(Cell::Null, Cell::Int),
            self.report_date.map_or(Cell::Null, Cell::Date),
            self.report_count.map_or(Cell::Null, Cell::Int),
            Cell::Text(self.link),
        ]
    }
}

/// Named output columns, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Title,
    Region,
    Distance,
    DistanceType,
    Gain,
    HighestPoint,
    Rating,
    RatingCount,
    ReportDate,
    ReportCount,
    Link,
}

impl Column {
    pub const COUNT: usize = 11;

    pub const ALL: [Column; Column::COUNT] = [
        Column::Title,
        Column::Region,
        Column::Distance,
        Column::DistanceType,
        Column::Gain,
        Column::HighestPoint,
        Column::Rating,
        Column::RatingCount,
        Column::ReportDate,
        Column::ReportCount,
        Column::Link,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Title => "TITLE",
            Column::Region => "REGION",
            Column::Distance => "DISTANCE",
            Column::DistanceType => "DIST_TYPE",
            Column::Gain => "GAIN",
            Column::HighestPoint => "HIGHEST",
            Column::Rating => "RATING",
            Column::RatingCount => "RATING_COUNT",
            Column::ReportDate => "REPORT_DATE",
            Column::ReportCount => "REPORT_COUNT",
            Column::Link => "LINK",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Float(f64),
    Int(i64),
    Date(NaiveDate),
    Sentinel(&'static str),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Text as written to the output file; nulls are empty
    pub fn render(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Float(value) => value.to_string(),
            Cell::Int(value) => value.to_string(),
            Cell::Date(date) => date.format(DATE_FORMAT).to_string(),
            Cell::Sentinel(text) => text.to_string(),
        }
    }
}

/// Column-oriented table of harvested records.
///
/// Rows only enter through [`Table::commit_row`], which appends to every
/// column at once and checks that all columns still have one entry per row.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: [Vec<Cell>; Column::COUNT],
    rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one record as a row
    pub fn commit_row(&mut self, record: HikeRecord) -> Result<()> {
        let link = record.link.clone();
        for (column, cell) in self.columns.iter_mut().zip(record.into_cells()) {
            column.push(cell);
        }
        self.rows += 1;

        if let Some(column) = Column::ALL
            .iter()
            .find(|c| self.columns[c.index()].len() != self.rows)
        {
            return Err(HarvestError::structure(
                &link,
                format!(
                    "column {} has {} entries for {} rows",
                    column.header(),
                    self.columns[column.index()].len(),
                    self.rows
                ),
            ));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column(&self, column: Column) -> &[Cell] {
        &self.columns[column.index()]
    }

    pub fn cell(&self, row: usize, column: Column) -> Option<&Cell> {
        self.columns[column.index()].get(row)
    }

    /// Entry count of every column, for a quick alignment check
    pub fn column_counts(&self) -> Vec<(Column, usize)> {
        Column::ALL
            .iter()
            .map(|c| (*c, self.columns[c.index()].len()))
            .collect()
    }

    /// Non-null entries per column
    pub fn filled_counts(&self) -> Vec<(Column, usize)> {
        Column::ALL
            .iter()
            .map(|c| {
                let filled = self.columns[c.index()].iter().filter(|cell| !cell.is_null()).count();
                (*c, filled)
            })
            .collect()
    }

    /// Writes the header and every row as CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(Column::ALL.iter().map(|c| c.header()))?;
        for row in 0..self.rows {
            out.write_record(Column::ALL.iter().map(|c| self.columns[c.index()][row].render()))?;
        }
        out.flush()?;
        Ok(())
    }
}
