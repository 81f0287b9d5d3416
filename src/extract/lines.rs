use crate::extract::{FieldSource, ReportSource};
use crate::render::text::attr_value;
use crate::render::{RenderedPage, render};

/// A field's anchor text and where its value sits relative to it
#[derive(Debug, Clone, Copy)]
struct Anchor {
    marker: &'static str,
    offset: isize,
}

const TITLE: Anchor = Anchor {
    marker: "\"documentFirstHeading\"",
    offset: 1,
};
const REGION: Anchor = Anchor {
    marker: "\"hike-region\"",
    offset: 3,
};
const DISTANCE: Anchor = Anchor {
    marker: "\"distance\"",
    offset: 2,
};
const GAIN: Anchor = Anchor {
    marker: "Gain:",
    offset: 2,
};
const HIGHEST_POINT: Anchor = Anchor {
    marker: "Highest Point:",
    offset: 2,
};
const RATING: Anchor = Anchor {
    marker: "\"current-rating\"",
    offset: 1,
};
const RATING_COUNT: Anchor = Anchor {
    marker: "\"rating-count\"",
    offset: 1,
};
const REPORT_COUNT: Anchor = Anchor {
    marker: "\"count-data\"",
    offset: 1,
};

/// The date is the `title` attribute on the marker line itself
const REPORT_DATE_MARKER: &str = "\"elapsed-time\"";

/// Finds fields by anchor text in the line view, reading the value a fixed
/// number of lines away from the first line carrying the anchor.
#[derive(Debug, Clone)]
pub struct LineOffsetPage {
    page: RenderedPage,
}

impl LineOffsetPage {
    pub fn new(page: RenderedPage) -> Self {
        Self { page }
    }

    pub fn render(html: &str) -> Self {
        Self::new(render(html))
    }

    fn read(&self, anchor: Anchor) -> Option<String> {
        let at = self.page.find(anchor.marker)?;
        let value = self.page.value_at(at, anchor.offset)?;
        Some(value.to_string())
    }
}

impl FieldSource for LineOffsetPage {
    fn title(&self) -> Option<String> {
        self.read(TITLE)
    }

    fn region(&self) -> Option<String> {
        self.read(REGION)
    }

    fn distance(&self) -> Option<String> {
        self.read(DISTANCE)
    }

    fn gain(&self) -> Option<String> {
        self.read(GAIN)
    }

    fn highest_point(&self) -> Option<String> {
        self.read(HIGHEST_POINT)
    }

    fn rating(&self) -> Option<String> {
        self.read(RATING)
    }

    fn rating_count(&self) -> Option<String> {
        self.read(RATING_COUNT)
    }
}

impl ReportSource for LineOffsetPage {
    fn report_count(&self) -> Option<String> {
        self.read(REPORT_COUNT)
    }

    fn first_report_date(&self) -> Option<String> {
        let at = self.page.find(REPORT_DATE_MARKER)?;
        let line = self.page.line(at)?;
        attr_value(line, "title").map(str::to_string)
    }
}
