use crate::extract::{FieldSource, ReportSource};
use crate::render::text::normalize_whitespace_in_segment;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector(".documentFirstHeading"));
static REGION: LazyLock<Selector> =
    LazyLock::new(|| selector("#hike-region span, .hike-region span"));
static DISTANCE: LazyLock<Selector> = LazyLock::new(|| selector("#distance span, .distance span"));
static RATING: LazyLock<Selector> = LazyLock::new(|| selector(".current-rating"));
static RATING_COUNT: LazyLock<Selector> = LazyLock::new(|| selector(".rating-count"));
static REPORT_COUNT: LazyLock<Selector> = LazyLock::new(|| selector(".count-data"));
static REPORT_DATE: LazyLock<Selector> = LazyLock::new(|| selector(".elapsed-time"));
static ANY: LazyLock<Selector> = LazyLock::new(|| selector("*"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));

/// Finds fields with CSS selectors against the parsed document, so layout
/// whitespace does not matter.
pub struct SelectorPage {
    doc: Html,
}

impl SelectorPage {
    pub fn parse(html: &str) -> Self {
        Self {
            doc: Html::parse_document(html),
        }
    }

    fn first_text(&self, selector: &Selector) -> Option<String> {
        self.doc.select(selector).next().and_then(element_text)
    }

    /// Value in the `<span>` of the element whose own text carries `label`,
    /// as in `<div>Gain: <span>1200</span> feet</div>`
    fn labelled(&self, label: &str) -> Option<String> {
        let holder = self.doc.select(&ANY).find(|element| {
            element
                .children()
                .filter_map(|child| child.value().as_text())
                .any(|text| text.contains(label))
        })?;
        holder.select(&SPAN).next().and_then(element_text)
    }
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = normalize_whitespace_in_segment(&element.text().collect::<Vec<_>>().join(" "));
    (!text.is_empty()).then_some(text)
}

impl FieldSource for SelectorPage {
    fn title(&self) -> Option<String> {
        self.first_text(&TITLE)
    }

    fn region(&self) -> Option<String> {
        self.first_text(&REGION)
    }

    fn distance(&self) -> Option<String> {
        self.first_text(&DISTANCE)
    }

    fn gain(&self) -> Option<String> {
        self.labelled("Gain:")
    }

    fn highest_point(&self) -> Option<String> {
        self.labelled("Highest Point:")
    }

    fn rating(&self) -> Option<String> {
        self.first_text(&RATING)
    }

    fn rating_count(&self) -> Option<String> {
        self.first_text(&RATING_COUNT)
    }
}

impl ReportSource for SelectorPage {
    fn report_count(&self) -> Option<String> {
        self.first_text(&REPORT_COUNT)
    }

    fn first_report_date(&self) -> Option<String> {
        self.doc
            .select(&REPORT_DATE)
            .next()
            .and_then(|element| element.value().attr("title"))
            .map(str::to_string)
    }
}
