use crate::render::text::normalize_whitespace_in_segment;
use scraper::{ElementRef, Html};

/// Elements that never have a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Pretty-prints an HTML document, one node per line.
///
/// - every element opens on its own line, indented one space per depth
/// - attributes are written `name="value"`, sorted by name
/// - non-empty text nodes get their own line, whitespace collapsed
/// - comments and doctypes are dropped
pub fn prettify(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut lines = Vec::new();
    write_element(doc.root_element(), 0, &mut lines);
    lines
}

fn write_element(element: ElementRef<'_>, depth: usize, out: &mut Vec<String>) {
    let indent = " ".repeat(depth);
    let name = element.value().name();
    out.push(format!("{}{}", indent, open_tag(element)));

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            write_element(child_element, depth + 1, out);
        } else if let Some(text) = child.value().as_text() {
            let text = normalize_whitespace_in_segment(text);
            if !text.is_empty() {
                out.push(format!("{} {}", indent, text));
            }
        }
    }

    if !VOID_ELEMENTS.contains(&name) {
        out.push(format!("{}</{}>", indent, name));
    }
}

fn open_tag(element: ElementRef<'_>) -> String {
    let mut attrs: Vec<(&str, &str)> = element.value().attrs().collect();
    attrs.sort_by(|a, b| a.0.cmp(b.0));

    let mut tag = format!("<{}", element.value().name());
    for (name, value) in attrs {
        tag.push_str(&format!(" {}=\"{}\"", name, value));
    }
    tag.push('>');
    tag
}
