pub mod html;
pub mod text;


/// Line-oriented view of an HTML page: one node per line, the way a
/// pretty-printer lays it out. Anchors are found by substring match on a
/// line and values are read a fixed number of lines away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    lines: Vec<String>,
}

impl RenderedPage {
    /// Wraps already-rendered lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the first line containing `marker`
    pub fn find(&self, marker: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.contains(marker))
    }

    /// Indices of every line containing `marker`, in order
    pub fn find_all<'a>(&'a self, marker: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.lines
            .iter()
            .enumerate()
            .filter(move |(_, line)| line.contains(marker))
            .map(|(i, _)| i)
    }

    /// The line `offset` lines away from `index`, leading indentation stripped.
    /// `None` when the target falls outside the page.
    pub fn value_at(&self, index: usize, offset: isize) -> Option<&str> {
        let target = index.checked_add_signed(offset)?;
        self.lines.get(target).map(|line| line.trim_start())
    }

    /// Raw line at `index`
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Lines in the half-open range `[start, end)`, clamped to the page
    pub fn range(&self, start: usize, end: usize) -> &[String] {
        let end = end.min(self.lines.len());
        let start = start.min(end);
        &self.lines[start..end]
    }
}

/// Renders an HTML document into its line view
pub fn render(html: &str) -> RenderedPage {
    let lines = html::prettify(html);
    ::log::trace!("Rendered page into {} lines", lines.len());
    RenderedPage { lines }
}
