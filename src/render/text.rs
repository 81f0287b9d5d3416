/// Normalizes whitespace within a single text node
pub fn normalize_whitespace_in_segment(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pulls the value of `name="..."` out of a rendered tag line
pub fn attr_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{}=\"", name);
    let mut search_from = 0;
    while let Some(found) = line[search_from..].find(&needle) {
        let start = search_from + found;
        // `href="` must not match inside `data-href="`
        let boundary = start == 0 || line[..start].ends_with(|c: char| c.is_whitespace());
        let value_start = start + needle.len();
        if boundary {
            let len = line[value_start..].find('"')?;
            return Some(&line[value_start..value_start + len]);
        }
        search_from = value_start;
    }
    None
}
