/// Normalize line endings
pub fn normalize_lines(data: &str) -> String {
    normalize_line_endings::normalized(data.chars()).collect()
}

/// Start offsets of every non-overlapping occurrence of `pattern`, left to right
pub(crate) fn find_all(text: &str, pattern: &str) -> Vec<usize> {
    text.match_indices(pattern).map(|(i, _)| i).collect()
}

/// `text[start..end]`, or `""` when the range is inverted
pub(crate) fn slice(text: &str, start: usize, end: usize) -> &str {
    if start <= end {
        &text[start..end]
    } else {
        ""
    }
}
