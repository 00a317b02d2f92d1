/// Split a candidate span on the gap marker into the pieces to locate.
///
/// Pieces keep their order and original wording; blank pieces are dropped.
/// A marker written with `...` also matches the same marker written with a
/// unicode ellipsis, since that is how the marker tends to come back from
/// text generation.
pub fn split_segments(span: &str, gap_marker: &str) -> Vec<String> {
    if gap_marker.is_empty() {
        return single_segment(span);
    }
    let mut text = span.to_string();
    if gap_marker.contains("...") {
        text = text.replace(&gap_marker.replace("...", "\u{2026}"), gap_marker);
    }
    text.split(gap_marker)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn single_segment(span: &str) -> Vec<String> {
    let trimmed = span.trim();
    if trimmed.is_empty() {
        vec![]
    } else {
        vec![trimmed.to_string()]
    }
}
