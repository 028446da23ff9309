//! Representative sentence sampling.

use super::text::{char_len, sentence_fragments};

/// Placeholder returned when no fragment qualifies as a key point.
pub const NO_KEY_POINTS: &str = "No key points could be extracted from this document.";

const MIN_FRAGMENT_CHARS: usize = 20;
const MAX_FRAGMENT_CHARS: usize = 200;
const MAX_POINTS: usize = 5;

/// Trimmed fragments whose length lies strictly between the bounds, in document order.
pub(crate) fn eligible_fragments(text: &str) -> Vec<&str> {
    text.split('\n')
        .flat_map(sentence_fragments)
        .map(str::trim)
        .filter(|fragment| {
            let len = char_len(fragment);
            len > MIN_FRAGMENT_CHARS && len < MAX_FRAGMENT_CHARS
        })
        .collect()
}

/// Sample positions: first, quarter, half, three-quarter, last.
pub(crate) fn sample_positions(total: usize) -> [usize; 5] {
    [
        0,
        total / 4,
        total / 2,
        3 * total / 4,
        total.saturating_sub(1),
    ]
}

/// Up to five evenly spaced fragments, or `None` when nothing qualifies.
pub(crate) fn sample_key_points(text: &str) -> Option<Vec<String>> {
    let fragments = eligible_fragments(text);
    if fragments.is_empty() {
        return None;
    }

    let mut points: Vec<String> = Vec::with_capacity(MAX_POINTS);
    for index in sample_positions(fragments.len()) {
        let Some(fragment) = fragments.get(index) else {
            continue;
        };
        let point = format!("{fragment}.");
        if !points.contains(&point) {
            points.push(point);
        }
    }
    points.truncate(MAX_POINTS);
    Some(points)
}
