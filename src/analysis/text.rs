//! Word and sentence helpers shared by the analysis heuristics.
//!
//! Words are whitespace-separated tokens. Sentence fragments come from splitting on runs of
//! `.`, `!` and `?`; fragments are returned untrimmed so callers decide how to filter them.
//! Lengths are counted in `char`s, never bytes.

use regex::Regex;
use std::sync::LazyLock;

static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence boundary pattern is valid"));

/// Whitespace-separated words of `text`.
pub(crate) fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Keep at most `max_words` words; shorter input is returned unchanged.
pub(crate) fn truncate_words(text: &str, max_words: usize) -> String {
    let words = words(text);
    if words.len() > max_words {
        words[..max_words].join(" ")
    } else {
        text.to_string()
    }
}

/// Raw sentence fragments between terminator runs.
pub(crate) fn sentence_fragments(text: &str) -> impl Iterator<Item = &str> {
    SENTENCE_BOUNDARY.split(text)
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `max_chars` characters of `text`, with `...` appended when anything was cut.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
