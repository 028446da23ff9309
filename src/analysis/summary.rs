//! Summarization windowing and the extractive fallback.
//!
//! Long documents are reduced to a representative excerpt (head, a window around the midpoint,
//! tail) before reaching the model, and the model input is always capped at
//! [`MAX_MODEL_WORDS`].

use super::text::{sentence_fragments, truncate_words, word_count, words};

/// Fixed text returned for documents too short to summarize.
pub const TOO_SHORT_MESSAGE: &str = "Text too short to summarize effectively.";

pub(crate) const MIN_WORDS: usize = 30;
pub(crate) const LONG_DOCUMENT_WORDS: usize = 500;
const HEAD_WORDS: usize = 200;
const MIDDLE_WORDS: usize = 200;
const TAIL_WORDS: usize = 100;
pub(crate) const MAX_MODEL_WORDS: usize = 450;
pub(crate) const SUMMARY_MAX_LENGTH: usize = 150;
pub(crate) const SUMMARY_MIN_LENGTH: usize = 40;
const FALLBACK_FRAGMENTS: usize = 5;
const FALLBACK_MIN_CHARS: usize = 10;

/// Text handed to the summarization model, or `None` when the document is too short.
pub(crate) fn model_input(text: &str) -> Option<String> {
    let words = words(text);
    let total = words.len();
    if total < MIN_WORDS {
        return None;
    }

    let candidate = if total > LONG_DOCUMENT_WORDS {
        build_excerpt(&words)
    } else {
        text.to_string()
    };
    Some(truncate_words(&candidate, MAX_MODEL_WORDS))
}

/// Concatenate the head, a midpoint-centered window, and the tail of a long document.
pub(crate) fn build_excerpt(words: &[&str]) -> String {
    let total = words.len();
    let head = &words[..HEAD_WORDS.min(total)];
    let middle_start = (total / 2).saturating_sub(MIDDLE_WORDS / 2);
    let middle_end = (middle_start + MIDDLE_WORDS).min(total);
    let middle = &words[middle_start..middle_end];
    let tail = &words[total.saturating_sub(TAIL_WORDS)..];

    [head.join(" "), middle.join(" "), tail.join(" ")].join(" ")
}

/// Extractive summary built from the leading sentence fragments.
pub(crate) fn fallback_summary(text: &str) -> String {
    let kept: Vec<&str> = sentence_fragments(text)
        .take(FALLBACK_FRAGMENTS)
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() > FALLBACK_MIN_CHARS)
        .collect();

    if kept.is_empty() {
        return format!(
            "Document contains {} words. Unable to generate AI summary for very large documents.",
            word_count(text)
        );
    }
    format!("{}.", kept.join(". "))
}
