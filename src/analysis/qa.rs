//! Context selection and answer post-processing for question answering.
//!
//! The QA model only sees a small window of the document. The window is centered on the
//! sentence sharing the most question keywords, which keeps model input short on long documents.

use super::text::{char_len, sentence_fragments, truncate_words};
use super::types::Answer;

pub(crate) const MIN_CONTEXT_CHARS: usize = 50;
const CONTEXT_WORDS: usize = 350;
const SENTENCES_BEFORE: usize = 2;
const SENTENCES_AFTER: usize = 3;
const DEFAULT_SENTENCES: usize = 10;
const MIN_SENTENCE_CHARS: usize = 20;
const MIN_KEYWORD_CHARS: usize = 3;
const PREVIEW_CHARS: usize = 200;

/// Answer text returned when no usable context was found.
pub const NO_ANSWER: &str =
    "I couldn't find relevant information to answer this question in the document.";
const NO_ANSWER_EXPLANATION: &str =
    "The document doesn't seem to contain information related to your question.";

/// Context chosen for the QA model.
#[derive(Debug, PartialEq)]
pub(crate) enum ContextSelection {
    /// The supplied context was shorter than the minimum and is used as-is.
    Whole(String),
    /// A keyword-selected window of a longer document.
    Selected(String),
}

impl ContextSelection {
    /// The context text, or `None` when it cannot support an answer.
    pub(crate) fn usable(self) -> Option<String> {
        match self {
            Self::Whole(context) if !context.is_empty() => Some(context),
            Self::Selected(context) if char_len(context.trim()) >= MIN_CONTEXT_CHARS => {
                Some(context)
            }
            _ => None,
        }
    }
}

/// Pick the context handed to the QA model for `question`.
///
/// A supplied context already shorter than the minimum is used whole: there is nothing to
/// select from, and filtering would only discard it.
pub(crate) fn select_context(question: &str, text: &str) -> ContextSelection {
    let trimmed = text.trim();
    if char_len(trimmed) < MIN_CONTEXT_CHARS {
        return ContextSelection::Whole(trimmed.to_string());
    }
    ContextSelection::Selected(find_relevant_context(question, text))
}

/// Keyword-overlap window around the best matching sentence.
pub(crate) fn find_relevant_context(question: &str, text: &str) -> String {
    let question = question.to_lowercase();
    let keywords: Vec<&str> = question
        .split_whitespace()
        .filter(|word| char_len(word) > MIN_KEYWORD_CHARS)
        .collect();

    let sentences: Vec<&str> = sentence_fragments(text)
        .map(str::trim)
        .filter(|sentence| char_len(sentence) > MIN_SENTENCE_CHARS)
        .collect();

    let mut best: Option<(usize, usize)> = None;
    for (index, sentence) in sentences.iter().enumerate() {
        let lowered = sentence.to_lowercase();
        let score = keywords
            .iter()
            .filter(|keyword| lowered.contains(*keyword))
            .count();
        if score > 0 && best.is_none_or(|(best_score, _)| score > best_score) {
            best = Some((score, index));
        }
    }

    let Some((score, best_index)) = best else {
        tracing::debug!(
            sentences = sentences.len(),
            "No keyword overlap; using leading sentences as context"
        );
        let end = DEFAULT_SENTENCES.min(sentences.len());
        return sentences[..end].join(" ");
    };

    let start = best_index.saturating_sub(SENTENCES_BEFORE);
    let end = (best_index + SENTENCES_AFTER).min(sentences.len());
    tracing::debug!(score, best_index, start, end, "Selected context window");
    truncate_words(&sentences[start..end].join(" "), CONTEXT_WORDS)
}

/// Widen a raw answer span to the full sentence containing it.
pub(crate) fn expand_answer(raw_answer: &str, context: &str) -> String {
    let needle = raw_answer.trim().to_lowercase();
    if needle.is_empty() || !context.to_lowercase().contains(&needle) {
        return raw_answer.to_string();
    }

    sentence_fragments(context)
        .find(|sentence| sentence.to_lowercase().contains(&needle))
        .map(|sentence| format!("{}.", sentence.trim()))
        .unwrap_or_else(|| raw_answer.to_string())
}

/// Confidence tier explanation.
pub(crate) fn explain_confidence(confidence: f64) -> &'static str {
    if confidence > 0.7 {
        "High confidence - The answer was found clearly in the document."
    } else if confidence > 0.3 {
        "Medium confidence - The answer is likely correct but may be partially extracted."
    } else if confidence > 0.1 {
        "Low confidence - The answer was found but the question wording doesn't match the document exactly. Try rephrasing."
    } else {
        "Very low confidence - The model found a possible answer but isn't certain. The information might not be explicitly stated in the document."
    }
}

pub(crate) fn context_preview(context: &str) -> String {
    super::text::preview(context, PREVIEW_CHARS)
}

/// Fixed record for questions without usable context.
pub(crate) fn not_found() -> Answer {
    Answer {
        answer: NO_ANSWER.into(),
        confidence: 0.0,
        explanation: NO_ANSWER_EXPLANATION.into(),
        context_used: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = "Rust was first released in twenty fifteen. \
        The language focuses on memory safety without garbage collection. \
        Ownership rules are checked by the borrow checker at compile time. \
        Cargo is the package manager shipped with the toolchain. \
        Crates are published to the central registry called crates dot io. \
        Async code relies on executors such as tokio for scheduling. \
        Macros allow code generation at compile time in many forms. \
        The community maintains an extensive book for newcomers to read.";

    #[test]
    fn window_surrounds_best_matching_sentence() {
        let context = find_relevant_context("Which package manager ships?", DOCUMENT);
        assert!(context.starts_with("The language focuses on memory safety"));
        assert!(context.contains("Cargo is the package manager"));
        assert!(context.ends_with("such as tokio for scheduling"));
    }

    #[test]
    fn ties_prefer_the_earliest_sentence() {
        let context = find_relevant_context("compile time?", DOCUMENT);
        // "compile" and "time?" -> only "compile" matches; sentence 2 beats sentence 6
        assert!(context.starts_with("Rust was first released"));
        assert!(context.ends_with("crates dot io"));
    }

    #[test]
    fn selected_window_is_capped_at_350_words() {
        let filler = "plain filler words ".repeat(33);
        let sentences: Vec<String> = (0..5)
            .map(|index| {
                let topic = if index == 2 { "ownership" } else { "padding" };
                format!("Sentence {index} about {topic} {filler}")
            })
            .collect();
        let text = sentences.join(". ");
        assert!(text.split_whitespace().count() > 350);

        let context = find_relevant_context("Which part covers ownership", &text);
        assert!(context.starts_with("Sentence 0 about padding"));
        assert_eq!(context.split_whitespace().count(), CONTEXT_WORDS);
        assert_eq!(CONTEXT_WORDS, 350);
    }

    #[test]
    fn no_overlap_uses_leading_sentences() {
        let context = find_relevant_context("zebra?", DOCUMENT);
        assert!(context.starts_with("Rust was first released"));
        assert!(context.ends_with("extensive book for newcomers to read"));
    }

    #[test]
    fn short_supplied_context_is_used_whole() {
        let selection = select_context("What did the cat do?", " The cat sat on the mat. ");
        assert_eq!(
            selection,
            ContextSelection::Whole("The cat sat on the mat.".into())
        );
        assert_eq!(selection.usable().as_deref(), Some("The cat sat on the mat."));
        assert!(select_context("Anything?", "   ").usable().is_none());
    }

    #[test]
    fn filtered_context_below_minimum_is_unusable() {
        let text = "Unrelated short bit. Another tiny one. \
                    Our office cat sat on a mat today. Yes. No. Maybe so.";
        let selection = select_context("Where did the office cat sit?", text);
        assert_eq!(
            selection,
            ContextSelection::Selected("Our office cat sat on a mat today".into())
        );
        assert!(selection.usable().is_none());
    }

    #[test]
    fn answer_expands_to_containing_sentence() {
        assert_eq!(
            expand_answer("sat on the mat", "The cat sat on the mat. It was happy."),
            "The cat sat on the mat."
        );
        assert_eq!(expand_answer("dog", "The cat sat."), "dog");
    }

    #[test]
    fn confidence_tiers() {
        assert!(explain_confidence(0.85).starts_with("High confidence"));
        assert!(explain_confidence(0.5).starts_with("Medium confidence"));
        assert!(explain_confidence(0.2).starts_with("Low confidence"));
        assert!(explain_confidence(0.05).starts_with("Very low confidence"));
    }
}
