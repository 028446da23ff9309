//! Keyword-driven question suggestions.

use super::text::words;

const SCAN_WORDS: usize = 500;
const MAX_SUGGESTIONS: usize = 3;

const KEYWORD_QUESTIONS: &[(&[&str], &str)] = &[
    (
        &["benefit", "advantage", "positive"],
        "What are the benefits mentioned?",
    ),
    (
        &["challenge", "problem", "issue", "difficult"],
        "What challenges are discussed?",
    ),
    (
        &["use", "application", "example"],
        "What are the practical applications?",
    ),
    (
        &["career", "job", "salary"],
        "What career opportunities are mentioned?",
    ),
];

const GENERIC_QUESTIONS: [&str; 3] = [
    "What is this document about?",
    "What is the main topic?",
    "What are the key points?",
];

/// Canned follow-up questions matching keywords found near the start of the document.
pub fn suggest_questions(text: &str) -> Vec<String> {
    let opening = words(text)
        .into_iter()
        .take(SCAN_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut suggestions: Vec<String> = KEYWORD_QUESTIONS
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|keyword| opening.contains(keyword)))
        .map(|(_, question)| (*question).to_string())
        .collect();

    if suggestions.is_empty() {
        suggestions = GENERIC_QUESTIONS.iter().map(|q| (*q).to_string()).collect();
    }
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_keyword_groups_in_order() {
        let questions =
            suggest_questions("The main ADVANTAGE is speed, but one problem remains for jobs.");
        assert_eq!(
            questions,
            vec![
                "What are the benefits mentioned?",
                "What challenges are discussed?",
                "What career opportunities are mentioned?",
            ]
        );
    }

    #[test]
    fn caps_at_three_suggestions() {
        let questions = suggest_questions(
            "benefit challenge application salary",
        );
        assert_eq!(questions.len(), 3);
        assert!(!questions.contains(&"What career opportunities are mentioned?".to_string()));
    }

    #[test]
    fn only_scans_the_first_five_hundred_words() {
        let mut text = vec!["filler"; 500].join(" ");
        text.push_str(" salary");
        assert_eq!(suggest_questions(&text), GENERIC_QUESTIONS.to_vec());
    }

    #[test]
    fn falls_back_to_generic_questions() {
        assert_eq!(
            suggest_questions("The cat sat on the mat."),
            GENERIC_QUESTIONS.to_vec()
        );
    }
}
