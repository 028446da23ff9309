//! Chunked sentiment aggregation.

use super::text::{char_len, words};
use super::types::Sentiment;
use crate::models::Classification;

pub(crate) const CHUNK_WORDS: usize = 300;
pub(crate) const MAX_CHUNKS: usize = 3;
const MIN_CHUNK_CHARS: usize = 50;

/// Split text into consecutive `chunk_words`-word chunks, dropping chunks of 50 characters or
/// fewer.
pub(crate) fn split_into_chunks(text: &str, chunk_words: usize) -> Vec<String> {
    words(text)
        .chunks(chunk_words.max(1))
        .map(|chunk| chunk.join(" "))
        .filter(|chunk| char_len(chunk.trim()) > MIN_CHUNK_CHARS)
        .collect()
}

/// Combine per-chunk classifications into a document sentiment.
///
/// The label is the most frequent one; on a tie the label seen first wins. The score is the
/// mean of all chunk scores.
pub(crate) fn aggregate(results: &[Classification]) -> Option<Sentiment> {
    if results.is_empty() {
        return None;
    }

    let mut tally: Vec<(&str, usize)> = Vec::new();
    for result in results {
        match tally.iter_mut().find(|(label, _)| *label == result.label) {
            Some((_, count)) => *count += 1,
            None => tally.push((result.label.as_str(), 1)),
        }
    }

    let mut winner = tally[0];
    for entry in &tally[1..] {
        if entry.1 > winner.1 {
            winner = *entry;
        }
    }

    let score = results.iter().map(|result| result.score).sum::<f64>() / results.len() as f64;
    Some(Sentiment {
        label: winner.0.to_string(),
        score,
        description: describe(winner.0, score).to_string(),
    })
}

/// Human-readable tone for a label and averaged score.
pub(crate) fn describe(label: &str, score: f64) -> &'static str {
    if label == "POSITIVE" {
        if score > 0.9 {
            "Very positive/optimistic tone"
        } else if score > 0.7 {
            "Positive/informative tone"
        } else {
            "Somewhat positive tone"
        }
    } else if score > 0.9 {
        "Very negative/critical tone"
    } else if score > 0.7 {
        "Negative/cautionary tone"
    } else {
        "Neutral/formal tone"
    }
}
