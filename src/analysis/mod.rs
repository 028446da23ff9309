//! Text analysis: summaries, key points, suggested questions, sentiment, and question answering.

mod analyzer;
pub mod key_points;
pub mod qa;
pub mod questions;
pub mod sentiment;
pub mod summary;
pub mod text;
pub mod types;

pub use analyzer::Analyzer;
pub use types::{AnalysisOutcome, Answer, OutcomeStatus, Sentiment};
