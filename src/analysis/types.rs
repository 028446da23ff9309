//! Result records and the outcome wrapper returned by every analysis operation.

use serde::Serialize;

/// Coarse status reported alongside every analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// The model produced the result.
    Ok,
    /// A fallback or placeholder result was produced.
    Degraded,
    /// The operation could not produce a result.
    Failed,
}

/// Result of an analysis operation.
///
/// `Degraded` carries a usable value built by a fallback heuristic together with the reason the
/// primary path was not taken; `Failed` carries only the reason.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome<T> {
    /// Primary path succeeded.
    Success(T),
    /// Fallback value produced instead of a model result.
    Degraded {
        /// Placeholder or heuristic value.
        value: T,
        /// Why the primary path was skipped or failed.
        reason: String,
    },
    /// No value could be produced.
    Failed {
        /// Why the operation failed.
        reason: String,
    },
}

impl<T> AnalysisOutcome<T> {
    /// Status label for this outcome.
    pub fn status(&self) -> OutcomeStatus {
        match self {
            Self::Success(_) => OutcomeStatus::Ok,
            Self::Degraded { .. } => OutcomeStatus::Degraded,
            Self::Failed { .. } => OutcomeStatus::Failed,
        }
    }

    /// Borrow the carried value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) | Self::Degraded { value, .. } => Some(value),
            Self::Failed { .. } => None,
        }
    }

    /// Degradation or failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Degraded { reason, .. } | Self::Failed { reason } => Some(reason),
        }
    }

    /// Take the carried value, building one from the failure reason when there is none.
    pub fn resolve(self, on_failure: impl FnOnce(&str) -> T) -> T {
        match self {
            Self::Success(value) | Self::Degraded { value, .. } => value,
            Self::Failed { reason } => on_failure(&reason),
        }
    }
}

/// Document-level sentiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentiment {
    /// Majority label across analyzed chunks (`POSITIVE`, `NEGATIVE`, `NEUTRAL`, `ERROR`).
    pub label: String,
    /// Mean chunk confidence.
    pub score: f64,
    /// Human-readable tone description.
    pub description: String,
}

impl Sentiment {
    /// Placeholder for documents without any analyzable chunk.
    pub fn neutral() -> Self {
        Self {
            label: "NEUTRAL".into(),
            score: 0.5,
            description: "Document too short to analyze".into(),
        }
    }

    /// Error-labeled record rendered when every chunk failed.
    pub fn error() -> Self {
        Self {
            label: "ERROR".into(),
            score: 0.0,
            description: "Could not analyze sentiment".into(),
        }
    }
}

/// Answer to a question about a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    /// Answer text, expanded to its containing sentence when possible.
    pub answer: String,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    /// Confidence tier explanation.
    pub explanation: String,
    /// Preview of the context handed to the model.
    pub context_used: String,
}

impl Answer {
    /// Record rendered when the question-answering call failed.
    pub fn error(reason: &str) -> Self {
        Self {
            answer: format!("Error processing question: {reason}"),
            confidence: 0.0,
            explanation: "An error occurred while processing your question.".into(),
            context_used: String::new(),
        }
    }
}
