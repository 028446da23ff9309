use crate::analysis::OutcomeStatus;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Thread-safe counters describing analysis activity.
pub struct AnalysisMetrics {
    started_at: OffsetDateTime,
    documents_processed: AtomicU64,
    questions_answered: AtomicU64,
    sentiment_requests: AtomicU64,
    degraded_results: AtomicU64,
    failed_results: AtomicU64,
}

impl Default for AnalysisMetrics {
    fn default() -> Self {
        Self {
            started_at: OffsetDateTime::now_utc(),
            documents_processed: AtomicU64::new(0),
            questions_answered: AtomicU64::new(0),
            sentiment_requests: AtomicU64::new(0),
            degraded_results: AtomicU64::new(0),
            failed_results: AtomicU64::new(0),
        }
    }
}

impl AnalysisMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a processed upload.
    pub fn record_document(&self) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a question request.
    pub fn record_question(&self) {
        self.questions_answered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a sentiment request.
    pub fn record_sentiment(&self) {
        self.sentiment_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a non-successful analysis outcome.
    pub fn record_outcome(&self, status: OutcomeStatus) {
        match status {
            OutcomeStatus::Ok => {}
            OutcomeStatus::Degraded => {
                self.degraded_results.fetch_add(1, Ordering::Relaxed);
            }
            OutcomeStatus::Failed => {
                self.failed_results.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            started_at: self.started_at.format(&Rfc3339).unwrap_or_default(),
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            sentiment_requests: self.sentiment_requests.load(Ordering::Relaxed),
            degraded_results: self.degraded_results.load(Ordering::Relaxed),
            failed_results: self.failed_results.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of analysis counters used for reporting.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    /// Process start time, RFC 3339.
    pub started_at: String,
    /// Uploads that produced an analysis.
    pub documents_processed: u64,
    /// Questions received by `/ask`.
    pub questions_answered: u64,
    /// Requests received by `/analyze`.
    pub sentiment_requests: u64,
    /// Outcomes that fell back to a heuristic or placeholder value.
    pub degraded_results: u64,
    /// Outcomes where the model call failed outright.
    pub failed_results: u64,
}
