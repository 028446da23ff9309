//! Document service coordinating storage, extraction, and analysis.

use crate::{
    analysis::{AnalysisOutcome, Analyzer, Answer, Sentiment, text},
    config::Config,
    extraction::{DocumentExtractor, DocumentKind, ExtractionError},
    metrics::{AnalysisMetrics, MetricsSnapshot},
    models::{ModelError, build_models},
    uploads::UploadStore,
};
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

const MIN_TEXT_CHARS: usize = 10;
const PREVIEW_CHARS: usize = 1000;

/// Errors raised while processing a document.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The file extension is outside the allow-list.
    #[error("Invalid file type: {0}")]
    UnsupportedFormat(String),
    /// Extraction produced (almost) no text.
    #[error("Could not extract text from document")]
    InsufficientText,
    /// The extractor failed.
    #[error(transparent)]
    Extraction(ExtractionError),
    /// The upload could not be written.
    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),
    /// The blocking extraction task did not complete.
    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<ExtractionError> for ServiceError {
    fn from(error: ExtractionError) -> Self {
        match error {
            ExtractionError::UnsupportedFormat(extension) => Self::UnsupportedFormat(extension),
            other => Self::Extraction(other),
        }
    }
}

/// Extracted text together with its analysis.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// First 1000 characters of the text, with `...` when truncated.
    pub text: String,
    /// Complete extracted text.
    pub full_text: String,
    /// Abstractive or fallback summary.
    pub summary: String,
    /// Representative sentences.
    pub key_points: Vec<String>,
    /// Follow-up questions a reader might ask.
    pub suggested_questions: Vec<String>,
    /// Whitespace-separated word count of the full text.
    pub word_count: usize,
    /// Why any part of the analysis fell back to a heuristic.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Report for an uploaded file.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    /// Sanitized client file name.
    pub filename: String,
    /// Name of the stored copy in the upload directory.
    pub stored_as: String,
    /// Extraction and analysis results.
    #[serde(flatten)]
    pub document: DocumentReport,
}

/// Operations exposed to the HTTP layer.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Store an upload, extract its text, and analyze it.
    async fn process_upload(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadReport, ServiceError>;

    /// Answer a question about previously extracted text.
    async fn answer_question(&self, question: &str, context: &str) -> AnalysisOutcome<Answer>;

    /// Sentiment of previously extracted text.
    async fn analyze_sentiment(&self, text: &str) -> AnalysisOutcome<Sentiment>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Owns the extractor, analyzer, upload store, and metrics.
///
/// Construct once near process start and share it through an `Arc`.
pub struct DocumentService {
    extractor: DocumentExtractor,
    analyzer: Analyzer,
    uploads: UploadStore,
    metrics: Arc<AnalysisMetrics>,
}

impl DocumentService {
    /// Assemble a service from its parts.
    pub fn new(extractor: DocumentExtractor, analyzer: Analyzer, uploads: UploadStore) -> Self {
        Self {
            extractor,
            analyzer,
            uploads,
            metrics: Arc::new(AnalysisMetrics::new()),
        }
    }

    /// Build the configured model backends, OCR engine, and upload store.
    pub fn from_config(config: &Config) -> Result<Self, ModelError> {
        let models = build_models(config)?;
        Ok(Self::new(
            DocumentExtractor::from_config(&config.ocr),
            Analyzer::new(models),
            UploadStore::new(&config.upload_folder, config.upload_retention_secs),
        ))
    }

    /// Upload store backing this service.
    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    /// Extract and analyze a document already on disk.
    pub async fn analyze_file(&self, path: PathBuf) -> Result<DocumentReport, ServiceError> {
        let extractor = self.extractor.clone();
        let full_text = tokio::task::spawn_blocking(move || extractor.extract(&path)).await??;
        if text::char_len(full_text.trim()) < MIN_TEXT_CHARS {
            return Err(ServiceError::InsufficientText);
        }

        let summary = self.analyzer.summarize(&full_text).await;
        let key_points = self.analyzer.extract_key_points(&full_text);
        let suggested_questions = self.analyzer.suggested_questions(&full_text);

        let mut warnings = Vec::new();
        self.metrics.record_outcome(summary.status());
        if let Some(reason) = summary.reason() {
            warnings.push(format!("summary: {reason}"));
        }
        self.metrics.record_outcome(key_points.status());
        if let Some(reason) = key_points.reason() {
            warnings.push(format!("key points: {reason}"));
        }

        Ok(DocumentReport {
            text: text::preview(&full_text, PREVIEW_CHARS),
            word_count: text::word_count(&full_text),
            summary: summary.resolve(str::to_string),
            key_points: key_points.resolve(|reason| vec![reason.to_string()]),
            suggested_questions,
            warnings,
            full_text,
        })
    }
}

#[async_trait]
impl DocumentApi for DocumentService {
    async fn process_upload(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadReport, ServiceError> {
        DocumentKind::from_filename(filename)?;
        let stored = self.uploads.save(filename, &bytes).await?;
        tracing::info!(
            filename = %stored.filename,
            stored_as = %stored.stored_as,
            bytes = bytes.len(),
            "Processing upload"
        );

        let document = self.analyze_file(stored.path).await?;
        self.metrics.record_document();
        tracing::info!(
            stored_as = %stored.stored_as,
            words = document.word_count,
            warnings = document.warnings.len(),
            "Upload processed"
        );
        Ok(UploadReport {
            filename: stored.filename,
            stored_as: stored.stored_as,
            document,
        })
    }

    async fn answer_question(&self, question: &str, context: &str) -> AnalysisOutcome<Answer> {
        self.metrics.record_question();
        let outcome = self.analyzer.answer_question(question, context).await;
        self.metrics.record_outcome(outcome.status());
        outcome
    }

    async fn analyze_sentiment(&self, text: &str) -> AnalysisOutcome<Sentiment> {
        self.metrics.record_sentiment();
        let outcome = self.analyzer.analyze_sentiment(text).await;
        self.metrics.record_outcome(outcome.status());
        outcome
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
