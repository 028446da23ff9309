//! Abstractions over the pretrained pipelines used by the analyzer.
//!
//! Three model kinds are consumed as black boxes: abstractive summarization, extractive
//! question answering, and binary sentiment classification. Each is an async trait so the
//! analyzer can be wired to the Hugging Face inference API, a local Ollama runtime, or a test
//! double without changing any heuristics.

mod huggingface;
mod ollama;

pub use huggingface::HuggingFaceClient;
pub use ollama::OllamaClient;

use crate::config::{Config, ModelProvider};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced while invoking a model backend.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Provider was unreachable or the endpoint does not exist.
    #[error("Model provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Model inference failed: {0}")]
    InferenceFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed model response: {0}")]
    InvalidResponse(String),
}

/// Input for an abstractive summarization call.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    /// Text to condense; already windowed and word-capped by the analyzer.
    pub text: String,
    /// Upper bound on generated summary tokens.
    pub max_length: usize,
    /// Lower bound on generated summary tokens.
    pub min_length: usize,
}

/// Answer span returned by an extractive QA model.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSpan {
    /// Raw answer text as reported by the model.
    pub answer: String,
    /// Model confidence in `[0, 1]`.
    pub score: f64,
}

/// Label and confidence produced by a sentiment classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Upper-case label such as `POSITIVE` or `NEGATIVE`.
    pub label: String,
    /// Model confidence in `[0, 1]`.
    pub score: f64,
}

/// Abstractive summarization model.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Generate a summary of the supplied text.
    async fn summarize(&self, request: SummaryRequest) -> Result<String, ModelError>;
}

/// Extractive question-answering model.
#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    /// Locate the answer to `question` inside `context`.
    async fn answer(&self, question: &str, context: &str) -> Result<AnswerSpan, ModelError>;
}

/// Sentiment classification model.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify a single chunk of text.
    async fn classify(&self, text: &str) -> Result<Classification, ModelError>;
}

/// The three model handles the analyzer needs, loaded once and shared read-only.
#[derive(Clone)]
pub struct ModelSet {
    /// Summarization pipeline.
    pub summarizer: Arc<dyn Summarizer>,
    /// Question-answering pipeline.
    pub question_answerer: Arc<dyn QuestionAnswerer>,
    /// Sentiment pipeline.
    pub sentiment: Arc<dyn SentimentClassifier>,
}

impl ModelSet {
    /// Use a single backend implementing every model kind.
    pub fn uniform<M>(backend: M) -> Self
    where
        M: Summarizer + QuestionAnswerer + SentimentClassifier + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            summarizer: backend.clone(),
            question_answerer: backend.clone(),
            sentiment: backend,
        }
    }
}

/// Build the model set selected by configuration.
pub fn build_models(config: &Config) -> Result<ModelSet, ModelError> {
    match config.model_provider {
        ModelProvider::HuggingFace => {
            tracing::info!(
                base_url = %config.hf_api_url,
                summarization = %config.summarization_model,
                qa = %config.qa_model,
                sentiment = %config.sentiment_model,
                "Using Hugging Face inference models"
            );
            Ok(ModelSet::uniform(HuggingFaceClient::from_config(config)?))
        }
        ModelProvider::Ollama => {
            tracing::info!(
                base_url = %config.ollama_url,
                model = %config.ollama_model,
                "Using Ollama models"
            );
            Ok(ModelSet::uniform(OllamaClient::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
            )?))
        }
    }
}

pub(crate) fn http_client(user_agent: &str) -> Result<reqwest::Client, ModelError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|error| {
            ModelError::ProviderUnavailable(format!("failed to construct HTTP client: {error}"))
        })
}
