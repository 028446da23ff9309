//! Hugging Face inference API adapter.
//!
//! Every task is a `POST {base}/models/{model}` carrying `inputs` and optional `parameters`.
//! The response shape depends on the pipeline; the deserializers below accept the variants the
//! API is known to return (single object or list, flat or nested classification lists).

use super::{
    AnswerSpan, Classification, ModelError, QuestionAnswerer, SentimentClassifier, Summarizer,
    SummaryRequest, http_client,
};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// HTTP client for the hosted Hugging Face inference API.
pub struct HuggingFaceClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    summarization_model: String,
    qa_model: String,
    sentiment_model: String,
}

impl HuggingFaceClient {
    /// Build a client using the model ids and credentials from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ModelError> {
        Ok(Self {
            http: http_client("docinsight/hf")?,
            base_url: config.hf_api_url.clone(),
            token: config.hf_api_token.clone(),
            summarization_model: config.summarization_model.clone(),
            qa_model: config.qa_model.clone(),
            sentiment_model: config.sentiment_model.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url.trim_end_matches('/'), model)
    }

    async fn infer<T: DeserializeOwned>(&self, model: &str, payload: Value) -> Result<T, ModelError> {
        let endpoint = self.endpoint(model);
        let mut request = self.http.post(&endpoint).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|error| {
            ModelError::ProviderUnavailable(format!(
                "failed to reach inference API at {}: {error}",
                self.base_url
            ))
        })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ModelError::ProviderUnavailable(format!(
                "inference endpoint {endpoint} returned 404"
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::InferenceFailed(format!(
                "{model} returned {status}: {body}"
            )));
        }

        response.json().await.map_err(|error| {
            ModelError::InvalidResponse(format!("failed to decode {model} response: {error}"))
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
struct AnswerOutput {
    answer: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationOutput {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationOutput {
    fn best(self) -> Option<LabelScore> {
        let candidates = match self {
            Self::Nested(rows) => rows.into_iter().flatten().collect::<Vec<_>>(),
            Self::Flat(row) => row,
        };
        candidates
            .into_iter()
            .max_by(|left, right| left.score.total_cmp(&right.score))
    }
}

#[async_trait]
impl Summarizer for HuggingFaceClient {
    async fn summarize(&self, request: SummaryRequest) -> Result<String, ModelError> {
        let payload = json!({
            "inputs": request.text,
            "parameters": {
                "max_length": request.max_length,
                "min_length": request.min_length,
                "do_sample": false,
            },
            "options": { "wait_for_model": true },
        });
        let output: OneOrMany<SummaryOutput> =
            self.infer(&self.summarization_model, payload).await?;
        output
            .into_vec()
            .into_iter()
            .next()
            .map(|item| item.summary_text.trim().to_string())
            .ok_or_else(|| ModelError::InvalidResponse("empty summarization response".into()))
    }
}

#[async_trait]
impl QuestionAnswerer for HuggingFaceClient {
    async fn answer(&self, question: &str, context: &str) -> Result<AnswerSpan, ModelError> {
        let payload = json!({
            "inputs": { "question": question, "context": context },
            "options": { "wait_for_model": true },
        });
        let output: OneOrMany<AnswerOutput> = self.infer(&self.qa_model, payload).await?;
        output
            .into_vec()
            .into_iter()
            .max_by(|left, right| left.score.total_cmp(&right.score))
            .map(|item| AnswerSpan {
                answer: item.answer,
                score: item.score.clamp(0.0, 1.0),
            })
            .ok_or_else(|| ModelError::InvalidResponse("empty question-answering response".into()))
    }
}

#[async_trait]
impl SentimentClassifier for HuggingFaceClient {
    async fn classify(&self, text: &str) -> Result<Classification, ModelError> {
        let payload = json!({
            "inputs": text,
            "options": { "wait_for_model": true },
        });
        let output: ClassificationOutput = self.infer(&self.sentiment_model, payload).await?;
        output
            .best()
            .map(|item| Classification {
                label: item.label.to_uppercase(),
                score: item.score.clamp(0.0, 1.0),
            })
            .ok_or_else(|| ModelError::InvalidResponse("empty classification response".into()))
    }
}
