//! Ollama-backed pipelines.
//!
//! A single local chat model stands in for all three pretrained pipelines. Summaries are
//! requested as plain text; question answering and sentiment ask for JSON output so the
//! confidence values can be parsed.

use super::{
    AnswerSpan, Classification, ModelError, QuestionAnswerer, SentimentClassifier, Summarizer,
    SummaryRequest, http_client,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

/// HTTP client for a local Ollama runtime.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct JsonAnswer {
    answer: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct JsonSentiment {
    label: String,
    #[serde(default)]
    score: f64,
}

impl OllamaClient {
    /// Build a client for `model` served at `base_url`.
    pub fn new(base_url: String, model: String) -> Result<Self, ModelError> {
        Ok(Self {
            http: http_client("docinsight/ollama")?,
            base_url,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    async fn generate(&self, prompt: String, json_output: bool) -> Result<String, ModelError> {
        let mut payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": 0.1,
            }
        });
        if json_output {
            payload["format"] = Value::String("json".into());
        }

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                ModelError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ModelError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::InferenceFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            ModelError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
        })?;

        if !body.done {
            return Err(ModelError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, ModelError> {
    serde_json::from_str(raw).map_err(|error| {
        ModelError::InvalidResponse(format!("model did not return the expected JSON: {error}"))
    })
}

#[async_trait]
impl Summarizer for OllamaClient {
    async fn summarize(&self, request: SummaryRequest) -> Result<String, ModelError> {
        let prompt = format!(
            "System: You write faithful, neutral summaries. Do not add facts. Return a single \
             paragraph of roughly {}-{} words.\n\nSummarize the following text:\n\n{}",
            request.min_length, request.max_length, request.text
        );
        let summary = self.generate(prompt, false).await?;
        if summary.is_empty() {
            return Err(ModelError::InvalidResponse("empty summary".into()));
        }
        Ok(summary)
    }
}

#[async_trait]
impl QuestionAnswerer for OllamaClient {
    async fn answer(&self, question: &str, context: &str) -> Result<AnswerSpan, ModelError> {
        let prompt = format!(
            "System: Answer using a short span copied verbatim from the context. Respond with \
             JSON {{\"answer\": string, \"confidence\": number between 0 and 1}}.\n\n\
             Context:\n{context}\n\nQuestion: {question}"
        );
        let raw = self.generate(prompt, true).await?;
        let parsed: JsonAnswer = parse_json(&raw)?;
        Ok(AnswerSpan {
            answer: parsed.answer.trim().to_string(),
            score: parsed.confidence.clamp(0.0, 1.0),
        })
    }
}

#[async_trait]
impl SentimentClassifier for OllamaClient {
    async fn classify(&self, text: &str) -> Result<Classification, ModelError> {
        let prompt = format!(
            "System: Classify the overall sentiment of the text as POSITIVE or NEGATIVE. Respond \
             with JSON {{\"label\": \"POSITIVE\" | \"NEGATIVE\", \"score\": number between 0 and \
             1}}.\n\nText:\n{text}"
        );
        let raw = self.generate(prompt, true).await?;
        let parsed: JsonSentiment = parse_json(&raw)?;
        Ok(Classification {
            label: parsed.label.trim().to_uppercase(),
            score: parsed.score.clamp(0.0, 1.0),
        })
    }
}
