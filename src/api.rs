//! HTTP surface for docinsight.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /upload` – Multipart upload (field `file`) of a PDF, image, Word, or text document.
//!   Stores the file, extracts its text, and returns the text with a summary, key points, and
//!   suggested questions.
//! - `POST /ask` – Answer `question` from `context` (typically the `full_text` of an upload).
//! - `POST /analyze` – Sentiment of `text`.
//! - `GET /metrics` – Request and outcome counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Errors are returned as `{"error": "<message>"}` with a 4xx/5xx status. Analysis fallbacks are
//! not errors: `/ask` and `/analyze` always answer 200 and report `status` as `ok`, `degraded`,
//! or `failed`.

use crate::analysis::{Answer, OutcomeStatus, Sentiment};
use crate::extraction::DocumentKind;
use crate::metrics::MetricsSnapshot;
use crate::service::{DocumentApi, ServiceError, UploadReport};
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const UPLOAD_FIELD: &str = "file";

/// Build the HTTP router; request bodies above `max_body_bytes` are rejected with 413.
pub fn create_router<S>(service: Arc<S>, max_body_bytes: usize) -> Router
where
    S: DocumentApi + 'static,
{
    Router::new()
        .route("/upload", post(upload_document::<S>))
        .route("/ask", post(ask_question::<S>))
        .route("/analyze", post(analyze_sentiment::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(service)
}

/// Success response for `POST /upload`.
#[derive(Serialize)]
struct UploadResponse {
    success: bool,
    #[serde(flatten)]
    report: UploadReport,
}

/// Store, extract, and analyze an uploaded document.
async fn upload_document<S>(
    State(service): State<Arc<S>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError>
where
    S: DocumentApi,
{
    let mut multipart = multipart.map_err(|_| ApiError::bad_request("No file part"))?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) = upload.ok_or_else(|| ApiError::bad_request("No file part"))?;
    if filename.is_empty() {
        return Err(ApiError::bad_request("No selected file"));
    }
    if DocumentKind::from_filename(&filename).is_err() {
        return Err(ApiError::bad_request("Invalid file type"));
    }

    let report = service.process_upload(&filename, bytes.to_vec()).await?;
    Ok(Json(UploadResponse {
        success: true,
        report,
    }))
}

/// Request body for `POST /ask`.
#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    context: Option<String>,
}

/// Response body for `POST /ask`.
#[derive(Serialize)]
struct AskResponse {
    success: bool,
    status: OutcomeStatus,
    #[serde(flatten)]
    answer: Answer,
}

/// Answer a question about supplied document text.
async fn ask_question<S>(
    State(service): State<Arc<S>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError>
where
    S: DocumentApi,
{
    const MESSAGE: &str = "Question and context required";
    let Json(request) = payload.map_err(|rejection| json_error(rejection, MESSAGE))?;
    let (Some(question), Some(context)) = (non_empty(request.question), non_empty(request.context))
    else {
        return Err(ApiError::bad_request(MESSAGE));
    };

    let outcome = service.answer_question(&question, &context).await;
    let status = outcome.status();
    if let Some(reason) = outcome.reason() {
        tracing::warn!(?status, reason, "Question answered with fallback");
    }
    let answer = outcome.resolve(Answer::error);
    tracing::info!(?status, confidence = answer.confidence, "Ask request completed");
    Ok(Json(AskResponse {
        success: true,
        status,
        answer,
    }))
}

/// Request body for `POST /analyze`.
#[derive(Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    text: Option<String>,
}

/// Response body for `POST /analyze`.
#[derive(Serialize)]
struct AnalyzeResponse {
    success: bool,
    status: OutcomeStatus,
    sentiment: Sentiment,
}

/// Classify the sentiment of supplied text.
async fn analyze_sentiment<S>(
    State(service): State<Arc<S>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError>
where
    S: DocumentApi,
{
    const MESSAGE: &str = "Text required";
    let Json(request) = payload.map_err(|rejection| json_error(rejection, MESSAGE))?;
    let Some(text) = non_empty(request.text) else {
        return Err(ApiError::bad_request(MESSAGE));
    };

    let outcome = service.analyze_sentiment(&text).await;
    let status = outcome.status();
    if let Some(reason) = outcome.reason() {
        tracing::warn!(?status, reason, "Sentiment produced with fallback");
    }
    let sentiment = outcome.resolve(|_| Sentiment::error());
    tracing::info!(?status, label = %sentiment.label, "Analyze request completed");
    Ok(Json(AnalyzeResponse {
        success: true,
        status,
        sentiment,
    }))
}

/// Return the current request and outcome counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: DocumentApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "upload",
                method: "POST",
                path: "/upload",
                description: "Multipart upload (field \"file\") of a pdf, png, jpg, jpeg, docx, or txt document. Returns the extracted text with summary, key_points, suggested_questions, and word_count.",
                request_example: None,
            },
            CommandDescriptor {
                name: "ask",
                method: "POST",
                path: "/ask",
                description: "Answer a question from document text. Returns answer, confidence, explanation, and context_used.",
                request_example: Some(json!({
                    "question": "What did the cat do?",
                    "context": "The cat sat on the mat."
                })),
            },
            CommandDescriptor {
                name: "analyze",
                method: "POST",
                path: "/analyze",
                description: "Classify the overall sentiment of document text. Returns sentiment { label, score, description }.",
                request_example: Some(json!({ "text": "Document contents" })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return request and outcome counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn json_error(rejection: JsonRejection, message: &'static str) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge;
    }
    tracing::debug!(error = %rejection.body_text(), "Rejected JSON body");
    ApiError::bad_request(message)
}

fn multipart_error(error: MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge;
    }
    tracing::debug!(error = %error.body_text(), "Rejected multipart body");
    ApiError::bad_request("No file part")
}

enum ApiError {
    BadRequest(String),
    PayloadTooLarge,
    Internal(String),
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "File exceeds the maximum upload size".to_string(),
            ),
            Self::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::UnsupportedFormat(_) => Self::bad_request("Invalid file type"),
            ServiceError::InsufficientText => {
                Self::bad_request("Could not extract text from document")
            }
            other => {
                tracing::error!(error = %other, "Document processing failed");
                Self::Internal(format!("Error processing document: {other}"))
            }
        }
    }
}
