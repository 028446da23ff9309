use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use docinsight::{api, config::Config, service::DocumentService};
use httpmock::{Method::POST, MockServer};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "docinsight-integration";
const CAT_TEXT: &str = "The cat sat on the mat. It was happy.";

struct Harness {
    server: MockServer,
    uploads: TempDir,
    app: Router,
}

impl Harness {
    async fn new() -> Self {
        let server = MockServer::start_async().await;
        let uploads = tempfile::tempdir().expect("upload dir");
        let config = Config {
            upload_folder: uploads.path().to_path_buf(),
            hf_api_url: server.base_url(),
            upload_retention_secs: 0,
            ..Config::default()
        };
        let service = DocumentService::from_config(&config).expect("service");
        let app = api::create_router(Arc::new(service), config.max_file_size);
        Self {
            server,
            uploads,
            app,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }
}

fn upload(filename: &str, body: &[u8]) -> Request<Body> {
    let mut payload = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    payload.extend_from_slice(body);
    payload.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(payload))
        .expect("request")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn short_text_upload_is_counted_and_not_summarized() {
    let harness = Harness::new().await;
    let summarizer = harness
        .server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/models/sshleifer/distilbart-cnn-12-6");
            then.status(200)
                .json_body(json!([{ "summary_text": "unexpected" }]));
        })
        .await;

    let (status, body) = harness.send(upload("cat notes.txt", CAT_TEXT.as_bytes())).await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "cat_notes.txt");
    assert_eq!(body["word_count"], 9);
    assert_eq!(body["summary"], "Text too short to summarize effectively.");
    assert_eq!(body["text"], CAT_TEXT);
    assert_eq!(body["full_text"], CAT_TEXT);
    assert_eq!(body["key_points"], json!(["The cat sat on the mat."]));
    assert_eq!(body["suggested_questions"].as_array().map(Vec::len), Some(3));

    let stored_as = body["stored_as"].as_str().expect("stored name");
    assert!(stored_as.ends_with("-cat_notes.txt"));
    assert!(harness.uploads.path().join(stored_as).exists());
    summarizer.assert_hits(0);
}

#[tokio::test]
async fn long_upload_is_summarized_by_the_model() {
    let harness = Harness::new().await;
    let summarizer = harness
        .server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/models/sshleifer/distilbart-cnn-12-6")
                .body_contains("\"max_length\":150");
            then.status(200)
                .json_body(json!([{ "summary_text": " The report praises the new process. " }]));
        })
        .await;

    let text = "The new process delivers clear benefits for every team involved. ".repeat(60);
    let (status, body) = harness.send(upload("report.txt", text.as_bytes())).await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["summary"], "The report praises the new process.");
    assert_eq!(body["word_count"], 600);
    assert!(body["text"].as_str().expect("preview").ends_with("..."));
    assert_eq!(body["suggested_questions"][0], "What are the benefits mentioned?");
    assert!(body.get("warnings").is_none());
    summarizer.assert();
}

#[tokio::test]
async fn asking_about_the_cat_returns_the_sentence() {
    let harness = Harness::new().await;
    let qa = harness
        .server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/models/distilbert-base-cased-distilled-squad")
                .body_contains("What did the cat do?");
            then.status(200).json_body(json!({
                "answer": "sat on the mat",
                "score": 0.91,
                "start": 8,
                "end": 22
            }));
        })
        .await;

    let (status, body) = harness
        .send(post_json(
            "/ask",
            json!({ "question": "What did the cat do?", "context": "The cat sat on the mat." }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["status"], "ok");
    let answer = body["answer"].as_str().expect("answer");
    assert!(answer.contains("sat"), "answer: {answer}");
    assert!(body["confidence"].as_f64().expect("confidence") > 0.0);
    assert!(
        body["explanation"]
            .as_str()
            .expect("explanation")
            .starts_with("High confidence")
    );
    qa.assert();
}

#[tokio::test]
async fn qa_backend_failure_is_reported_in_the_payload() {
    let harness = Harness::new().await;
    harness
        .server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/models/distilbert-base-cased-distilled-squad");
            then.status(503).body("model loading");
        })
        .await;

    let (status, body) = harness
        .send(post_json(
            "/ask",
            json!({ "question": "What did the cat do?", "context": "The cat sat on the mat." }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["confidence"], 0.0);
    assert!(
        body["answer"]
            .as_str()
            .expect("answer")
            .starts_with("Error processing question:")
    );
}

#[tokio::test]
async fn sentiment_uses_the_classifier() {
    let harness = Harness::new().await;
    let classifier = harness
        .server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/models/distilbert-base-uncased-finetuned-sst-2-english");
            then.status(200).json_body(json!([[
                { "label": "POSITIVE", "score": 0.97 },
                { "label": "NEGATIVE", "score": 0.03 }
            ]]));
        })
        .await;

    let (status, body) = harness
        .send(post_json(
            "/analyze",
            json!({ "text": "The launch went wonderfully and the whole team is delighted with it." }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sentiment"]["label"], "POSITIVE");
    assert_eq!(body["sentiment"]["description"], "Very positive/optimistic tone");
    classifier.assert_hits(1);
}

#[tokio::test]
async fn short_sentiment_text_is_neutral_without_model_calls() {
    let harness = Harness::new().await;
    let classifier = harness
        .server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/models/distilbert-base-uncased-finetuned-sst-2-english");
            then.status(200).json_body(json!([{ "label": "NEGATIVE", "score": 0.9 }]));
        })
        .await;

    let (_, body) = harness
        .send(post_json("/analyze", json!({ "text": "Too short." })))
        .await;

    assert_eq!(body["status"], "degraded");
    assert_eq!(body["sentiment"]["label"], "NEUTRAL");
    assert_eq!(body["sentiment"]["score"], 0.5);
    classifier.assert_hits(0);
}

#[tokio::test]
async fn rejected_requests_use_json_errors() {
    let harness = Harness::new().await;

    let (status, body) = harness.send(upload("tiny.txt", b"  ok  ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Could not extract text from document");

    let (status, body) = harness.send(upload("archive.zip", b"PK")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid file type");

    let (status, body) = harness.send(upload("latin1.txt", &[0xff, 0xfe, 0x41])).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error"]
            .as_str()
            .expect("error")
            .starts_with("Error processing document:")
    );

    let (status, body) = harness.send(post_json("/ask", json!({ "context": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Question and context required");

    let (status, body) = harness.send(post_json("/analyze", json!({ "text": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Text required");
}

#[tokio::test]
async fn metrics_track_requests_and_fallbacks() {
    let harness = Harness::new().await;
    harness.send(upload("cat.txt", CAT_TEXT.as_bytes())).await;
    harness
        .send(post_json("/analyze", json!({ "text": "Too short." })))
        .await;

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .expect("request");
    let (status, body) = harness.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documents_processed"], 1);
    assert_eq!(body["sentiment_requests"], 1);
    assert_eq!(body["questions_answered"], 0);
    // too-short summary and neutral sentiment
    assert_eq!(body["degraded_results"], 2);
}
