//! Route-level tests over a stubbed pipeline.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use async_trait::async_trait;
use server_core::{build_app, AppState, ReplySink, VerifyService};
use verification::orchestrator::{ProgressSink, ProgressStage};
use verification::{LocatorError, PipelineError, PipelineResult, SourceType, VerifiedSource};

#[derive(Clone, Copy)]
enum Outcome {
    Success,
    EmptyInput,
    NoSources,
    NoProvider,
    Upstream,
}

struct StubVerifier {
    outcome: Outcome,
}

impl StubVerifier {
    fn result(&self) -> Result<PipelineResult, PipelineError> {
        match self.outcome {
            Outcome::Success => Ok(PipelineResult {
                query: "the claim".into(),
                sources: vec![VerifiedSource {
                    title: "Statement".into(),
                    url: "https://example.gov/a".into(),
                    text: "body text".into(),
                    source_type: SourceType::Official,
                    confidence: Some(85),
                    explanation: Some("corroborates".into()),
                }],
                ai_summary: Some("confirmed".into()),
            }),
            Outcome::EmptyInput => Err(PipelineError::EmptyInput),
            Outcome::NoSources => Err(PipelineError::NoSourcesFound),
            Outcome::NoProvider => Err(LocatorError::NoProviderConfigured.into()),
            Outcome::Upstream => Err(PipelineError::Search(LocatorError::Provider {
                provider: "google",
                status: Some(429),
                message: "quota exceeded".into(),
            })),
        }
    }
}

#[async_trait]
impl VerifyService for StubVerifier {
    async fn verify(&self, _input: &str) -> Result<PipelineResult, PipelineError> {
        self.result()
    }

    async fn verify_with_progress(
        &self,
        _input: &str,
        progress: &dyn ProgressSink,
    ) -> Result<PipelineResult, PipelineError> {
        progress.notify(ProgressStage::Searching).await;
        self.result()
    }
}

#[derive(Default)]
struct RecordingReply {
    messages: Mutex<Vec<(i64, String)>>,
    notify: tokio::sync::Notify,
}

impl RecordingReply {
    fn messages(&self) -> Vec<(i64, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySink for RecordingReply {
    async fn deliver(&self, chat_id: i64, text: &str) {
        self.messages.lock().unwrap().push((chat_id, text.to_string()));
        self.notify.notify_waiters();
    }
}

fn app_with(outcome: Outcome) -> (Router, Arc<RecordingReply>) {
    let reply = Arc::new(RecordingReply::default());
    let state = AppState {
        verifier: Arc::new(StubVerifier { outcome }),
        reply: reply.clone(),
    };
    (build_app(state), reply)
}

async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn test_health_reports_backend_configuration() {
    let (app, _) = app_with(Outcome::Success);
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    // The flags reflect whatever the test environment has set; shape only.
    assert!(body["searchConfigured"].is_boolean());
    assert!(body["modelConfigured"].is_boolean());
}

#[tokio::test]
async fn test_verify_returns_result_shape() {
    let (app, _) = app_with(Outcome::Success);
    let (status, body) = post_json(app, "/api/verify", r#"{"text":"the claim"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "the claim");
    assert_eq!(body["sources"][0]["sourceType"], "official");
    assert_eq!(body["sources"][0]["confidence"], 85);
    assert_eq!(body["aiSummary"], "confirmed");
}

#[tokio::test]
async fn test_verify_error_statuses() {
    for (outcome, expected) in [
        (Outcome::EmptyInput, StatusCode::BAD_REQUEST),
        (Outcome::NoSources, StatusCode::NOT_FOUND),
        (Outcome::NoProvider, StatusCode::SERVICE_UNAVAILABLE),
        (Outcome::Upstream, StatusCode::BAD_GATEWAY),
    ] {
        let (app, _) = app_with(outcome);
        let (status, body) = post_json(app, "/api/verify", r#"{"text":"x"}"#).await;
        assert_eq!(status, expected);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_verify_missing_provider_includes_remediation() {
    let (app, _) = app_with(Outcome::NoProvider);
    let (_, body) = post_json(app, "/api/verify", r#"{"text":"x"}"#).await;
    assert!(body["remediation"]
        .as_str()
        .unwrap()
        .contains("GOOGLE_SEARCH_API_KEY"));
}

#[tokio::test]
async fn test_verify_quota_failure_includes_remediation() {
    let (app, _) = app_with(Outcome::Upstream);
    let (_, body) = post_json(app, "/api/verify", r#"{"text":"x"}"#).await;
    assert!(body["remediation"].as_str().unwrap().contains("quota"));
}

async fn wait_for_messages(reply: &RecordingReply, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            // Register interest before checking, so a delivery between the
            // check and the await cannot be missed.
            let notified = reply.notify.notified();
            if reply.messages().len() >= count {
                break;
            }
            notified.await;
        }
    })
    .await
    .expect("background delivery timed out");
}

#[tokio::test]
async fn test_webhook_acks_and_delivers_in_background() {
    let (app, reply) = app_with(Outcome::Success);
    let (status, body) = post_json(app, "/webhook", r#"{"chat_id":7,"text":"the claim"}"#).await;

    // Immediate ack, regardless of how long the pipeline takes.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    // Progress message then the formatted result, on the same chat.
    wait_for_messages(&reply, 2).await;
    let messages = reply.messages();
    assert!(messages.iter().all(|(chat_id, _)| *chat_id == 7));
    assert_eq!(messages[0].1, ProgressStage::Searching.message());
    assert!(messages[1].1.contains("Found sources"));
    assert!(messages[1].1.contains("✅ Confidence: 85%"));
}

#[tokio::test]
async fn test_webhook_failure_still_acks_and_reports() {
    let (app, reply) = app_with(Outcome::NoSources);
    let (status, body) = post_json(app, "/webhook", r#"{"chat_id":3,"text":"x"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    wait_for_messages(&reply, 2).await;
    let messages = reply.messages();
    assert!(messages.last().unwrap().1.contains("No sources found"));
}
