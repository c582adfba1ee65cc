use std::sync::Arc;

use serde_json::{Value, json};
use tokio::net::TcpListener;

use sensei::consts::DEFAULT_BODY_LIMIT;
use sensei::generator::mock::{MockGenerator, Reply};
use sensei::server::{AppState, ErrorBody, Health, router};
use sensei::solver::{PipelineMode, SolveResponse, Solver};

const IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";

/// Serve the real router on an ephemeral port and return its base URL.
async fn spawn(generator: Arc<MockGenerator>, mode: PipelineMode) -> String {
    let solver = Arc::new(Solver::new(generator, mode));
    let app = router(AppState { solver }, DEFAULT_BODY_LIMIT);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn post_json(base: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}/api/solve"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

async fn error_of(resp: reqwest::Response) -> String {
    resp.json::<ErrorBody>().await.unwrap().error
}

#[tokio::test]
async fn image_request_returns_result() {
    let generator = Arc::new(MockGenerator::texts(&["<p>答え</p>"]));
    let base = spawn(generator.clone(), PipelineMode::Direct).await;

    let resp = post_json(&base, json!({"image": IMAGE})).await;
    assert_eq!(resp.status(), 200);
    assert!(
        resp.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );
    let body: SolveResponse = resp.json().await.unwrap();
    assert_eq!(body.result, "<p>答え</p>");
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn follow_up_request_relays_history() {
    let generator = Arc::new(MockGenerator::texts(&["だからです"]));
    let base = spawn(generator.clone(), PipelineMode::TwoStep).await;

    let resp = post_json(
        &base,
        json!({
            "question": "なぜ?",
            "history": [
                {"role": "user", "parts": [{"text": "画像の問題を解いてください。"}]},
                {"role": "model", "parts": [{"text": "<p>前の答え</p>"}]}
            ]
        }),
    )
    .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json::<SolveResponse>().await.unwrap().result, "だからです");

    let sent = &generator.requests()[0];
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[1].text(), "<p>前の答え</p>");
    assert_eq!(sent[2].text(), "なぜ?");
}

#[tokio::test]
async fn get_is_method_not_allowed() {
    let base = spawn(Arc::new(MockGenerator::texts(&[])), PipelineMode::TwoStep).await;

    let resp = reqwest::get(format!("{base}/api/solve")).await.unwrap();
    assert_eq!(resp.status(), 405);
    assert_eq!(error_of(resp).await, "Method Not Allowed");
}

#[tokio::test]
async fn empty_object_is_bad_request() {
    let generator = Arc::new(MockGenerator::texts(&[]));
    let base = spawn(generator.clone(), PipelineMode::TwoStep).await;

    let resp = post_json(&base, json!({})).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(error_of(resp).await, "Image or question is required.");
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let base = spawn(Arc::new(MockGenerator::texts(&[])), PipelineMode::TwoStep).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/solve"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert!(!error_of(resp).await.is_empty());
}

#[tokio::test]
async fn bad_data_url_is_bad_request() {
    let generator = Arc::new(MockGenerator::texts(&[]));
    let base = spawn(generator.clone(), PipelineMode::TwoStep).await;

    let resp = post_json(&base, json!({"image": "hello"})).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn missing_key_is_reported_before_input_checks() {
    let base = spawn(Arc::new(MockGenerator::unconfigured()), PipelineMode::TwoStep).await;

    let resp = post_json(&base, json!({})).await;
    assert_eq!(resp.status(), 500);
    assert_eq!(error_of(resp).await, "API key is not configured.");
}

#[tokio::test]
async fn upstream_failure_is_generic_500() {
    let generator = Arc::new(MockGenerator::new(vec![Reply::Fail(
        "secret upstream detail".to_string(),
    )]));
    let base = spawn(generator, PipelineMode::Direct).await;

    let resp = post_json(&base, json!({"image": IMAGE})).await;
    assert_eq!(resp.status(), 500);
    let message = error_of(resp).await;
    assert_eq!(message, "An internal server error occurred.");
    assert!(!message.contains("secret"));
}

#[tokio::test]
async fn health_reports_model_and_pipeline() {
    let base = spawn(Arc::new(MockGenerator::texts(&[])), PipelineMode::Direct).await;

    let health: Health = reqwest::get(format!("{base}/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.model, "mock");
    assert_eq!(health.pipeline, PipelineMode::Direct);
}

#[tokio::test]
async fn serves_browser_client() {
    let base = spawn(Arc::new(MockGenerator::texts(&[])), PipelineMode::TwoStep).await;

    let index = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(index.status(), 200);
    assert!(
        index.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(index.text().await.unwrap().contains("script.js"));

    let script = reqwest::get(format!("{base}/script.js")).await.unwrap();
    assert_eq!(script.status(), 200);
    assert!(script.text().await.unwrap().contains("/api/solve"));

    let style = reqwest::get(format!("{base}/style.css")).await.unwrap();
    assert_eq!(style.status(), 200);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let generator = Arc::new(MockGenerator::texts(&[]));
    let solver = Arc::new(Solver::new(generator.clone(), PipelineMode::Direct));
    let app = router(AppState { solver }, 1024);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let big = format!("data:image/png;base64,{}", "A".repeat(4096));
    let resp = post_json(&format!("http://{addr}"), json!({"image": big})).await;
    assert_eq!(resp.status(), 413);
    assert!(!error_of(resp).await.is_empty());
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn wrong_content_type_is_unsupported_media_type() {
    let generator = Arc::new(MockGenerator::texts(&[]));
    let base = spawn(generator.clone(), PipelineMode::TwoStep).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/solve"))
        .header("content-type", "text/plain")
        .body(r#"{"question": "hi"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 415);
    assert!(!error_of(resp).await.is_empty());
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn wrong_field_types_are_bad_request() {
    let base = spawn(Arc::new(MockGenerator::texts(&[])), PipelineMode::TwoStep).await;

    let resp = post_json(&base, json!({"question": 42})).await;
    assert_eq!(resp.status(), 400);
}
