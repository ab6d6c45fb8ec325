#[path = "common/mod.rs"]
mod common;

use bytes::Bytes;
use common::{spawn_app_with, spawn_upstream};
use http_body::Frame;
use http_body_util::StreamBody;
use recap::AppConfig;
use reqwest::{Client, StatusCode};
use std::convert::Infallible;
use tokio_stream::iter;

const OK_BODY: &str = r#"{"choices":[{"message":{"content":"Summary text"}}]}"#;

async fn limited_app(upstream: &str) -> (String, tokio::task::JoinHandle<()>) {
    spawn_app_with(AppConfig {
        api_url: upstream.to_string(),
        max_request_bytes: Some(256),
        ..AppConfig::default()
    })
    .await
}

#[tokio::test]
async fn declared_length_over_limit_is_refused() {
    let (upstream, seen, _u) = spawn_upstream(200, OK_BODY).await;
    let (base, handle) = limited_app(&upstream).await;

    let resp = Client::new()
        .post(format!("{}/summarize", base))
        .json(&serde_json::json!({ "content": "X".repeat(2048) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json.get("error").and_then(|v| v.as_str()), Some("Request too large"));
    assert!(seen.lock().await.is_empty());
    handle.abort();
}

#[tokio::test]
async fn chunked_payload_over_limit_returns_error_response() {
    let (upstream, seen, _u) = spawn_upstream(200, OK_BODY).await;
    let (base, handle) = limited_app(&upstream).await;

    let paragraphs: Vec<_> = (0..64)
        .map(|i| serde_json::json!({"text": format!("paragraph {i}")}))
        .collect();
    let payload = serde_json::json!({ "blocks": paragraphs }).to_string();

    let chunk_bytes: Vec<_> = payload
        .as_bytes()
        .chunks(128)
        .map(Bytes::copy_from_slice)
        .collect();

    let stream = iter(
        chunk_bytes
            .into_iter()
            .map(|chunk| Ok::<_, Infallible>(Frame::data(chunk))),
    );
    let body = reqwest::Body::wrap(StreamBody::new(stream));

    let resp = Client::new()
        .post(format!("{}/summarize", base))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json.get("error").and_then(|v| v.as_str()), Some("Request too large"));
    assert!(seen.lock().await.is_empty());
    handle.abort();
}

#[tokio::test]
async fn small_body_within_limit_is_summarized() {
    let (upstream, _seen, _u) = spawn_upstream(200, OK_BODY).await;
    let (base, handle) = limited_app(&upstream).await;

    let resp = Client::new()
        .post(format!("{}/summarize", base))
        .json(&serde_json::json!({ "content": "short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json, serde_json::json!({"summary": "Summary text"}));
    handle.abort();
}
