/// Capture behavior tests
///
/// Covers id uniqueness, header filtering, and target validation.
/// Run with: cargo test --test capture_tests
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderMap;
use http::header::HeaderValue;
use request_outbox::{
    CapturedEntry, ForwardClient, ForwardReceipt, OutboxConfig, OutboxError, Payload,
    RequestOutbox,
};
use serde_json::json;

/// Capture must never reach the forward client.
struct PanickingForwarder;

#[async_trait]
impl ForwardClient for PanickingForwarder {
    async fn forward(&self, _entry: &CapturedEntry) -> request_outbox::Result<ForwardReceipt> {
        panic!("capture must never forward");
    }
}

fn outbox() -> RequestOutbox {
    RequestOutbox::new(OutboxConfig::default(), Arc::new(PanickingForwarder))
}

#[tokio::test]
async fn captured_ids_are_unique() {
    let outbox = outbox();
    let mut ids = HashSet::new();

    for i in 0..100 {
        let entry = outbox
            .capture(
                "POST",
                Some(&format!("http://example.test/hook/{i}")),
                &HeaderMap::new(),
                Payload::Empty,
            )
            .await
            .unwrap();
        assert!(ids.insert(entry.id), "id {} repeated", entry.id);
    }

    assert_eq!(outbox.store().len().await, 100);
}

#[tokio::test]
async fn only_allow_listed_headers_are_kept() {
    let outbox = outbox();
    let mut headers = HeaderMap::new();
    headers.insert("Authorization", HeaderValue::from_static("Basic abc"));
    headers.insert("Example", HeaderValue::from_static("x"));

    let entry = outbox
        .capture("POST", Some("http://example.test/hook"), &headers, Payload::Empty)
        .await
        .unwrap();

    assert_eq!(entry.headers.len(), 1);
    assert_eq!(entry.headers["authorization"], vec!["Basic abc"]);
    assert!(!entry.headers.contains_key("example"));
    assert!(!entry.headers.contains_key("Example"));
}

#[tokio::test]
async fn missing_target_creates_no_entry() {
    let outbox = outbox();

    let err = outbox
        .capture("POST", None, &HeaderMap::new(), Payload::Empty)
        .await
        .unwrap_err();
    assert!(matches!(err, OutboxError::MissingTarget));

    let err = outbox
        .capture("POST", Some("  "), &HeaderMap::new(), Payload::Empty)
        .await
        .unwrap_err();
    assert!(matches!(err, OutboxError::MissingTarget));

    assert!(outbox.store().is_empty().await);
}

#[tokio::test]
async fn body_and_method_are_stored_verbatim() {
    let outbox = outbox();
    let body = Payload::Json(json!({"test": "payload", "nested": [1, 2, 3]}));

    let entry = outbox
        .capture("PUT", Some("http://example.test/hook"), &HeaderMap::new(), body.clone())
        .await
        .unwrap();

    assert_eq!(entry.method, "PUT");
    assert_eq!(entry.body, body);
    assert_eq!(entry.target_url, "http://example.test/hook");

    let stored = outbox.store().get(&entry.id).await.unwrap();
    assert_eq!(stored.body, body);
}

#[tokio::test]
async fn inspection_orders_newest_first() {
    let outbox = outbox();
    for i in 0..5 {
        outbox
            .capture(
                "GET",
                Some(&format!("http://example.test/{i}")),
                &HeaderMap::new(),
                Payload::Empty,
            )
            .await
            .unwrap();
        // distinct timestamps
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let entries = outbox.entries().await;
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].target_url, "http://example.test/4");
    for pair in entries.windows(2) {
        assert!(pair[0].captured_on >= pair[1].captured_on);
    }
}
