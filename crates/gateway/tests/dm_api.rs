#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for the `/dm` wire contract: always-200 responses,
//! body-encoded success, validation short-circuits, CORS preflight.

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use {
    async_trait::async_trait,
    petrel_chat::{DeliveryFailure, DeliveryOutcome, DmDelivery, ErrorKind},
    petrel_config::PetrelConfig,
    petrel_gateway::{AppState, DmService, GatewayServices, build_gateway_app},
    tokio::net::TcpListener,
};

/// Scripted delivery service that records how often it was invoked.
struct StubDmService {
    calls: AtomicUsize,
    outcome: DeliveryOutcome,
}

#[async_trait]
impl DmService for StubDmService {
    async fn deliver(&self, _request: DmDelivery) -> DeliveryOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Start a test server on an OS-assigned port with a scripted outcome.
async fn start_server(outcome: DeliveryOutcome) -> (SocketAddr, Arc<StubDmService>) {
    let stub = Arc::new(StubDmService {
        calls: AtomicUsize::new(0),
        outcome,
    });
    let state = AppState {
        config: Arc::new(PetrelConfig::default()),
        services: GatewayServices {
            dm: Arc::clone(&stub) as Arc<dyn DmService>,
        },
    };
    let app = build_gateway_app(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, stub)
}

fn success_outcome() -> DeliveryOutcome {
    DeliveryOutcome::Success {
        target_handle: "alice.example.com".into(),
        rich_text_used: false,
    }
}

fn valid_body() -> serde_json::Value {
    serde_json::json!({
        "userHandle": "sender.example.com",
        "userPassword": "app-password",
        "targetHandle": "alice.example.com",
        "message": "hello over there",
    })
}

async fn post_dm(addr: SocketAddr, body: &serde_json::Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}/dm"))
        .json(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn successful_delivery_returns_success_body() {
    let (addr, stub) = start_server(success_outcome()).await;
    let resp = post_dm(addr, &valid_body()).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Successfully sent DM to alice.example.com");
    assert_eq!(body["target_handle"], "alice.example.com");
    assert_eq!(body["rich_text_used"], false);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_fields_rejected_without_delivery() {
    let (addr, stub) = start_server(success_outcome()).await;
    let mut body = valid_body();
    body.as_object_mut().unwrap().remove("userPassword");
    let resp = post_dm(addr, &body).await;
    assert_eq!(resp.status(), 200, "failures still ride an HTTP 200");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Missing required fields (userHandle, userPassword, targetHandle, message)"
    );
    assert!(body.get("error_type").is_none());
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0, "no remote call");
}

#[tokio::test]
async fn empty_required_field_counts_as_missing() {
    let (addr, stub) = start_server(success_outcome()).await;
    let mut body = valid_body();
    body["targetHandle"] = serde_json::json!("");
    let resp = post_dm(addr, &body).await;
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Missing required fields (userHandle, userPassword, targetHandle, message)"
    );
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn message_of_exactly_1000_chars_is_accepted() {
    let (addr, stub) = start_server(success_outcome()).await;
    let mut body = valid_body();
    body["message"] = serde_json::json!("a".repeat(1000));
    let resp = post_dm(addr, &body).await;
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn message_of_1001_chars_is_rejected_locally() {
    let (addr, stub) = start_server(success_outcome()).await;
    let mut body = valid_body();
    body["message"] = serde_json::json!("a".repeat(1001));
    let resp = post_dm(addr, &body).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Message too long. Maximum 1000 characters allowed."
    );
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn multibyte_characters_count_once_toward_the_limit() {
    let (addr, stub) = start_server(success_outcome()).await;
    let mut body = valid_body();
    // 1000 characters but four bytes each; must be accepted.
    body["message"] = serde_json::json!("\u{1f99a}".repeat(1000));
    let resp = post_dm(addr, &body).await;
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn overlapping_spans_rejected_before_any_remote_call() {
    let (addr, stub) = start_server(success_outcome()).await;
    let mut body = valid_body();
    body["embeddedLinks"] = serde_json::json!([
        {"text": "ab", "url": "https://a.example", "start": 0, "end": 5},
        {"text": "cd", "url": "https://b.example", "start": 3, "end": 8},
    ]);
    let resp = post_dm(addr, &body).await;
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Invalid embedded links:"), "{error}");
    assert!(error.contains("overlap"), "{error}");
    assert!(body.get("error_type").is_none());
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_json_reports_parse_error() {
    let (addr, stub) = start_server(success_outcome()).await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/dm"))
        .header("content-type", "application/json")
        .body("this is not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON data:")
    );
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn classified_failure_maps_onto_wire_fields() {
    let (addr, _stub) = start_server(DeliveryOutcome::Failure(DeliveryFailure {
        kind: ErrorKind::RateLimit,
        message: "Rate limit exceeded. Please slow down your requests.".into(),
        retry_after: Some(60),
        target_handle: Some("alice.example.com".into()),
    }))
    .await;
    let resp = post_dm(addr, &valid_body()).await;
    assert_eq!(resp.status(), 200, "failures still ride an HTTP 200");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "RateLimit");
    assert_eq!(body["retry_after"], 60);
    assert_eq!(body["target_handle"], "alice.example.com");
}

#[tokio::test]
async fn blocked_failure_carries_no_target_or_retry() {
    let (addr, _stub) = start_server(DeliveryOutcome::Failure(DeliveryFailure {
        kind: ErrorKind::Blocked,
        message: "Cannot send DM to alice.example.com: You may be blocked by this user".into(),
        retry_after: None,
        target_handle: None,
    }))
    .await;
    let resp = post_dm(addr, &valid_body()).await;
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error_type"], "BlockedError");
    assert!(body.get("target_handle").is_none());
    assert!(body.get("retry_after").is_none());
}

#[tokio::test]
async fn preflight_returns_permissive_cors_headers_and_empty_body() {
    let (addr, stub) = start_server(success_outcome()).await;
    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/dm"))
        .header("origin", "https://app.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let body = resp.text().await.unwrap();
    assert!(body.is_empty(), "preflight body must be empty: {body}");
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (addr, _stub) = start_server(success_outcome()).await;
    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}
