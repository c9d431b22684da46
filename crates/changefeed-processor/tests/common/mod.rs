//! Shared test helpers for processor integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use changefeed_core::handler::EventHandler;
use changefeed_core::notification::ChangeNotification;
use changefeed_core::provider::EventProvider;
use changefeed_test_support::FixedClock;
use http_body_util::BodyExt;
use tower::ServiceExt;

use changefeed_processor::build_router;
use changefeed_processor::state::AppState;

/// Source stamped on envelopes by the test app.
pub const EVENT_SOURCE: &str = "myorg.product.stream";

/// Build the full app router around `provider` with a fixed clock and the
/// default `id` key attribute.
pub fn build_test_app(provider: Arc<dyn EventProvider<ChangeNotification>>) -> Router {
    build_test_app_with_key(provider, "id")
}

/// Build the full app router with a custom stream key attribute.
pub fn build_test_app_with_key(
    provider: Arc<dyn EventProvider<ChangeNotification>>,
    key_attribute: &str,
) -> Router {
    let clock = Arc::new(FixedClock::standard());
    let handler = EventHandler::new(provider, EVENT_SOURCE)
        .unwrap()
        .with_clock(clock.clone());
    let app_state = AppState::new(Arc::new(handler), clock, key_attribute);

    build_router(app_state)
}

/// Send a POST request with a raw body and return the response.
pub async fn post_raw(app: Router, uri: &str, body: Vec<u8>) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_raw(app, uri, serde_json::to_vec(body).unwrap()).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// A stream event document with one record per `(event_id, event_name, id)`.
pub fn stream_event(records: &[(&str, &str, &str)]) -> serde_json::Value {
    let records: Vec<serde_json::Value> = records
        .iter()
        .map(|(event_id, event_name, id)| {
            serde_json::json!({
                "eventID": event_id,
                "eventName": event_name,
                "eventSource": "aws:dynamodb",
                "dynamodb": {"Keys": {"id": {"S": id}}}
            })
        })
        .collect();
    serde_json::json!({ "Records": records })
}

/// In-memory log sink shared between a subscriber and the test reading it.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

impl LogBuffer {
    /// JSON log lines written so far.
    pub fn lines(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Install a JSON subscriber for the current thread, writing into the
/// returned buffer until the guard is dropped.
pub fn capture_json_logs() -> (tracing::subscriber::DefaultGuard, LogBuffer) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::INFO)
        .with_writer(move || writer.clone())
        .finish();

    (tracing::subscriber::set_default(subscriber), buffer)
}
