//! Integration tests for wiring the processor from configuration.

mod common;

use axum::http::StatusCode;
use changefeed_processor::config::ProcessorConfig;
use changefeed_processor::{build_router, build_state};

fn config() -> ProcessorConfig {
    ProcessorConfig::from_lookup(|key| {
        match key {
            "EVENT_BUS" => Some("products"),
            "EVENT_SOURCE" => Some("myorg.product.stream"),
            "EVENTBRIDGE_ENDPOINT" => Some("http://localhost:4566"),
            "STREAM_KEY_ATTRIBUTE" => Some("sku"),
            _ => None,
        }
        .map(str::to_string)
    })
    .unwrap()
}

#[tokio::test]
async fn test_build_state_wires_handler_from_config() {
    // Arrange
    let config = config();

    // Act
    let state = build_state(&config).unwrap();

    // Assert
    assert_eq!(state.handler.event_source(), "myorg.product.stream");
    assert_eq!(&*state.key_attribute, "sku");

    let (status, json) = common::get_json(build_router(state), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["event_source"], "myorg.product.stream");
}
