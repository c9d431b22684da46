//! Changefeed processor: HTTP host for the change notification pipeline.

use std::sync::Arc;

use axum::Router;
use changefeed_core::clock::SystemClock;
use changefeed_core::handler::EventHandler;
use changefeed_core::notification::ChangeNotification;
use changefeed_core::provider::EventProvider;
use changefeed_eventbridge::cache::ReusableClient;
use changefeed_eventbridge::client::HttpPutEventsClient;
use changefeed_eventbridge::provider::EventBridgeProvider;

use crate::config::ProcessorConfig;
use crate::error::AppError;
use crate::state::AppState;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

/// Wires the bus client, provider and handler described by `config`.
///
/// The client cache is warmed once so a bad endpoint fails startup.
///
/// # Errors
///
/// Returns `AppError::Client` if the bus client cannot be built and
/// `AppError::Handler` if the event source is rejected.
pub fn build_state(config: &ProcessorConfig) -> Result<AppState, AppError> {
    let endpoint = config.eventbridge_endpoint.clone();
    let client = ReusableClient::new(config.client_reuse, move || {
        HttpPutEventsClient::new(endpoint.clone())
    });
    client.handle()?;

    let provider: Arc<dyn EventProvider<ChangeNotification>> = Arc::new(
        EventBridgeProvider::new(config.event_bus.clone(), client)
            .with_max_entries(config.max_batch_size)
            .with_detail_type_format(config.detail_type_format),
    );
    let handler = EventHandler::new(provider, config.event_source.clone())?;

    Ok(AppState::new(
        Arc::new(handler),
        Arc::new(SystemClock),
        config.key_attribute.as_str(),
    ))
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/stream", routes::stream::router())
        .with_state(state)
}
