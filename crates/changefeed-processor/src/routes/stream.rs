//! Routes for change-stream processing.

use axum::body::Bytes;
use axum::extract::State;
use axum::{Json, Router, routing::post};
use changefeed_core::receipt::EventReceipt;
use changefeed_stream::application::stream_handlers;
use changefeed_stream::domain::stream_event::StreamEvent;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /process
///
/// The body is a stream event document; the response is the aggregate
/// delivery receipt.
#[instrument(skip(state, body), fields(bytes = body.len()))]
async fn process(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<EventReceipt>, ApiError> {
    let event = StreamEvent::from_slice(&body)?;

    info!(stream_records = event.records.len(), "processing stream event");

    let receipt = stream_handlers::process_stream_event(
        &state.handler,
        &event,
        &state.key_attribute,
        state.clock.as_ref(),
    )
    .await?;

    Ok(Json(receipt))
}

/// Returns the stream processing router.
pub fn router() -> Router<AppState> {
    Router::new().route("/process", post(process))
}
