//! Changefeed processor: error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use changefeed_core::error::{BuildError, DeliveryFailureKind, DispatchError, ProviderError};
use changefeed_core::receipt::ReceiptFailure;
use changefeed_stream::domain::error::{StreamError, StreamProcessError};
use serde::Serialize;
use thiserror::Error;

/// Startup errors for the processor.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The notification handler could not be constructed.
    #[error("handler error: {0}")]
    Handler(#[from] BuildError),

    /// The bus client could not be constructed.
    #[error("bus client error: {0}")]
    Client(#[from] ProviderError),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Partial or transport-wide failure, for delivery errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DeliveryFailureKind>,
    /// Entries that were not delivered, for delivery errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_entries: Option<Vec<ReceiptFailure>>,
}

/// HTTP-layer wrapper around stream and dispatch errors that implements
/// `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub StreamProcessError);

impl From<StreamProcessError> for ApiError {
    fn from(err: StreamProcessError) -> Self {
        Self(err)
    }
}

impl From<StreamError> for ApiError {
    fn from(err: StreamError) -> Self {
        Self(StreamProcessError::Stream(err))
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        Self(StreamProcessError::Dispatch(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();

        let (status, body) = match self.0 {
            StreamProcessError::Stream(StreamError::Decode(_)) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "invalid_stream_event",
                    message,
                    kind: None,
                    failed_entries: None,
                },
            ),
            StreamProcessError::Stream(StreamError::MissingKey { .. }) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "missing_key_attribute",
                    message,
                    kind: None,
                    failed_entries: None,
                },
            ),
            StreamProcessError::Dispatch(DispatchError::Build(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "event_build_failed",
                    message,
                    kind: None,
                    failed_entries: None,
                },
            ),
            StreamProcessError::Dispatch(DispatchError::Delivery(delivery)) => (
                StatusCode::BAD_GATEWAY,
                ErrorBody {
                    error: "notification_delivery_failed",
                    message,
                    kind: Some(delivery.kind),
                    failed_entries: Some(delivery.failed_entries),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
