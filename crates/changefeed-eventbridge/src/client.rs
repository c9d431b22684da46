//! `PutEvents` transport clients.

use std::sync::Arc;

use async_trait::async_trait;
use changefeed_core::error::ProviderError;
use serde::Deserialize;
use tracing::debug;

use crate::wire::{PutEventsRequest, PutEventsResponse};

/// `X-Amz-Target` value selecting the `PutEvents` operation.
pub const PUT_EVENTS_TARGET: &str = "AWSEvents.PutEvents";

const AMZ_JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const REQUEST_ID_HEADER: &str = "x-amzn-requestid";

/// Performs one `PutEvents` call.
#[async_trait]
pub trait PutEventsClient: Send + Sync {
    /// Sends `request` and returns the per-entry results.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Transport` when the call fails as a whole.
    async fn put_events(&self, request: &PutEventsRequest)
    -> Result<PutEventsResponse, ProviderError>;
}

#[async_trait]
impl<C: PutEventsClient + ?Sized> PutEventsClient for Arc<C> {
    async fn put_events(
        &self,
        request: &PutEventsRequest,
    ) -> Result<PutEventsResponse, ProviderError> {
        (**self).put_events(request).await
    }
}

/// Error body returned by the EventBridge JSON protocol.
#[derive(Debug, Default, Deserialize)]
struct ServiceErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl ServiceErrorBody {
    /// `com.amazonaws.events#ThrottlingException` -> `ThrottlingException`.
    fn code(&self) -> Option<String> {
        self.error_type
            .as_deref()
            .and_then(|t| t.rsplit('#').next())
            .map(str::to_owned)
    }
}

/// Speaks the EventBridge JSON 1.1 protocol over HTTP.
///
/// Requests are not signed; point `endpoint` at a local emulator or a
/// signing proxy.
#[derive(Debug, Clone)]
pub struct HttpPutEventsClient {
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpPutEventsClient {
    /// Creates a client posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Transport` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("changefeed-eventbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.into(),
            http_client,
        })
    }

    /// The endpoint requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PutEventsClient for HttpPutEventsClient {
    async fn put_events(
        &self,
        request: &PutEventsRequest,
    ) -> Result<PutEventsResponse, ProviderError> {
        let body = serde_json::to_vec(request)?;

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("X-Amz-Target", PUT_EVENTS_TARGET)
            .header(reqwest::header::CONTENT_TYPE, AMZ_JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;

        let status = response.status();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;

        debug!(%status, request_id = ?request_id, "PutEvents response received");

        if !status.is_success() {
            let error_body: ServiceErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            return Err(ProviderError::Transport {
                message: error_body
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("PutEvents returned HTTP {status}")),
                code: error_body.code(),
                request_id,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ProviderError::Transport {
            message: format!("malformed PutEvents response: {e}"),
            code: None,
            request_id,
        })
    }
}
