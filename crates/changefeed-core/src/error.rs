//! Dispatch error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::receipt::{DispatchOutcome, EventReceipt, ReceiptFailure};

/// Failure to turn domain models into envelopes.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The event source is empty or malformed.
    #[error("invalid event source {0:?}: must be non-empty and contain no whitespace")]
    InvalidEventSource(String),

    /// Extra metadata tried to overwrite a fixed metadata field.
    #[error("metadata key {0:?} is reserved")]
    ReservedMetadataKey(String),
}

/// Failure reported by a provider for a whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The transport call failed before any per-entry result was known.
    #[error("transport failure: {message}")]
    Transport {
        /// Human-readable reason.
        message: String,
        /// Transport error code, if the transport reported one.
        code: Option<String>,
        /// Transport request identifier, if known.
        request_id: Option<String>,
    },

    /// An envelope could not be encoded into the wire format.
    #[error("event serialization failed: {0}")]
    Serialization(String),

    /// The provider did not report exactly one entry per envelope.
    #[error("provider returned {actual} receipt entries for {expected} events")]
    ReceiptMismatch {
        /// Envelopes submitted.
        expected: usize,
        /// Entries returned.
        actual: usize,
    },
}

impl ProviderError {
    /// Transport failure with only a message.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            code: None,
            request_id: None,
        }
    }

    /// Error code used for the synthetic receipt entry.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Transport {
                code: Some(code), ..
            } => code,
            Self::Transport { code: None, .. } => "TransportFailure",
            Self::Serialization(_) => "SerializationFailure",
            Self::ReceiptMismatch { .. } => "ReceiptMismatch",
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Why a dispatch call did not fully succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryFailureKind {
    /// Some envelopes were rejected; every batch was still attempted.
    PartialFailure,
    /// A batch call failed outright; later batches were not attempted.
    TransportFailure,
}

/// One or more notifications could not be delivered.
///
/// Callers driving a change stream should not advance their checkpoint on
/// this error so the same records are redelivered.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct NotificationDeliveryError {
    /// Summary of the failure.
    pub message: String,
    /// Partial or transport-wide failure.
    pub kind: DeliveryFailureKind,
    /// Rejected entries, or one synthetic entry for a transport failure.
    pub failed_entries: Vec<ReceiptFailure>,
    /// Everything recorded before the dispatch stopped.
    pub receipt: EventReceipt,
}

impl NotificationDeliveryError {
    /// Terminal dispatch state this error represents.
    #[must_use]
    pub fn outcome(&self) -> DispatchOutcome {
        match self.kind {
            DeliveryFailureKind::PartialFailure => DispatchOutcome::PartiallyFailed,
            DeliveryFailureKind::TransportFailure => DispatchOutcome::TransportFailed,
        }
    }
}

/// Error returned by the notification handler.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Envelopes could not be built.
    #[error("failed to build events: {0}")]
    Build(#[from] BuildError),

    /// Envelopes were built but not all were delivered.
    #[error(transparent)]
    Delivery(#[from] NotificationDeliveryError),
}
