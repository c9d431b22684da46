//! Stream decoding errors.

use changefeed_core::error::DispatchError;
use thiserror::Error;

/// A stream event could not be turned into change records.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The document is not a valid stream event.
    #[error("invalid stream event: {0}")]
    Decode(String),

    /// A record carries no usable value for the key attribute.
    #[error("record {event_id:?} has no string or number key attribute {key_attribute:?}")]
    MissingKey {
        /// `eventID` of the offending record, empty when absent.
        event_id: String,
        /// Key attribute that was looked up.
        key_attribute: String,
    },
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Failure while processing a stream event end to end.
#[derive(Debug, Error)]
pub enum StreamProcessError {
    /// The event could not be decoded into change records.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Notifications were built but dispatch failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
