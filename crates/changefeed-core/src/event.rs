//! Event envelope abstractions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version stamped on envelopes whose model does not declare one.
pub const DEFAULT_EVENT_VERSION: &str = "v1";

/// Metadata field names that caller-supplied extra metadata may not reuse.
pub const RESERVED_METADATA_KEYS: [&str; 5] = [
    "event_name",
    "event_source",
    "event_version",
    "correlation_id",
    "created_at",
];

/// A domain payload that can be wrapped in an [`Event`] envelope.
///
/// The event name and version are registered on the type at compile time
/// rather than discovered from the runtime type name.
pub trait EventModel: Serialize + Send + Sync {
    /// PascalCase model name, e.g. `ChangeNotification`.
    const MODEL_NAME: &'static str;

    /// Schema version of the payload.
    const EVENT_VERSION: &'static str = DEFAULT_EVENT_VERSION;

    /// Returns the UPPER_SNAKE_CASE event name derived from [`Self::MODEL_NAME`].
    #[must_use]
    fn event_name() -> String
    where
        Self: Sized,
    {
        event_name_from_model_name(Self::MODEL_NAME)
    }
}

/// Metadata attached to every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Event name, e.g. `CHANGE_NOTIFICATION`.
    pub event_name: String,
    /// Dotted namespace of the emitting service, e.g. `myorg.product.stream`.
    pub event_source: String,
    /// Payload schema version, e.g. `v1`.
    pub event_version: String,
    /// Shared by every envelope built in one dispatch call.
    pub correlation_id: String,
    /// Envelope creation time (UTC).
    pub created_at: DateTime<Utc>,
    /// Caller-supplied metadata, serialized alongside the fixed fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Normalized envelope sent to the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event<T> {
    /// The domain payload.
    pub data: T,
    /// Envelope metadata.
    pub metadata: EventMetadata,
}

/// Converts a PascalCase model name into an UPPER_SNAKE_CASE event name.
///
/// Acronym and digit runs are kept together:
/// `ProductHTTPNotification123` becomes `PRODUCT_HTTP_NOTIFICATION123`.
#[must_use]
pub fn event_name_from_model_name(model_name: &str) -> String {
    let chars: Vec<char> = model_name.chars().collect();
    let mut name = String::with_capacity(model_name.len() + 4);

    for (idx, &current) in chars.iter().enumerate() {
        if idx > 0 && current.is_ascii_uppercase() {
            let previous = chars[idx - 1];
            let starts_word = previous != '_'
                && chars.get(idx + 1).is_some_and(char::is_ascii_lowercase);
            let follows_lower_or_digit =
                previous.is_ascii_lowercase() || previous.is_ascii_digit();

            if starts_word || follows_lower_or_digit {
                name.push('_');
            }
        }
        name.push(current.to_ascii_uppercase());
    }

    name
}
