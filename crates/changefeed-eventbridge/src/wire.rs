//! EventBridge `PutEvents` wire types.

use serde::{Deserialize, Serialize};

/// Body of a `PutEvents` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventsRequest {
    /// At most ten entries.
    pub entries: Vec<PutEventsRequestEntry>,
}

/// One event in a `PutEvents` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventsRequestEntry {
    /// Envelope `event_source`.
    pub source: String,
    /// Event name, optionally suffixed with the version.
    pub detail_type: String,
    /// JSON-encoded envelope.
    pub detail: String,
    /// Target bus.
    pub event_bus_name: String,
    /// X-Ray trace header, when one is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_header: Option<String>,
}

/// Body of a `PutEvents` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventsResponse {
    /// Number of entries that were not ingested.
    #[serde(default)]
    pub failed_entry_count: u32,
    /// One result per request entry, in request order.
    #[serde(default)]
    pub entries: Vec<PutEventsResultEntry>,
}

/// Per-entry result of a `PutEvents` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventsResultEntry {
    /// Set when the entry was ingested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Set when the entry was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Set when the entry was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl PutEventsResultEntry {
    /// An ingested entry.
    #[must_use]
    pub fn accepted(event_id: impl Into<String>) -> Self {
        Self {
            event_id: Some(event_id.into()),
            ..Self::default()
        }
    }

    /// A rejected entry.
    #[must_use]
    pub fn rejected(error_code: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            event_id: None,
            error_code: Some(error_code.into()),
            error_message: Some(error_message.into()),
        }
    }

    /// Returns `true` if the entry carries an error.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.error_code.is_some() || self.error_message.is_some()
    }
}
