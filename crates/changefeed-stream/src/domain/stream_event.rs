//! DynamoDB Streams shaped event documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::change::{ChangeKind, ChangeRecord};
use crate::domain::error::StreamError;

/// Key attribute used when none is configured.
pub const DEFAULT_KEY_ATTRIBUTE: &str = "id";

/// A batch of stream records as delivered to the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Records in stream order.
    #[serde(rename = "Records", default)]
    pub records: Vec<StreamRecord>,
}

/// One stream record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    /// Unique id of the record within the stream.
    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// `INSERT`, `MODIFY` or `REMOVE`.
    #[serde(rename = "eventName")]
    pub event_name: ChangeKind,
    /// Item-level details.
    #[serde(default)]
    pub dynamodb: StreamRecordData,
}

/// Item-level part of a stream record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecordData {
    /// Primary key attributes of the changed item.
    #[serde(rename = "Keys", default)]
    pub keys: BTreeMap<String, AttributeValue>,
    /// Position of the record in its shard.
    #[serde(
        rename = "SequenceNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sequence_number: Option<String>,
}

/// A typed attribute value. Only scalar key types are modelled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    /// String value.
    #[serde(rename = "S", default, skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,
    /// Number value, kept in its string form.
    #[serde(rename = "N", default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
}

impl AttributeValue {
    /// A string attribute.
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            s: Some(value.into()),
            n: None,
        }
    }

    fn as_key(&self) -> Option<&str> {
        self.s.as_deref().or(self.n.as_deref())
    }
}

impl StreamEvent {
    /// Decodes a stream event from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns `StreamError::Decode` if the document is not a stream event.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, StreamError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Extracts one change record per publishable stream record, in stream
    /// order. Records of any other change kind are skipped without a key
    /// lookup.
    ///
    /// # Errors
    ///
    /// Returns `StreamError::MissingKey` for the first publishable record
    /// without a string or number value under `key_attribute`.
    pub fn change_records(&self, key_attribute: &str) -> Result<Vec<ChangeRecord>, StreamError> {
        self.records
            .iter()
            .filter(|record| record.event_name.status().is_some())
            .map(|record| {
                let entity_id = record
                    .dynamodb
                    .keys
                    .get(key_attribute)
                    .and_then(AttributeValue::as_key)
                    .ok_or_else(|| StreamError::MissingKey {
                        event_id: record.event_id.clone().unwrap_or_default(),
                        key_attribute: key_attribute.to_owned(),
                    })?;
                Ok(ChangeRecord::new(entity_id, record.event_name))
            })
            .collect()
    }
}
