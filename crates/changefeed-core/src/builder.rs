//! Builds event envelopes from domain models.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::clock::Clock;
use crate::error::BuildError;
use crate::event::{Event, EventMetadata, EventModel, RESERVED_METADATA_KEYS};

/// Checks that `event_source` is usable as an envelope source.
///
/// # Errors
///
/// Returns `BuildError::InvalidEventSource` if the source is empty or
/// contains whitespace.
pub fn validate_event_source(event_source: &str) -> Result<(), BuildError> {
    if event_source.is_empty() || event_source.chars().any(char::is_whitespace) {
        return Err(BuildError::InvalidEventSource(event_source.to_owned()));
    }
    Ok(())
}

/// Wraps each model in an [`Event`] envelope.
///
/// Envelopes come back in input order and share one correlation id: the
/// caller's when given, otherwise a freshly generated UUID. An empty input
/// yields an empty output.
///
/// # Errors
///
/// Returns `BuildError::InvalidEventSource` for an unusable source and
/// `BuildError::ReservedMetadataKey` if `metadata` reuses a fixed field name.
pub fn build_events<T: EventModel>(
    models: Vec<T>,
    event_source: &str,
    metadata: &BTreeMap<String, String>,
    correlation_id: Option<&str>,
    clock: &dyn Clock,
) -> Result<Vec<Event<T>>, BuildError> {
    validate_event_source(event_source)?;

    if let Some(key) = metadata
        .keys()
        .find(|key| RESERVED_METADATA_KEYS.contains(&key.as_str()))
    {
        return Err(BuildError::ReservedMetadataKey(key.clone()));
    }

    let correlation_id = match correlation_id {
        Some(id) if !id.is_empty() => id.to_owned(),
        _ => Uuid::new_v4().to_string(),
    };
    let event_name = T::event_name();

    let events = models
        .into_iter()
        .map(|data| Event {
            data,
            metadata: EventMetadata {
                event_name: event_name.clone(),
                event_source: event_source.to_owned(),
                event_version: T::EVENT_VERSION.to_owned(),
                correlation_id: correlation_id.clone(),
                created_at: clock.now(),
                extra: metadata.clone(),
            },
        })
        .collect();

    Ok(events)
}
