//! EventBridge-backed `EventProvider`.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use changefeed_core::error::ProviderError;
use changefeed_core::event::{Event, EventModel};
use changefeed_core::provider::EventProvider;
use changefeed_core::receipt::EventReceiptEntry;
use tracing::{debug, instrument, warn};

use crate::client::PutEventsClient;
use crate::trace::{EnvTraceContext, TraceContext};
use crate::wire::{PutEventsRequest, PutEventsRequestEntry, PutEventsResponse};

/// Maximum entries EventBridge accepts in one `PutEvents` call.
pub const EVENTBRIDGE_MAX_ENTRIES: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(max) => max,
    None => unreachable!(),
};

/// How the `DetailType` field is derived from the envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailTypeFormat {
    /// `CHANGE_NOTIFICATION`
    #[default]
    EventName,
    /// `CHANGE_NOTIFICATION.v1`
    EventNameWithVersion,
}

impl DetailTypeFormat {
    fn render<T>(self, event: &Event<T>) -> String {
        match self {
            Self::EventName => event.metadata.event_name.clone(),
            Self::EventNameWithVersion => format!(
                "{}.{}",
                event.metadata.event_name, event.metadata.event_version
            ),
        }
    }
}

/// Publishes envelopes to one EventBridge bus.
pub struct EventBridgeProvider<C> {
    bus_name: String,
    client: C,
    max_entries: NonZeroUsize,
    detail_type: DetailTypeFormat,
    trace: Arc<dyn TraceContext>,
}

impl<C: PutEventsClient> EventBridgeProvider<C> {
    /// Creates a provider publishing to `bus_name` through `client`.
    pub fn new(bus_name: impl Into<String>, client: C) -> Self {
        Self {
            bus_name: bus_name.into(),
            client,
            max_entries: EVENTBRIDGE_MAX_ENTRIES,
            detail_type: DetailTypeFormat::default(),
            trace: Arc::new(EnvTraceContext),
        }
    }

    /// Lowers the per-call entry limit. Values above the service limit are
    /// clamped to it.
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: NonZeroUsize) -> Self {
        self.max_entries = max_entries.min(EVENTBRIDGE_MAX_ENTRIES);
        self
    }

    /// Selects how `DetailType` is rendered.
    #[must_use]
    pub fn with_detail_type_format(mut self, format: DetailTypeFormat) -> Self {
        self.detail_type = format;
        self
    }

    /// Replaces the trace id source.
    #[must_use]
    pub fn with_trace_context(mut self, trace: Arc<dyn TraceContext>) -> Self {
        self.trace = trace;
        self
    }

    /// The target bus.
    #[must_use]
    pub fn bus_name(&self) -> &str {
        &self.bus_name
    }

    /// Encodes `batch` as a `PutEvents` request, one entry per envelope.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Serialization` if an envelope cannot be
    /// encoded.
    pub fn build_request<T: EventModel>(
        &self,
        batch: &[Event<T>],
    ) -> Result<PutEventsRequest, ProviderError> {
        let trace_header = self.trace.trace_id();

        let entries = batch
            .iter()
            .map(|event| {
                Ok(PutEventsRequestEntry {
                    source: event.metadata.event_source.clone(),
                    detail_type: self.detail_type.render(event),
                    detail: serde_json::to_string(event)?,
                    event_bus_name: self.bus_name.clone(),
                    trace_header: trace_header.clone(),
                })
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;

        Ok(PutEventsRequest { entries })
    }
}

/// Maps a `PutEvents` response onto receipt entries, in request order.
fn collect_receipts(
    expected: usize,
    response: PutEventsResponse,
) -> Result<Vec<EventReceiptEntry>, ProviderError> {
    if response.entries.len() != expected {
        return Err(ProviderError::ReceiptMismatch {
            expected,
            actual: response.entries.len(),
        });
    }

    let reported_failures = response.failed_entry_count;
    let receipts: Vec<EventReceiptEntry> = response
        .entries
        .into_iter()
        .map(|entry| {
            if entry.is_rejected() {
                let message = entry
                    .error_message
                    .or_else(|| entry.error_code.clone())
                    .unwrap_or_default();
                EventReceiptEntry::failure(
                    entry.event_id.unwrap_or_default(),
                    message,
                    entry.error_code,
                )
            } else {
                EventReceiptEntry::success(entry.event_id.unwrap_or_default())
            }
        })
        .collect();

    let rejected = receipts.iter().filter(|r| !r.is_success()).count();
    if usize::try_from(reported_failures).unwrap_or(usize::MAX) > rejected {
        warn!(
            failed_entry_count = reported_failures,
            rejected,
            "PutEvents reported more failures than entries carry errors"
        );
        return Err(ProviderError::Transport {
            message: format!(
                "PutEvents reported {reported_failures} failed entries but {rejected} carry an error"
            ),
            code: Some("UnaccountedFailedEntries".to_owned()),
            request_id: None,
        });
    }

    Ok(receipts)
}

#[async_trait]
impl<T, C> EventProvider<T> for EventBridgeProvider<C>
where
    T: EventModel,
    C: PutEventsClient,
{
    fn max_batch_size(&self) -> NonZeroUsize {
        self.max_entries
    }

    #[instrument(skip(self, batch), fields(bus = %self.bus_name, entries = batch.len()))]
    async fn send(&self, batch: &[Event<T>]) -> Result<Vec<EventReceiptEntry>, ProviderError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        if batch.len() > self.max_entries.get() {
            return Err(ProviderError::transport(format!(
                "batch of {} events exceeds the limit of {} entries per call",
                batch.len(),
                self.max_entries
            )));
        }

        let request = self.build_request(batch)?;
        let response = self.client.put_events(&request).await?;
        debug!(
            failed_entry_count = response.failed_entry_count,
            "PutEvents call completed"
        );

        collect_receipts(batch.len(), response)
    }
}
