//! Notification handler: build, batch, send, aggregate.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{Span, debug, info, instrument, warn};

use crate::batch::chunk;
use crate::builder::{build_events, validate_event_source};
use crate::clock::{Clock, SystemClock};
use crate::error::{BuildError, DispatchError};
use crate::event::EventModel;
use crate::provider::EventProvider;
use crate::receipt::{DispatchOutcome, EventReceipt, ReceiptAggregator};

/// Per-call options for [`EventHandler::emit`].
#[derive(Debug, Clone, Default)]
pub struct EmitOptions {
    /// Extra metadata copied into every envelope.
    pub metadata: BTreeMap<String, String>,
    /// Correlation id to use instead of a generated one.
    pub correlation_id: Option<String>,
}

impl EmitOptions {
    /// Adds one metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sets the correlation id.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}

/// Publishes domain models through an [`EventProvider`].
///
/// Batches go out strictly one after another in input order. A batch with
/// rejected entries does not stop later batches; a batch whose transport
/// call fails outright does.
pub struct EventHandler<T> {
    provider: Arc<dyn EventProvider<T>>,
    event_source: String,
    clock: Arc<dyn Clock>,
}

impl<T: EventModel> EventHandler<T> {
    /// Creates a handler that stamps envelopes with `event_source`.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidEventSource` if `event_source` is empty or
    /// contains whitespace.
    pub fn new(
        provider: Arc<dyn EventProvider<T>>,
        event_source: impl Into<String>,
    ) -> Result<Self, BuildError> {
        let event_source = event_source.into();
        validate_event_source(&event_source)?;
        Ok(Self {
            provider,
            event_source,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the clock used for envelope timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The source stamped on every envelope.
    #[must_use]
    pub fn event_source(&self) -> &str {
        &self.event_source
    }

    /// Publishes `models` with a generated correlation id and no extra
    /// metadata.
    ///
    /// # Errors
    ///
    /// See [`EventHandler::emit`].
    pub async fn notify(&self, models: Vec<T>) -> Result<EventReceipt, DispatchError> {
        self.emit(models, EmitOptions::default()).await
    }

    /// Publishes `models` and returns the aggregate receipt.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Build` if envelopes cannot be built, and
    /// `DispatchError::Delivery` if any entry was rejected (after every batch
    /// was attempted) or a transport call failed (immediately).
    #[instrument(
        skip(self, models, options),
        fields(
            event_source = %self.event_source,
            models = models.len(),
            correlation_id = tracing::field::Empty,
        )
    )]
    pub async fn emit(
        &self,
        models: Vec<T>,
        options: EmitOptions,
    ) -> Result<EventReceipt, DispatchError> {
        let events = build_events(
            models,
            &self.event_source,
            &options.metadata,
            options.correlation_id.as_deref(),
            self.clock.as_ref(),
        )?;
        if let Some(first) = events.first() {
            Span::current().record("correlation_id", first.metadata.correlation_id.as_str());
        }

        let mut aggregator = ReceiptAggregator::new();

        for (batch_index, batch) in chunk(&events, self.provider.max_batch_size()).enumerate() {
            debug!(batch_index, batch_size = batch.len(), "sending batch");

            let recorded = match self.provider.send(batch).await {
                Ok(entries) => aggregator.record_batch(batch.len(), entries),
                Err(error) => Err(error),
            };

            if let Err(error) = recorded {
                let delivery_error = aggregator.abort(&error);
                warn!(
                    batch_index,
                    outcome = DispatchOutcome::TransportFailed.as_str(),
                    error = %error,
                    "transport failure, remaining batches skipped"
                );
                return Err(delivery_error.into());
            }
        }

        match aggregator.finish() {
            Ok(receipt) => {
                info!(
                    successes = receipt.successes.len(),
                    outcome = DispatchOutcome::Succeeded.as_str(),
                    "notifications delivered"
                );
                Ok(receipt)
            }
            Err(delivery_error) => {
                warn!(
                    failures = delivery_error.failed_entries.len(),
                    successes = delivery_error.receipt.successes.len(),
                    outcome = delivery_error.outcome().as_str(),
                    "notifications partially delivered"
                );
                Err(delivery_error.into())
            }
        }
    }
}
