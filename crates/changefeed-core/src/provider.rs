//! Event provider abstraction.

use std::num::NonZeroUsize;

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::event::{Event, EventModel};
use crate::receipt::EventReceiptEntry;

/// Sends batches of envelopes to an event bus.
///
/// Implementations make at most one transport call per [`send`](Self::send)
/// and neither retry nor re-batch. Callers keep batches within
/// [`max_batch_size`](Self::max_batch_size).
#[async_trait]
pub trait EventProvider<T: EventModel>: Send + Sync {
    /// Maximum number of envelopes the transport accepts per call.
    fn max_batch_size(&self) -> NonZeroUsize;

    /// Sends one batch and returns one entry per envelope, in batch order.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` when the call fails before any per-entry
    /// result is available, or when an envelope cannot be encoded.
    async fn send(&self, batch: &[Event<T>]) -> Result<Vec<EventReceiptEntry>, ProviderError>;
}
