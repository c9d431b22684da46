//! Test providers: in-memory `EventProvider` implementations for tests.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use async_trait::async_trait;
use changefeed_core::error::ProviderError;
use changefeed_core::event::{Event, EventModel};
use changefeed_core::provider::EventProvider;
use changefeed_core::receipt::EventReceiptEntry;

const DEFAULT_MAX_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(10).unwrap();

fn encode_batch<T: EventModel>(batch: &[Event<T>]) -> Vec<serde_json::Value> {
    batch
        .iter()
        .map(|event| serde_json::to_value(event).expect("test envelopes serialize"))
        .collect()
}

/// A provider that accepts every envelope and records each batch it was
/// given as JSON. Receipt ids are `receipt-<n>`, numbered across calls.
#[derive(Debug)]
pub struct RecordingEventProvider {
    max_batch_size: NonZeroUsize,
    batches: Mutex<Vec<Vec<serde_json::Value>>>,
}

impl Default for RecordingEventProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingEventProvider {
    /// Creates a provider accepting up to 10 envelopes per call.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            batches: Mutex::new(Vec::new()),
        }
    }

    /// Overrides the batch limit.
    ///
    /// # Panics
    ///
    /// Panics if `max_batch_size` is zero.
    #[must_use]
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = NonZeroUsize::new(max_batch_size).expect("batch size must be > 0");
        self
    }

    /// Returns a snapshot of every batch sent, as serialized envelopes.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent_batches(&self) -> Vec<Vec<serde_json::Value>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl<T: EventModel> EventProvider<T> for RecordingEventProvider {
    fn max_batch_size(&self) -> NonZeroUsize {
        self.max_batch_size
    }

    async fn send(&self, batch: &[Event<T>]) -> Result<Vec<EventReceiptEntry>, ProviderError> {
        let mut batches = self.batches.lock().unwrap();
        let offset: usize = batches.iter().map(Vec::len).sum();
        batches.push(encode_batch(batch));

        Ok((0..batch.len())
            .map(|i| EventReceiptEntry::success(format!("receipt-{}", offset + i)))
            .collect())
    }
}

/// A provider that answers each call with the next scripted result and
/// records the batches it was given. Once the script runs out, every
/// envelope is accepted.
#[derive(Debug)]
pub struct ScriptedEventProvider {
    max_batch_size: NonZeroUsize,
    responses: Mutex<VecDeque<Result<Vec<EventReceiptEntry>, ProviderError>>>,
    batches: Mutex<Vec<Vec<serde_json::Value>>>,
}

impl ScriptedEventProvider {
    /// Creates a provider that replays `responses` in order.
    #[must_use]
    pub fn new(responses: Vec<Result<Vec<EventReceiptEntry>, ProviderError>>) -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            responses: Mutex::new(responses.into()),
            batches: Mutex::new(Vec::new()),
        }
    }

    /// Overrides the batch limit.
    ///
    /// # Panics
    ///
    /// Panics if `max_batch_size` is zero.
    #[must_use]
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = NonZeroUsize::new(max_batch_size).expect("batch size must be > 0");
        self
    }

    /// Number of `send` calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn call_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    /// Returns a snapshot of every batch sent, as serialized envelopes.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent_batches(&self) -> Vec<Vec<serde_json::Value>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl<T: EventModel> EventProvider<T> for ScriptedEventProvider {
    fn max_batch_size(&self) -> NonZeroUsize {
        self.max_batch_size
    }

    async fn send(&self, batch: &[Event<T>]) -> Result<Vec<EventReceiptEntry>, ProviderError> {
        self.batches.lock().unwrap().push(encode_batch(batch));

        match self.responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok((0..batch.len())
                .map(|i| EventReceiptEntry::success(format!("scripted-{i}")))
                .collect()),
        }
    }
}

/// A provider whose transport call always fails. Useful for testing
/// short-circuit paths.
#[derive(Debug, Default)]
pub struct FailingEventProvider {
    calls: Mutex<usize>,
}

impl FailingEventProvider {
    /// Number of `send` calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl<T: EventModel> EventProvider<T> for FailingEventProvider {
    fn max_batch_size(&self) -> NonZeroUsize {
        DEFAULT_MAX_BATCH_SIZE
    }

    async fn send(&self, _batch: &[Event<T>]) -> Result<Vec<EventReceiptEntry>, ProviderError> {
        *self.calls.lock().unwrap() += 1;
        Err(ProviderError::Transport {
            message: "service unavailable".into(),
            code: Some("ServiceUnavailableException".into()),
            request_id: None,
        })
    }
}
