//! Scripted `PutEventsClient` for provider tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use changefeed_core::error::ProviderError;
use changefeed_eventbridge::client::PutEventsClient;
use changefeed_eventbridge::wire::{PutEventsRequest, PutEventsResponse, PutEventsResultEntry};

/// Replays scripted responses and records every request it receives.
/// Once the script runs out, every entry is accepted with an id of
/// `event-<n>`, numbered across calls.
#[derive(Debug, Default)]
pub struct ScriptedPutEventsClient {
    responses: Mutex<VecDeque<Result<PutEventsResponse, ProviderError>>>,
    requests: Mutex<Vec<PutEventsRequest>>,
}

impl ScriptedPutEventsClient {
    /// Creates a client that replays `responses` in order.
    #[must_use]
    pub fn new(responses: Vec<Result<PutEventsResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of every request received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<PutEventsRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of `put_events` calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PutEventsClient for ScriptedPutEventsClient {
    async fn put_events(
        &self,
        request: &PutEventsRequest,
    ) -> Result<PutEventsResponse, ProviderError> {
        let offset: usize = {
            let mut requests = self.requests.lock().unwrap();
            let offset = requests.iter().map(|r| r.entries.len()).sum();
            requests.push(request.clone());
            offset
        };

        match self.responses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(PutEventsResponse {
                failed_entry_count: 0,
                entries: (0..request.entries.len())
                    .map(|i| PutEventsResultEntry::accepted(format!("event-{}", offset + i)))
                    .collect(),
            }),
        }
    }
}
