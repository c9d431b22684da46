//! Delivery receipts and their aggregation across batches.

use serde::{Deserialize, Serialize};

use crate::error::{DeliveryFailureKind, NotificationDeliveryError, ProviderError};

/// Receipt for an envelope the transport accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptSuccess {
    /// Identifier the transport assigned to the delivered event.
    pub receipt_id: String,
    /// Position of the envelope within its dispatch call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_index: Option<usize>,
}

/// Receipt for an envelope the transport rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptFailure {
    /// Identifier the transport assigned, empty when none was assigned.
    pub receipt_id: String,
    /// Transport-provided reason.
    pub error_message: String,
    /// Transport-provided error code, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Position of the envelope within its dispatch call. `None` for
    /// synthetic failures that summarize a whole failed transport call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_index: Option<usize>,
}

/// Per-envelope outcome reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventReceiptEntry {
    /// The envelope was accepted.
    Success(ReceiptSuccess),
    /// The envelope was rejected.
    Failure(ReceiptFailure),
}

impl EventReceiptEntry {
    /// Builds a success entry.
    #[must_use]
    pub fn success(receipt_id: impl Into<String>) -> Self {
        Self::Success(ReceiptSuccess {
            receipt_id: receipt_id.into(),
            event_index: None,
        })
    }

    /// Builds a failure entry.
    #[must_use]
    pub fn failure(
        receipt_id: impl Into<String>,
        error_message: impl Into<String>,
        error_code: Option<String>,
    ) -> Self {
        Self::Failure(ReceiptFailure {
            receipt_id: receipt_id.into(),
            error_message: error_message.into(),
            error_code,
            event_index: None,
        })
    }

    /// Returns `true` for a success entry.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Aggregate receipt for one dispatch call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventReceipt {
    /// Accepted envelopes, in submission order.
    pub successes: Vec<ReceiptSuccess>,
    /// Rejected envelopes, in submission order.
    pub failures: Vec<ReceiptFailure>,
}

impl EventReceipt {
    /// Total number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.successes.is_empty() && self.failures.is_empty()
    }
}

/// Terminal state of a dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Every envelope was accepted.
    Succeeded,
    /// All batches were sent but at least one envelope was rejected.
    PartiallyFailed,
    /// A transport call failed outright; remaining batches were skipped.
    TransportFailed,
}

impl DispatchOutcome {
    /// Stable lowercase name, used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::PartiallyFailed => "partially_failed",
            Self::TransportFailed => "transport_failed",
        }
    }
}

/// Folds per-batch provider results into one [`EventReceipt`].
///
/// Entries are stamped with their position in the dispatch call so a failure
/// can be traced back to the model that produced it.
#[derive(Debug, Default)]
pub struct ReceiptAggregator {
    receipt: EventReceipt,
    submitted: usize,
    batches: usize,
}

impl ReceiptAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of envelopes recorded so far.
    #[must_use]
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Number of batches recorded so far.
    #[must_use]
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Records the outcome of one batch of `batch_len` envelopes.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::ReceiptMismatch` if the provider did not report
    /// exactly one entry per envelope. Nothing is recorded in that case.
    pub fn record_batch(
        &mut self,
        batch_len: usize,
        entries: Vec<EventReceiptEntry>,
    ) -> Result<(), ProviderError> {
        if entries.len() != batch_len {
            return Err(ProviderError::ReceiptMismatch {
                expected: batch_len,
                actual: entries.len(),
            });
        }

        for (offset, entry) in entries.into_iter().enumerate() {
            let event_index = Some(self.submitted + offset);
            match entry {
                EventReceiptEntry::Success(success) => {
                    self.receipt.successes.push(ReceiptSuccess {
                        event_index,
                        ..success
                    });
                }
                EventReceiptEntry::Failure(failure) => {
                    self.receipt.failures.push(ReceiptFailure {
                        event_index,
                        ..failure
                    });
                }
            }
        }

        self.submitted += batch_len;
        self.batches += 1;
        Ok(())
    }

    /// Completes the dispatch after every batch was sent.
    ///
    /// # Errors
    ///
    /// Returns a `PartialFailure` delivery error carrying every failed entry
    /// if any batch reported one.
    pub fn finish(self) -> Result<EventReceipt, NotificationDeliveryError> {
        if self.receipt.failures.is_empty() {
            return Ok(self.receipt);
        }

        let message = format!(
            "Failed to deliver {} of {} events",
            self.receipt.failures.len(),
            self.submitted
        );
        Err(NotificationDeliveryError {
            message,
            kind: DeliveryFailureKind::PartialFailure,
            failed_entries: self.receipt.failures.clone(),
            receipt: self.receipt,
        })
    }

    /// Abandons the dispatch after a transport-wide failure.
    ///
    /// The returned error carries a single synthetic entry describing the
    /// transport error, plus whatever was recorded before it.
    #[must_use]
    pub fn abort(self, error: &ProviderError) -> NotificationDeliveryError {
        let synthetic = ReceiptFailure {
            receipt_id: String::new(),
            error_message: error.to_string(),
            error_code: Some(error.code().to_owned()),
            event_index: None,
        };

        NotificationDeliveryError {
            message: format!("Failed to deliver all events: {error}"),
            kind: DeliveryFailureKind::TransportFailure,
            failed_entries: vec![synthetic],
            receipt: self.receipt,
        }
    }
}
