//! Stream handlers: map change records to notifications and dispatch them.

use changefeed_core::clock::Clock;
use changefeed_core::error::DispatchError;
use changefeed_core::handler::EventHandler;
use changefeed_core::notification::ChangeNotification;
use changefeed_core::receipt::EventReceipt;
use tracing::{debug, info, instrument};

use crate::domain::change::ChangeRecord;
use crate::domain::error::StreamProcessError;
use crate::domain::stream_event::StreamEvent;

/// Publishes one notification per publishable record, in record order.
/// Records of any other kind are skipped.
///
/// # Errors
///
/// Returns the handler's `DispatchError` unchanged.
#[instrument(skip(handler, records, clock), fields(records = records.len()))]
pub async fn process_change_records(
    handler: &EventHandler<ChangeNotification>,
    records: &[ChangeRecord],
    clock: &dyn Clock,
) -> Result<EventReceipt, DispatchError> {
    let notifications: Vec<ChangeNotification> = records
        .iter()
        .filter_map(|record| {
            let notification = record.to_notification(clock);
            if notification.is_none() {
                debug!(
                    entity_id = %record.entity_id,
                    change_kind = ?record.change_kind,
                    "skipping unpublished change kind"
                );
            }
            notification
        })
        .collect();

    info!(notifications = notifications.len(), "dispatching change notifications");
    handler.notify(notifications).await
}

/// Decodes the change records carried by `event` and publishes them.
///
/// # Errors
///
/// Returns `StreamProcessError::Stream` if a record has no usable key, and
/// `StreamProcessError::Dispatch` if publishing fails.
pub async fn process_stream_event(
    handler: &EventHandler<ChangeNotification>,
    event: &StreamEvent,
    key_attribute: &str,
    clock: &dyn Clock,
) -> Result<EventReceipt, StreamProcessError> {
    let records = event.change_records(key_attribute)?;
    Ok(process_change_records(handler, &records, clock).await?)
}
