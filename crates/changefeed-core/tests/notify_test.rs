//! End-to-end dispatch tests for `EventHandler` against in-memory providers.

use std::sync::Arc;

use changefeed_core::error::{BuildError, DeliveryFailureKind, DispatchError};
use changefeed_core::handler::{EmitOptions, EventHandler};
use changefeed_core::notification::{ChangeNotification, ChangeStatus};
use changefeed_core::provider::EventProvider;
use changefeed_core::receipt::EventReceiptEntry;
use changefeed_test_support::{
    FailingEventProvider, FixedClock, RecordingEventProvider, ScriptedEventProvider,
};

const SOURCE: &str = "myorg.product.stream";

fn notifications(count: usize) -> Vec<ChangeNotification> {
    let clock = FixedClock::standard();
    (0..count)
        .map(|i| ChangeNotification::new(format!("prod-{i}"), ChangeStatus::Added, &clock))
        .collect()
}

fn handler_for<P>(provider: &Arc<P>) -> EventHandler<ChangeNotification>
where
    P: EventProvider<ChangeNotification> + 'static,
{
    let provider: Arc<dyn EventProvider<ChangeNotification>> = Arc::<P>::clone(provider);
    EventHandler::new(provider, SOURCE)
        .unwrap()
        .with_clock(Arc::new(FixedClock::standard()))
}

#[tokio::test]
async fn test_three_notifications_all_delivered() {
    // Arrange
    let provider = Arc::new(RecordingEventProvider::new());
    let handler = handler_for(&provider);

    // Act
    let receipt = handler.notify(notifications(3)).await.unwrap();

    // Assert
    assert_eq!(receipt.successes.len(), 3);
    assert!(receipt.failures.is_empty());
    let batches = provider.sent_batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0]["metadata"]["event_name"], "CHANGE_NOTIFICATION");
    assert_eq!(batches[0][0]["metadata"]["event_source"], SOURCE);
    assert_eq!(batches[0][0]["data"]["status"], "ADDED");
}

#[tokio::test]
async fn test_fifteen_notifications_split_into_ten_and_five() {
    // Arrange
    let provider = Arc::new(RecordingEventProvider::new());
    let handler = handler_for(&provider);

    // Act
    let receipt = handler.notify(notifications(15)).await.unwrap();

    // Assert
    let sizes: Vec<usize> = provider.sent_batches().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![10, 5]);
    assert_eq!(receipt.successes.len(), 15);
    for (i, success) in receipt.successes.iter().enumerate() {
        assert_eq!(success.receipt_id, format!("receipt-{i}"));
        assert_eq!(success.event_index, Some(i));
    }
}

#[tokio::test]
async fn test_every_batch_shares_one_correlation_id() {
    let provider = Arc::new(RecordingEventProvider::new());
    let handler = handler_for(&provider);

    handler.notify(notifications(15)).await.unwrap();

    let batches = provider.sent_batches();
    let first = batches[0][0]["metadata"]["correlation_id"].clone();
    assert!(first.as_str().is_some_and(|id| !id.is_empty()));
    assert!(
        batches
            .iter()
            .flatten()
            .all(|event| event["metadata"]["correlation_id"] == first)
    );
}

#[tokio::test]
async fn test_rejected_entry_reports_partial_failure() {
    // Arrange
    let provider = Arc::new(ScriptedEventProvider::new(vec![Ok(vec![
        EventReceiptEntry::success("a"),
        EventReceiptEntry::failure("", "internal error", Some("InternalFailure".into())),
        EventReceiptEntry::success("c"),
    ])]));
    let handler = handler_for(&provider);

    // Act
    let result = handler.notify(notifications(3)).await;

    // Assert
    match result {
        Err(DispatchError::Delivery(error)) => {
            assert_eq!(error.kind, DeliveryFailureKind::PartialFailure);
            assert_eq!(error.failed_entries.len(), 1);
            assert_eq!(error.failed_entries[0].event_index, Some(1));
            assert_eq!(error.receipt.successes.len(), 2);
        }
        other => panic!("expected Delivery error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rejections_in_first_batch_do_not_stop_the_second() {
    // Arrange
    let mut first_batch = vec![EventReceiptEntry::failure("", "bad entry", None)];
    first_batch.extend((1..10).map(|i| EventReceiptEntry::success(format!("ok-{i}"))));
    let provider = Arc::new(ScriptedEventProvider::new(vec![Ok(first_batch)]));
    let handler = handler_for(&provider);

    // Act
    let result = handler.notify(notifications(12)).await;

    // Assert
    assert_eq!(provider.call_count(), 2);
    match result {
        Err(DispatchError::Delivery(error)) => {
            assert_eq!(error.message, "Failed to deliver 1 of 12 events");
            assert_eq!(error.receipt.successes.len(), 11);
        }
        other => panic!("expected Delivery error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_failure_short_circuits() {
    // Arrange
    let provider = Arc::new(FailingEventProvider::default());
    let handler = handler_for(&provider);

    // Act
    let result = handler.notify(notifications(15)).await;

    // Assert
    assert_eq!(provider.call_count(), 1);
    match result {
        Err(DispatchError::Delivery(error)) => {
            assert_eq!(error.kind, DeliveryFailureKind::TransportFailure);
            assert_eq!(error.failed_entries.len(), 1);
            assert!(error.message.starts_with("Failed to deliver all events: "));
            assert_eq!(
                error.failed_entries[0].error_code.as_deref(),
                Some("ServiceUnavailableException")
            );
            assert!(error.receipt.is_empty());
        }
        other => panic!("expected Delivery error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_input_makes_no_calls() {
    let provider = Arc::new(RecordingEventProvider::new());
    let handler = handler_for(&provider);

    let receipt = handler.notify(Vec::new()).await.unwrap();

    assert!(receipt.is_empty());
    assert!(provider.sent_batches().is_empty());
}

#[tokio::test]
async fn test_emit_options_reach_every_envelope() {
    // Arrange
    let provider = Arc::new(RecordingEventProvider::new().with_max_batch_size(2));
    let handler = handler_for(&provider);
    let options = EmitOptions::default()
        .with_correlation_id("corr-7")
        .with_metadata("tenant", "acme");

    // Act
    handler.emit(notifications(3), options).await.unwrap();

    // Assert
    let batches = provider.sent_batches();
    assert_eq!(batches.len(), 2);
    for event in batches.iter().flatten() {
        assert_eq!(event["metadata"]["correlation_id"], "corr-7");
        assert_eq!(event["metadata"]["tenant"], "acme");
        assert_eq!(event["metadata"]["created_at"], "2026-01-15T10:00:00Z");
    }
}

#[tokio::test]
async fn test_reserved_metadata_key_is_a_build_error() {
    let provider = Arc::new(RecordingEventProvider::new());
    let handler = handler_for(&provider);

    let result = handler
        .emit(
            notifications(1),
            EmitOptions::default().with_metadata("event_name", "SPOOFED"),
        )
        .await;

    assert!(matches!(
        result,
        Err(DispatchError::Build(BuildError::ReservedMetadataKey(key))) if key == "event_name"
    ));
    assert!(provider.sent_batches().is_empty());
}

#[test]
fn test_blank_event_source_is_rejected() {
    let provider: Arc<dyn EventProvider<ChangeNotification>> =
        Arc::new(RecordingEventProvider::new());

    let result = EventHandler::new(provider, "my org");

    assert!(matches!(result, Err(BuildError::InvalidEventSource(_))));
}
