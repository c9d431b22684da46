//! Change notification domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::event::EventModel;

/// Kind of change a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeStatus {
    /// The entity was created.
    Added,
    /// The entity was deleted.
    Removed,
    /// The entity was modified.
    Updated,
}

/// Notification that an entity changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotification {
    /// Identifier of the changed entity.
    pub entity_id: String,
    /// What happened to the entity.
    pub status: ChangeStatus,
    /// When the notification was created (UTC).
    pub created_at: DateTime<Utc>,
}

impl ChangeNotification {
    /// Creates a notification stamped with the clock's current time.
    #[must_use]
    pub fn new(entity_id: impl Into<String>, status: ChangeStatus, clock: &dyn Clock) -> Self {
        Self {
            entity_id: entity_id.into(),
            status,
            created_at: clock.now(),
        }
    }
}

impl EventModel for ChangeNotification {
    const MODEL_NAME: &'static str = "ChangeNotification";
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    struct StoppedClock;

    impl Clock for StoppedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
        }
    }

    #[test]
    fn test_change_notification_serializes_status_in_upper_case() {
        let notification = ChangeNotification::new("42", ChangeStatus::Added, &StoppedClock);

        let json = serde_json::to_value(&notification).unwrap();

        assert_eq!(json["entity_id"], "42");
        assert_eq!(json["status"], "ADDED");
        assert_eq!(json["created_at"], "2026-01-15T10:00:00Z");
    }

    #[test]
    fn test_change_notification_event_name() {
        assert_eq!(ChangeNotification::event_name(), "CHANGE_NOTIFICATION");
        assert_eq!(ChangeNotification::EVENT_VERSION, "v1");
    }
}
