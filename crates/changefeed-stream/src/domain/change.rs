//! Change records and their mapping to notifications.

use changefeed_core::clock::Clock;
use changefeed_core::notification::{ChangeNotification, ChangeStatus};
use serde::{Deserialize, Serialize};

/// Kind of change reported by the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    /// A new item was written.
    Insert,
    /// An existing item was modified.
    Modify,
    /// An item was deleted.
    Remove,
    /// Any kind this consumer does not publish.
    #[serde(other)]
    Other,
}

impl ChangeKind {
    /// Notification status for this kind, or `None` if it is not published.
    #[must_use]
    pub fn status(self) -> Option<ChangeStatus> {
        match self {
            Self::Insert => Some(ChangeStatus::Added),
            Self::Modify => Some(ChangeStatus::Updated),
            Self::Remove => Some(ChangeStatus::Removed),
            Self::Other => None,
        }
    }
}

/// One change to one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    /// Identifier of the changed entity.
    pub entity_id: String,
    /// What happened to it.
    pub change_kind: ChangeKind,
}

impl ChangeRecord {
    /// Creates a record.
    pub fn new(entity_id: impl Into<String>, change_kind: ChangeKind) -> Self {
        Self {
            entity_id: entity_id.into(),
            change_kind,
        }
    }

    /// Maps the record to a notification stamped with `clock`. Kinds that
    /// are not published map to `None`.
    #[must_use]
    pub fn to_notification(&self, clock: &dyn Clock) -> Option<ChangeNotification> {
        self.change_kind
            .status()
            .map(|status| ChangeNotification::new(self.entity_id.clone(), status, clock))
    }
}
