//! Shared application state.

use std::sync::Arc;

use changefeed_core::clock::Clock;
use changefeed_core::handler::EventHandler;
use changefeed_core::notification::ChangeNotification;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Publishes change notifications to the bus.
    pub handler: Arc<EventHandler<ChangeNotification>>,
    /// Clock used to stamp notifications.
    pub clock: Arc<dyn Clock>,
    /// Stream key attribute holding the entity id.
    pub key_attribute: Arc<str>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        handler: Arc<EventHandler<ChangeNotification>>,
        clock: Arc<dyn Clock>,
        key_attribute: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            handler,
            clock,
            key_attribute: key_attribute.into(),
        }
    }
}
