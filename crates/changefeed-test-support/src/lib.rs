//! Shared test fakes and utilities for Changefeed.

mod clock;
mod provider;
mod put_events;

pub use clock::FixedClock;
pub use provider::{FailingEventProvider, RecordingEventProvider, ScriptedEventProvider};
pub use put_events::ScriptedPutEventsClient;
