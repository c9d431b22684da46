//! Clock abstraction for deterministic envelope timestamps.

use chrono::{DateTime, Utc};

/// Source of the `created_at` timestamps stamped on notifications and
/// envelopes.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
