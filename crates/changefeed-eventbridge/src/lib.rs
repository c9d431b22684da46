//! Changefeed EventBridge: PutEvents-backed event provider.
//!
//! Encodes envelopes as EventBridge `PutEvents` entries, sends one request
//! per batch through a [`PutEventsClient`] and maps the per-entry results
//! back into receipt entries.
//!
//! [`PutEventsClient`]: client::PutEventsClient

pub mod cache;
pub mod client;
pub mod provider;
pub mod trace;
pub mod wire;
