//! Changefeed Core: change-notification dispatch pipeline.
//!
//! Turns domain change models into `{data, metadata}` envelopes, slices them
//! into transport-sized batches, hands each batch to an [`EventProvider`]
//! and folds the per-entry outcomes into a single [`EventReceipt`].
//! It contains no transport code.
//!
//! [`EventProvider`]: provider::EventProvider
//! [`EventReceipt`]: receipt::EventReceipt

pub mod batch;
pub mod builder;
pub mod clock;
pub mod error;
pub mod event;
pub mod handler;
pub mod notification;
pub mod provider;
pub mod receipt;
