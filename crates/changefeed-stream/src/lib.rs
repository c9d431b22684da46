//! Changefeed stream consumer.
//!
//! Turns ordered change-stream records into change notifications and hands
//! them to the notification handler.

pub mod application;
pub mod domain;
