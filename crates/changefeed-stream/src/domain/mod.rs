//! Change records and the stream event documents that carry them.

pub mod change;
pub mod error;
pub mod stream_event;
