//! Stream processing entry points.

pub mod stream_handlers;
