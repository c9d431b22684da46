//! Trace id lookup for the `TraceHeader` field.

/// Environment variable the Lambda runtime uses for the active X-Ray trace.
pub const TRACE_ID_ENV: &str = "_X_AMZN_TRACE_ID";

/// Supplies the trace id of the current execution, if any.
pub trait TraceContext: Send + Sync {
    /// Returns the active trace id.
    fn trace_id(&self) -> Option<String>;
}

/// Reads the trace id from [`TRACE_ID_ENV`] on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvTraceContext;

impl TraceContext for EnvTraceContext {
    fn trace_id(&self) -> Option<String> {
        std::env::var(TRACE_ID_ENV)
            .ok()
            .filter(|trace_id| !trace_id.is_empty())
    }
}

/// Always reports the same trace id (or none).
#[derive(Debug, Clone, Default)]
pub struct StaticTraceContext(pub Option<String>);

impl StaticTraceContext {
    /// Reports `trace_id` on every call.
    #[must_use]
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self(Some(trace_id.into()))
    }
}

impl TraceContext for StaticTraceContext {
    fn trace_id(&self) -> Option<String> {
        self.0.clone()
    }
}
