//! Per-invocation context handed to every handler.

use serde::Serialize;

/// Metadata of the invocation being processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationContext {
    /// Runtime-assigned id of this invocation.
    pub request_id: String,

    /// Log stream this process writes to. Quoted in provisioning responses.
    pub log_stream_name: String,

    /// Wall-clock deadline in epoch milliseconds.
    pub deadline_ms: Option<u64>,

    pub invoked_function_arn: Option<String>,
}

impl InvocationContext {
    pub fn new(request_id: impl Into<String>, log_stream_name: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            log_stream_name: log_stream_name.into(),
            deadline_ms: None,
            invoked_function_arn: None,
        }
    }

    pub fn with_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.deadline_ms = Some(deadline_ms);
        self
    }

    pub fn with_invoked_function_arn(mut self, arn: impl Into<String>) -> Self {
        self.invoked_function_arn = Some(arn.into());
        self
    }
}
