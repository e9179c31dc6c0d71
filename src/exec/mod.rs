//! The request execution pipeline.
//!
//! Build once, then send/evaluate-redirect repeatedly until a non-redirect
//! response is reached, then normalize:
//!
//! - [`builder::RequestBuilder`] - configuration → canonical request
//! - [`redirect::RedirectResolver`] - per-hop classification and next-request construction
//! - [`processor::ResponseProcessor`] - terminal response → normalized result
//! - [`executor::HttpExecutor`] - the loop composing the above over a transport

pub mod builder;
pub mod executor;
pub mod processor;
pub mod redirect;

// Re-exports for convenience
pub use builder::{RequestBuilder, RequestConfig};
pub use executor::HttpExecutor;
pub use processor::{ProcessedBody, ProcessedResponse, ResponseProcessor};
pub use redirect::{RedirectDecision, RedirectResolver};

/// Correlation identifiers threaded through one execution.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub execution_id: String,
    pub request_id: String,
}

impl ExecutionContext {
    pub fn new(execution_id: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            execution_id: execution_id.into(),
            request_id: request_id.into(),
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            execution_id: "unknown".to_string(),
            request_id: "unknown".to_string(),
        }
    }
}
