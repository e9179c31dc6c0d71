//! The transport capability.
//!
//! The pipeline never opens connections itself; it hands the current request
//! to an injected [`Transport`] and gets back a raw response or a failure.
//! Anything satisfying "given method/url/headers/body/timeout, return
//! status/headers/body or fail" qualifies: a real network client or the
//! scripted stub shipped here.

use crate::http::request::HttpRequest;
use crate::http::response::RawResponse;
use async_trait::async_trait;
use thiserror::Error;

pub mod scripted;

pub use scripted::{ScriptedTransport, SentRequest};

/// Failure modes a transport may report for one exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("transport timed out")]
    TimedOut,
    #[error("transport aborted")]
    Aborted,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Performs one request/response exchange. Opaque to the pipeline.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse, TransportError>;
}
