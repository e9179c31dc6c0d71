//! Execution error type with a stable code taxonomy.
//!
//! Every public operation in the pipeline returns `Result<_, HopError>`
//! instead of panicking or raising across component boundaries. An error
//! carries a stable [`ErrorCode`], a human-readable message, structured
//! context (urls, counts, limits), an optional suggested remedy, and the
//! redirect chain accumulated before the failure.

use crate::http::request::RedirectInfo;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Stable error codes exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed input: url, body descriptor, header, redirect location.
    InvalidArgument,
    /// Policy rejection: insecure downgrade, timeout out of range, missing field.
    ValidationError,
    /// Redirect target outside the trusted-domain allowlist.
    PermissionDenied,
    /// Transport failure, missing location header, redirect limit exceeded.
    NetworkError,
    /// Unexpected fault; the original cause is attached as the source.
    InternalError,
    /// Response body bytes undecodable under a textual content type.
    ParseError,
    /// The per-request timeout elapsed before the transport returned.
    TimeoutError,
    /// The execution was cancelled externally mid-flight.
    AbortError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::TimeoutError => "TIMEOUT_ERROR",
            ErrorCode::AbortError => "ABORT_ERROR",
        }
    }

    /// Whether a caller wrapping the pipeline may treat this failure as a
    /// retry candidate. Validation and permission failures never are.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::NetworkError | ErrorCode::TimeoutError)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terminal pipeline failure.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct HopError {
    pub code: ErrorCode,
    pub message: String,
    /// Structured diagnostic context: urls, counts, limits.
    pub context: BTreeMap<String, serde_json::Value>,
    /// Suggested remedy, when a configuration change would avoid the failure.
    pub remedy: Option<String>,
    /// Redirect chain accumulated before the failure, for diagnosability.
    pub redirects: Vec<RedirectInfo>,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl HopError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: BTreeMap::new(),
            remedy: None,
            redirects: Vec::new(),
            source: None,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TimeoutError, message)
    }

    pub fn abort(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AbortError, message)
    }

    /// Attach one structured context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remedy = Some(remedy.into());
        self
    }

    /// Attach the redirect chain accumulated before this failure.
    pub fn with_redirects(mut self, redirects: Vec<RedirectInfo>) -> Self {
        self.redirects = redirects;
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}
