//! Terminal response normalization.
//!
//! Converts the final raw response of an execution into an inspectable
//! result: normalized headers, a typed body, timing, and the accumulated
//! redirect chain. Body handling is deliberately forgiving about mislabeled
//! content types: a JSON body that fails to parse degrades to text instead
//! of failing the execution.

use crate::base::error::HopError;
use crate::base::policy::ExecutionPolicy;
use crate::exec::ExecutionContext;
use crate::http::headers::OrderedHeaders;
use crate::http::request::{HttpRequest, RedirectInfo};
use crate::http::response::{RawBody, RawResponse};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use http::StatusCode;
use std::time::{Duration, Instant};
use time::OffsetDateTime;

/// Typed classification of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    None,
    Json,
    Xml,
    Form,
    Text,
    Binary,
}

/// Normalized response body.
#[derive(Debug, Clone)]
pub struct ProcessedBody {
    pub kind: BodyKind,
    /// Parsed value, present for `Json`.
    pub data: Option<serde_json::Value>,
    /// Raw text, present for all textual kinds.
    pub text: Option<String>,
    /// Raw bytes, always present (empty for `None`).
    pub bytes: Bytes,
    pub size: usize,
}

impl ProcessedBody {
    fn none() -> Self {
        Self {
            kind: BodyKind::None,
            data: None,
            text: None,
            bytes: Bytes::new(),
            size: 0,
        }
    }
}

/// Timing breakdown for one execution.
///
/// `total` is wall-clock across the whole operation, including redirect hops.
/// The request/first-byte/download figures are estimates apportioned from
/// `total` (10/80/10%): sub-phase timing is not observable at this layer.
#[derive(Debug, Clone)]
pub struct Timing {
    pub started: OffsetDateTime,
    pub total: Duration,
    pub request: Option<Duration>,
    pub first_byte: Option<Duration>,
    pub download: Option<Duration>,
}

/// The normalized result handed back to the caller.
#[derive(Debug, Clone)]
pub struct ProcessedResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: OrderedHeaders,
    pub body: ProcessedBody,
    pub timing: Timing,
    pub redirects: Vec<RedirectInfo>,
    pub execution_id: String,
    pub request_id: String,
    /// Wrapper overhead of normalization itself, excluding wall timing.
    pub processing_time: Duration,
}

/// Normalizes terminal responses under an [`ExecutionPolicy`].
#[derive(Debug, Clone)]
pub struct ResponseProcessor {
    policy: ExecutionPolicy,
}

impl ResponseProcessor {
    pub fn new(policy: ExecutionPolicy) -> Self {
        Self { policy }
    }

    /// Normalize `response`. `started_at`/`started` mark the beginning of the
    /// whole execution, hops included.
    pub async fn process(
        &self,
        response: RawResponse,
        request: &HttpRequest,
        context: &ExecutionContext,
        started_at: OffsetDateTime,
        started: Instant,
    ) -> Result<ProcessedResponse, HopError> {
        let processing_start = Instant::now();
        let chain = &request.metadata.redirect_chain;

        // Declared-size guard before reading anything.
        if let Some(declared) = response.content_length() {
            if declared > self.policy.max_response_size as u64 {
                return Err(self
                    .size_error(declared as usize)
                    .with_redirects(chain.clone()));
            }
        }

        let media_type = response.media_type().unwrap_or_default();
        let status = response.status;
        let headers = OrderedHeaders::from_header_map(&response.headers);

        let bytes = self
            .read_body(response.body)
            .await
            .map_err(|e| e.with_redirects(chain.clone()))?;

        let body = if status == StatusCode::NO_CONTENT || bytes.is_empty() {
            ProcessedBody::none()
        } else {
            self.decode_body(bytes, &media_type)
                .map_err(|e| e.with_redirects(chain.clone()))?
        };

        let total = started.elapsed();
        let timing = if self.policy.include_timing_details {
            Timing {
                started: started_at,
                total,
                request: Some(total.mul_f64(0.10)),
                first_byte: Some(total.mul_f64(0.80)),
                download: Some(total.mul_f64(0.10)),
            }
        } else {
            Timing {
                started: started_at,
                total,
                request: None,
                first_byte: None,
                download: None,
            }
        };

        Ok(ProcessedResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
            timing,
            redirects: chain.clone(),
            execution_id: context.execution_id.clone(),
            request_id: context.request_id.clone(),
            processing_time: processing_start.elapsed(),
        })
    }

    /// Drain the body, enforcing the size limit as bytes arrive so an
    /// oversized stream never buffers past the cap.
    async fn read_body(&self, body: RawBody) -> Result<Bytes, HopError> {
        let max = self.policy.max_response_size;
        let bytes = match body {
            RawBody::None => Bytes::new(),
            RawBody::Bytes(b) => b,
            RawBody::Stream(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(|e| {
                        HopError::network("response body read failed").with_source(e)
                    })?;
                    if buf.len() + chunk.len() > max {
                        return Err(self.size_error(buf.len() + chunk.len()));
                    }
                    buf.extend_from_slice(&chunk);
                }
                buf.freeze()
            }
        };
        if bytes.len() > max {
            return Err(self.size_error(bytes.len()));
        }
        Ok(bytes)
    }

    fn size_error(&self, size: usize) -> HopError {
        tracing::warn!(
            size,
            max = self.policy.max_response_size,
            "response body exceeds size limit"
        );
        HopError::invalid_argument("response body exceeds maximum size")
            .with_context("size", size)
            .with_context("max_response_size", self.policy.max_response_size)
            .with_remedy("raise maxResponseSize if a body this large is expected")
    }

    fn decode_body(&self, bytes: Bytes, media_type: &str) -> Result<ProcessedBody, HopError> {
        let is_json = media_type == "application/json" || media_type.ends_with("+json");
        let is_xml = media_type == "application/xml"
            || media_type == "text/xml"
            || media_type.ends_with("+xml");
        let is_form = media_type == "application/x-www-form-urlencoded";
        let is_textual = is_json || is_xml || is_form || media_type.starts_with("text/");

        let size = bytes.len();
        let text = match String::from_utf8(bytes.to_vec()) {
            Ok(text) => text,
            Err(_) if is_textual => {
                return Err(HopError::parse("response body is not valid UTF-8")
                    .with_context("content_type", media_type.to_string())
                    .with_context("size", size));
            }
            Err(_) => {
                // Undeclared or binary content type: hand the bytes back as-is.
                return Ok(ProcessedBody {
                    kind: BodyKind::Binary,
                    data: None,
                    text: None,
                    bytes,
                    size,
                });
            }
        };

        let kind_and_data = if is_json && self.policy.parse_json_responses {
            match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(value) => (BodyKind::Json, Some(value)),
                Err(e) => {
                    // Servers frequently mislabel content types; degrade
                    // rather than fail the whole execution.
                    tracing::debug!(error = %e, "json body failed to parse, degrading to text");
                    (BodyKind::Text, None)
                }
            }
        } else if is_xml && self.policy.parse_xml_responses {
            (BodyKind::Xml, None)
        } else if is_form {
            (BodyKind::Form, None)
        } else {
            (BodyKind::Text, None)
        };

        Ok(ProcessedBody {
            kind: kind_and_data.0,
            data: kind_and_data.1,
            text: Some(text),
            bytes,
            size,
        })
    }
}
