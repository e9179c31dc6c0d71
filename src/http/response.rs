//! Raw transport-level response.

use bytes::Bytes;
use futures::stream::BoxStream;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use std::fmt;

/// Body as returned by a transport: absent, fully buffered, or a byte stream.
pub enum RawBody {
    None,
    Bytes(Bytes),
    Stream(BoxStream<'static, std::io::Result<Bytes>>),
}

impl fmt::Debug for RawBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawBody::None => f.write_str("RawBody::None"),
            RawBody::Bytes(b) => write!(f, "RawBody::Bytes({} bytes)", b.len()),
            RawBody::Stream(_) => f.write_str("RawBody::Stream(..)"),
        }
    }
}

/// One raw response exchange, as handed back by the [`crate::transport::Transport`]
/// capability. The pipeline classifies it (redirect or terminal) and, for a
/// terminal response, normalizes it.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: RawBody,
}

impl RawResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: RawBody::None,
        }
    }

    /// Append a header. Invalid names or values are silently skipped; this
    /// constructor exists for stubs and transports that already validated.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(n), Ok(v)) = (
            name.parse::<http::header::HeaderName>(),
            value.parse::<http::header::HeaderValue>(),
        ) {
            self.headers.append(n, v);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = RawBody::Bytes(body.into());
        self
    }

    /// Set a JSON body and the matching content type.
    pub fn with_json(self, value: &serde_json::Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(value.to_string())
    }

    pub fn with_stream(mut self, stream: BoxStream<'static, std::io::Result<Bytes>>) -> Self {
        self.body = RawBody::Stream(stream);
        self
    }

    /// Declared `content-length`, when present and numeric.
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(http::header::CONTENT_LENGTH)?
            .to_str()
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    /// Media type portion of the `content-type` header, lowercased.
    pub fn media_type(&self) -> Option<String> {
        let value = self.headers.get(CONTENT_TYPE)?.to_str().ok()?;
        Some(
            value
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .to_ascii_lowercase(),
        )
    }
}
