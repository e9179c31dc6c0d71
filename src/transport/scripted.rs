//! Scripted in-memory transport.
//!
//! Replays a queued sequence of responses or failures in order and records a
//! snapshot of every request it receives. Used by this crate's own tests and
//! by embedding test runners that need deterministic exchanges.

use crate::http::request::HttpRequest;
use crate::http::response::RawResponse;
use crate::transport::{Transport, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use std::collections::VecDeque;
use std::sync::Mutex;
use url::Url;

/// What the transport saw for one exchange.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub url: Url,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl SentRequest {
    /// First value for a header name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    seen: Mutex<Vec<SentRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next response to replay.
    pub fn push_response(&self, response: RawResponse) {
        self.script.lock().unwrap().push_back(Ok(response));
    }

    /// Queue the next exchange to fail.
    pub fn push_error(&self, error: TransportError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Snapshots of every request sent so far, in order.
    pub fn requests(&self) -> Vec<SentRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        let snapshot = SentRequest {
            url: request.url.clone(),
            method: request.method.clone(),
            headers: request
                .headers
                .iter()
                .map(|(n, v)| {
                    (
                        n.as_str().to_string(),
                        v.to_str().unwrap_or_default().to_string(),
                    )
                })
                .collect(),
            body: request.body.encode(),
        };
        self.seen.lock().unwrap().push(snapshot);

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::ConnectionFailed("script exhausted".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::body::RequestBody;
    use crate::http::headers::OrderedHeaders;
    use crate::http::request::RequestMetadata;
    use http::StatusCode;
    use std::time::Duration;

    fn request(url: &str) -> HttpRequest {
        HttpRequest {
            url: Url::parse(url).unwrap(),
            method: Method::GET,
            headers: OrderedHeaders::new(),
            body: RequestBody::Empty,
            timeout: Duration::from_secs(5),
            metadata: RequestMetadata::new(),
        }
    }

    #[tokio::test]
    async fn test_replays_in_order_and_records() {
        let transport = ScriptedTransport::new();
        transport.push_response(RawResponse::new(StatusCode::OK));
        transport.push_error(TransportError::TimedOut);

        let first = transport.send(&request("http://svc.test/a")).await;
        assert!(first.is_ok());
        let second = transport.send(&request("http://svc.test/b")).await;
        assert!(matches!(second, Err(TransportError::TimedOut)));

        let seen = transport.requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].url.path(), "/a");
        assert_eq!(seen[1].url.path(), "/b");
    }

    #[tokio::test]
    async fn test_exhausted_script_fails() {
        let transport = ScriptedTransport::new();
        let result = transport.send(&request("http://svc.test/")).await;
        assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
    }
}
