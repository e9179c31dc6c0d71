//! The canonical outbound request and its redirect-chain metadata.

use crate::http::body::RequestBody;
use crate::http::headers::OrderedHeaders;
use http::Method;
use std::time::Duration;
use time::OffsetDateTime;
use url::Url;

/// One followed redirect hop, recorded immutably.
#[derive(Debug, Clone)]
pub struct RedirectInfo {
    pub from_url: Url,
    pub to_url: Url,
    pub status_code: u16,
    /// Method used for the hop, after any rewrite.
    pub method_used: Method,
    pub body_preserved: bool,
    /// Cumulative hop count including this hop.
    pub redirect_count: u32,
}

/// Per-execution bookkeeping carried on the request.
///
/// `redirect_count == redirect_chain.len()` always; [`RequestMetadata::record_hop`]
/// is the only way a hop is appended, which keeps the two in step.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub redirect_count: u32,
    /// URL of the very first request, set on the first hop.
    pub original_url: Option<Url>,
    /// Append-only chain of followed hops, in order.
    pub redirect_chain: Vec<RedirectInfo>,
    pub built_at: OffsetDateTime,
}

impl RequestMetadata {
    pub fn new() -> Self {
        Self {
            redirect_count: 0,
            original_url: None,
            redirect_chain: Vec::new(),
            built_at: OffsetDateTime::now_utc(),
        }
    }

    /// Append one hop and advance the count together.
    pub fn record_hop(&mut self, info: RedirectInfo) {
        self.redirect_chain.push(info);
        self.redirect_count += 1;
        debug_assert_eq!(self.redirect_count as usize, self.redirect_chain.len());
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// A canonical, immutable outbound request.
///
/// Built once by the request builder; a followed redirect produces a new
/// value rather than mutating this one.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: Url,
    pub method: Method,
    pub headers: OrderedHeaders,
    pub body: RequestBody,
    pub timeout: Duration,
    pub metadata: RequestMetadata,
}

impl HttpRequest {
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "https"
    }
}
