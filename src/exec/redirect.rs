//! Per-hop redirect classification and next-request construction.
//!
//! Given one raw response and the request that produced it, the resolver
//! either declares "not a redirect", blocks the hop (limit or security
//! violation), or produces the next request to send. Blocking happens before
//! any new request is built; a followed hop never mutates the prior request.

use crate::base::error::HopError;
use crate::base::policy::ExecutionPolicy;
use crate::http::body::RequestBody;
use crate::http::request::{HttpRequest, RedirectInfo};
use crate::http::response::RawResponse;
use http::{Method, StatusCode};
use url::Url;

/// Outcome of classifying one raw response.
#[derive(Debug)]
pub enum RedirectDecision {
    /// Terminal response; hand it to the processor.
    NotRedirect,
    /// The hop violates a limit or security gate.
    Blocked(HopError),
    /// The next request to send, with the chain advanced.
    Followed(Box<HttpRequest>),
}

/// Whether `status` is a followable redirect. 304 is a cache validation
/// response, not a redirect.
pub fn is_redirect(status: StatusCode) -> bool {
    status.is_redirection() && status != StatusCode::NOT_MODIFIED
}

/// Method used for the next hop, as a pure function of the original method
/// and the redirect status:
///
/// - 303 always becomes GET
/// - 301/302 rewrite body methods (POST/PUT/PATCH) to GET
/// - 307/308 preserve the method unconditionally
pub fn redirect_method_for(method: &Method, status: StatusCode) -> Method {
    match status.as_u16() {
        303 => Method::GET,
        301 | 302 if method_allows_body(method) => Method::GET,
        _ => method.clone(),
    }
}

fn method_allows_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

fn same_host(a: &Url, b: &Url) -> bool {
    match (a.host_str(), b.host_str()) {
        (Some(x), Some(y)) => x.eq_ignore_ascii_case(y),
        _ => false,
    }
}

/// Applies the redirect policy one hop at a time.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    policy: ExecutionPolicy,
}

impl RedirectResolver {
    pub fn new(policy: ExecutionPolicy) -> Self {
        Self { policy }
    }

    /// Classify `response` and, for a followed hop, build the next request.
    pub fn resolve(&self, response: &RawResponse, request: &HttpRequest) -> RedirectDecision {
        if !self.policy.follow_redirects {
            return RedirectDecision::NotRedirect;
        }
        if !is_redirect(response.status) {
            return RedirectDecision::NotRedirect;
        }

        let chain = || request.metadata.redirect_chain.clone();
        let count = request.metadata.redirect_count;

        // The chain-length guard runs before the location header is read.
        if count >= self.policy.max_redirects {
            return RedirectDecision::Blocked(
                HopError::network("redirect limit exceeded")
                    .with_context("redirect_count", count)
                    .with_context("max_redirects", self.policy.max_redirects)
                    .with_context("url", request.url.as_str())
                    .with_remedy("raise maxRedirects if this chain length is expected")
                    .with_redirects(chain()),
            );
        }

        let location = match response.headers.get(http::header::LOCATION) {
            Some(value) => value,
            None => {
                return RedirectDecision::Blocked(
                    HopError::network("redirect response carries no location header")
                        .with_context("status", response.status.as_u16())
                        .with_context("url", request.url.as_str())
                        .with_redirects(chain()),
                );
            }
        };
        let location = match location.to_str() {
            Ok(s) => s,
            Err(_) => {
                return RedirectDecision::Blocked(
                    HopError::invalid_argument("location header is not valid UTF-8")
                        .with_context("url", request.url.as_str())
                        .with_redirects(chain()),
                );
            }
        };

        // Absolute first; fall back to resolving relative to the current URL.
        let target = match Url::parse(location).or_else(|_| request.url.join(location)) {
            Ok(url) => url,
            Err(e) => {
                return RedirectDecision::Blocked(
                    HopError::invalid_argument("redirect location is unparsable")
                        .with_context("location", location.to_string())
                        .with_context("url", request.url.as_str())
                        .with_source(e)
                        .with_redirects(chain()),
                );
            }
        };

        // Security gates, before any new request is built.
        if request.is_secure() && target.scheme() != "https" && !self.policy.allow_downgrade_to_http
        {
            return RedirectDecision::Blocked(
                HopError::validation("redirect downgrades https to an insecure scheme")
                    .with_context("from", request.url.as_str())
                    .with_context("to", target.as_str())
                    .with_remedy("set allowDowngradeToHttp if the downgrade is intentional")
                    .with_redirects(chain()),
            );
        }
        let target_host = target.host_str().unwrap_or_default();
        if !self.policy.is_trusted_host(target_host) {
            return RedirectDecision::Blocked(
                HopError::permission_denied("redirect target is outside the trusted domains")
                    .with_context("host", target_host.to_string())
                    .with_context(
                        "trusted_domains",
                        serde_json::json!(self.policy.trusted_domains),
                    )
                    .with_redirects(chain()),
            );
        }

        let status = response.status;
        let next_method = redirect_method_for(&request.method, status);

        // Body preservation is evaluated against the rewritten method and the
        // real status of this hop.
        let had_body = !request.body.is_empty();
        let method_changed = next_method != request.method;
        let preserve_body = self.policy.preserve_body_on_redirect
            && had_body
            && method_allows_body(&next_method)
            && !(matches!(status.as_u16(), 307 | 308) && method_changed);
        let body = if preserve_body {
            request.body.clone()
        } else {
            RequestBody::Empty
        };

        let mut headers = request.headers.clone();
        if had_body && !preserve_body {
            headers.remove("content-type");
            headers.remove("content-length");
        }
        if !same_host(&request.url, &target) && !self.policy.preserve_auth_on_redirect {
            headers.remove("authorization");
            headers.remove("cookie");
        }
        let host_value = match target.port() {
            Some(port) => format!("{}:{}", target_host, port),
            None => target_host.to_string(),
        };
        if let Err(e) = headers.set("host", &host_value) {
            return RedirectDecision::Blocked(
                HopError::internal("failed to rewrite host header")
                    .with_context("host", host_value)
                    .with_source(e)
                    .with_redirects(chain()),
            );
        }

        let mut metadata = request.metadata.clone();
        if metadata.original_url.is_none() {
            metadata.original_url = Some(request.url.clone());
        }
        metadata.record_hop(RedirectInfo {
            from_url: request.url.clone(),
            to_url: target.clone(),
            status_code: status.as_u16(),
            method_used: next_method.clone(),
            body_preserved: preserve_body,
            redirect_count: count + 1,
        });

        tracing::debug!(
            from = %request.url,
            to = %target,
            status = status.as_u16(),
            method = %next_method,
            hop = count + 1,
            "following redirect"
        );

        RedirectDecision::Followed(Box::new(HttpRequest {
            url: target,
            method: next_method,
            headers,
            body,
            timeout: request.timeout,
            metadata,
        }))
    }
}
