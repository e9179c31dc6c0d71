//! Execution policy - the configuration gating redirect behavior.
//!
//! Bundles every knob recognized by the pipeline: redirect following and
//! limits, the security gates (HTTPS downgrade, trusted-domain allowlist,
//! credential preservation), response size and parsing behavior, and the
//! request-construction defaults.

use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_MAX_REDIRECTS: u32 = 10;
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;
pub const DEFAULT_MAX_URL_LENGTH: usize = 2048;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Upper bound accepted for a per-request timeout, in milliseconds.
pub const MAX_TIMEOUT_MS: u64 = 300_000;

/// Configuration governing one logical execution.
///
/// Deserializes from workbook configuration with per-field defaults, so a
/// partial policy block is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutionPolicy {
    /// Maximum redirect hops before the chain is blocked.
    pub max_redirects: u32,

    /// When false, any 3xx response is returned to the caller as-is.
    pub follow_redirects: bool,

    /// Allow an https request to be redirected to a plain http target.
    pub allow_downgrade_to_http: bool,

    /// Keep `authorization`/`cookie` headers when the redirect crosses hosts.
    pub preserve_auth_on_redirect: bool,

    /// Keep the request body across a redirect hop when the rewritten method
    /// still supports one.
    pub preserve_body_on_redirect: bool,

    /// Allowlist of domains redirects may target. Empty means no enforcement.
    /// An entry matches its own host and any subdomain of it.
    pub trusted_domains: Vec<String>,

    /// Maximum decoded response body size in bytes.
    pub max_response_size: usize,

    /// Parse `application/json` bodies into a structured value.
    pub parse_json_responses: bool,

    /// Tag `application/xml`/`text/xml` bodies as XML rather than plain text.
    pub parse_xml_responses: bool,

    /// Apportion total wall time into request/first-byte/download estimates.
    pub include_timing_details: bool,

    /// Maximum accepted request URL length.
    pub max_url_length: usize,

    /// Timeout applied when the request configuration carries none.
    pub default_timeout_ms: u64,

    /// User-Agent applied when the request configuration carries none.
    pub default_user_agent: String,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
            follow_redirects: true,
            allow_downgrade_to_http: false,
            preserve_auth_on_redirect: false,
            preserve_body_on_redirect: false,
            trusted_domains: Vec::new(),
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            parse_json_responses: true,
            parse_xml_responses: true,
            include_timing_details: true,
            max_url_length: DEFAULT_MAX_URL_LENGTH,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            default_user_agent: format!("wirehop/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ExecutionPolicy {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Whether `host` is permitted by the trusted-domain allowlist.
    ///
    /// An empty allowlist permits everything. Otherwise the host must equal
    /// an entry or be a subdomain of one, case-insensitively.
    pub fn is_trusted_host(&self, host: &str) -> bool {
        if self.trusted_domains.is_empty() {
            return true;
        }
        self.trusted_domains.iter().any(|domain| {
            if host.eq_ignore_ascii_case(domain) {
                return true;
            }
            host.len() > domain.len()
                && host[host.len() - domain.len()..].eq_ignore_ascii_case(domain)
                && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
        })
    }
}
