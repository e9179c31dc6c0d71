//! Request construction with validation and defaulting.
//!
//! Turns a loosely-typed request configuration (typically deserialized from
//! workbook JSON) into a canonical, immutable [`HttpRequest`].

use crate::base::error::HopError;
use crate::base::policy::{ExecutionPolicy, MAX_TIMEOUT_MS};
use crate::http::body::RequestBody;
use crate::http::headers::OrderedHeaders;
use crate::http::request::{HttpRequest, RequestMetadata};
use bytes::Bytes;
use http::Method;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Ordered pairs or a plain mapping; both shapes appear in workbooks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PairsOrMap {
    Pairs(Vec<(String, String)>),
    Map(BTreeMap<String, String>),
}

impl PairsOrMap {
    fn pairs(&self) -> Vec<(&str, &str)> {
        match self {
            PairsOrMap::Pairs(p) => p.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect(),
            PairsOrMap::Map(m) => m.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect(),
        }
    }
}

/// Inbound body shape. Untagged: a bare string is text, an array of bytes is
/// raw, an object carrying `{type, data}` is an explicit descriptor, and any
/// other JSON value is a JSON body.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BodySpec {
    Text(String),
    Raw(Vec<u8>),
    Tagged {
        #[serde(rename = "type")]
        kind: String,
        data: serde_json::Value,
    },
    Json(serde_json::Value),
}

/// Loosely-typed request configuration consumed by the builder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestConfig {
    pub url: String,
    pub method: String,
    pub headers: Option<PairsOrMap>,
    pub body: Option<BodySpec>,
    pub query_string_params: Option<PairsOrMap>,
    /// Per-request timeout in milliseconds.
    pub timeout: Option<u64>,
}

/// Builds canonical requests under an [`ExecutionPolicy`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    policy: ExecutionPolicy,
}

impl RequestBuilder {
    pub fn new(policy: ExecutionPolicy) -> Self {
        Self { policy }
    }

    /// Validate and default `config` into an immutable request.
    pub fn build(&self, config: &RequestConfig) -> Result<HttpRequest, HopError> {
        let url = self.parse_url(config)?;
        let method = parse_method(&config.method)?;
        let timeout = self.parse_timeout(config)?;

        let mut headers = match &config.headers {
            Some(spec) => OrderedHeaders::from_pairs(spec.pairs())?,
            None => OrderedHeaders::new(),
        };

        let url = merge_query_params(url, config.query_string_params.as_ref());
        let body = build_body(config.body.as_ref())?;

        // Defaulting: content type from body kind, then user agent.
        if !body.is_empty() && !headers.contains("content-type") {
            if let Some(ct) = body.content_type() {
                headers.set("content-type", ct)?;
            }
        }
        if !headers.contains("user-agent") {
            headers.set("user-agent", &self.policy.default_user_agent)?;
        }

        Ok(HttpRequest {
            url,
            method,
            headers,
            body,
            timeout,
            metadata: RequestMetadata::new(),
        })
    }

    fn parse_url(&self, config: &RequestConfig) -> Result<Url, HopError> {
        if config.url.is_empty() {
            return Err(HopError::validation("request url is missing")
                .with_remedy("provide an absolute http(s) url"));
        }
        if config.url.len() > self.policy.max_url_length {
            return Err(HopError::invalid_argument("request url exceeds maximum length")
                .with_context("url_length", config.url.len())
                .with_context("max_url_length", self.policy.max_url_length));
        }
        let url = Url::parse(&config.url).map_err(|e| {
            HopError::invalid_argument("request url is malformed")
                .with_context("url", config.url.clone())
                .with_source(e)
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(HopError::invalid_argument("request url scheme is not supported")
                .with_context("scheme", url.scheme().to_string()));
        }
        Ok(url)
    }

    fn parse_timeout(&self, config: &RequestConfig) -> Result<Duration, HopError> {
        match config.timeout {
            None => Ok(self.policy.default_timeout()),
            Some(ms) if ms > MAX_TIMEOUT_MS => {
                Err(HopError::validation("timeout outside accepted range")
                    .with_context("timeout_ms", ms)
                    .with_context("max_timeout_ms", MAX_TIMEOUT_MS))
            }
            Some(ms) => Ok(Duration::from_millis(ms)),
        }
    }
}

fn parse_method(method: &str) -> Result<Method, HopError> {
    if method.is_empty() {
        return Err(HopError::validation("request method is missing"));
    }
    Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(|_| {
        HopError::invalid_argument("request method is malformed").with_context("method", method)
    })
}

fn merge_query_params(mut url: Url, params: Option<&PairsOrMap>) -> Url {
    if let Some(spec) = params {
        let pairs = spec.pairs();
        if !pairs.is_empty() {
            let mut serializer = url.query_pairs_mut();
            for (name, value) in pairs {
                serializer.append_pair(name, value);
            }
            drop(serializer);
        }
    }
    url
}

/// Body inference order: explicit string, raw byte buffer, tagged descriptor,
/// plain JSON value.
fn build_body(spec: Option<&BodySpec>) -> Result<RequestBody, HopError> {
    let spec = match spec {
        None => return Ok(RequestBody::Empty),
        Some(s) => s,
    };
    match spec {
        BodySpec::Text(s) => Ok(RequestBody::Text(s.clone())),
        BodySpec::Raw(bytes) => Ok(RequestBody::Raw(Bytes::from(bytes.clone()))),
        BodySpec::Json(serde_json::Value::Null) => Ok(RequestBody::Empty),
        BodySpec::Json(v) => Ok(RequestBody::Json(v.clone())),
        BodySpec::Tagged { kind, data } => build_tagged_body(kind, data),
    }
}

fn build_tagged_body(kind: &str, data: &serde_json::Value) -> Result<RequestBody, HopError> {
    match kind.to_ascii_lowercase().as_str() {
        "none" | "empty" => Ok(RequestBody::Empty),
        "text" => match data.as_str() {
            Some(s) => Ok(RequestBody::Text(s.to_string())),
            None => Err(HopError::invalid_argument("text body data must be a string")),
        },
        "json" => Ok(RequestBody::Json(data.clone())),
        "form" => form_pairs(data).map(RequestBody::Form),
        "raw" | "binary" => raw_bytes(data).map(RequestBody::Raw),
        other => Err(HopError::invalid_argument("unknown body type")
            .with_context("body_type", other.to_string())),
    }
}

fn form_pairs(data: &serde_json::Value) -> Result<Vec<(String, String)>, HopError> {
    let malformed = || HopError::invalid_argument("form body data must be string pairs");
    match data {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(k, v)| match v.as_str() {
                Some(s) => Ok((k.clone(), s.to_string())),
                None => Err(malformed()),
            })
            .collect(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| {
                let pair = item.as_array().ok_or_else(malformed)?;
                match (pair.first().and_then(|v| v.as_str()), pair.get(1).and_then(|v| v.as_str())) {
                    (Some(k), Some(v)) if pair.len() == 2 => Ok((k.to_string(), v.to_string())),
                    _ => Err(malformed()),
                }
            })
            .collect(),
        _ => Err(malformed()),
    }
}

fn raw_bytes(data: &serde_json::Value) -> Result<Bytes, HopError> {
    match data {
        serde_json::Value::String(s) => Ok(Bytes::from(s.clone().into_bytes())),
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let byte = item
                    .as_u64()
                    .filter(|b| *b <= u8::MAX as u64)
                    .ok_or_else(|| {
                        HopError::invalid_argument("raw body data must be bytes")
                    })?;
                out.push(byte as u8);
            }
            Ok(Bytes::from(out))
        }
        _ => Err(HopError::invalid_argument("raw body data must be bytes")),
    }
}
