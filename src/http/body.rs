//! Tagged request body for methods that send data.

use bytes::Bytes;

/// Request body as a closed sum type.
///
/// Each non-empty kind carries an inferred content type, applied at build
/// time when the caller set none. The redirect body-preservation rules match
/// exhaustively over this enum.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body (GET, HEAD, DELETE).
    #[default]
    Empty,
    /// Plain text, sent as UTF-8.
    Text(String),
    /// Structured JSON, serialized on encode.
    Json(serde_json::Value),
    /// Form pairs, percent-encoded on encode.
    Form(Vec<(String, String)>),
    /// Raw bytes, sent as-is.
    Raw(Bytes),
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        match self {
            RequestBody::Empty => 0,
            RequestBody::Raw(b) => b.len(),
            RequestBody::Text(s) => s.len(),
            _ => self.encode().len(),
        }
    }

    /// Content type inferred from the body kind, for defaulting.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Text(_) => Some("text/plain; charset=utf-8"),
            RequestBody::Json(_) => Some("application/json"),
            RequestBody::Form(_) => Some("application/x-www-form-urlencoded"),
            RequestBody::Raw(_) => Some("application/octet-stream"),
        }
    }

    /// Wire bytes for this body.
    pub fn encode(&self) -> Bytes {
        match self {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Text(s) => Bytes::from(s.clone()),
            RequestBody::Json(v) => Bytes::from(v.to_string()),
            RequestBody::Form(pairs) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                    .finish();
                Bytes::from(encoded)
            }
            RequestBody::Raw(b) => b.clone(),
        }
    }
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Text(s)
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Text(s.to_owned())
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(v: serde_json::Value) -> Self {
        RequestBody::Json(v)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        RequestBody::Raw(Bytes::from(v))
    }
}

impl From<Bytes> for RequestBody {
    fn from(b: Bytes) -> Self {
        RequestBody::Raw(b)
    }
}
