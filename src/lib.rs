//! # wirehop
//!
//! Single-shot HTTP request execution for test runners and workbook
//! executors.
//!
//! `wirehop` runs one logical HTTP request through an explicit pipeline -
//! request construction, policy-driven redirect resolution, response
//! normalization - and returns an inspectable result. The network transport
//! is an injected capability, never opened here.
//!
//! ## Features
//!
//! - **Redirect policy**: method rewriting per status code, body
//!   preservation, chain limits
//! - **Security gates**: HTTPS-downgrade blocking, trusted-domain
//!   allowlists, cross-host credential stripping
//! - **Normalized results**: typed bodies (JSON/XML/form/text/binary),
//!   ordered headers, timing, the full redirect chain
//! - **Stable errors**: coded failures with structured context and the chain
//!   accumulated so far
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wirehop::{ExecutionContext, HttpExecutor, RequestConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let executor = HttpExecutor::new(my_transport);
//!     let config = RequestConfig {
//!         url: "https://example.com/api".to_string(),
//!         method: "GET".to_string(),
//!         ..Default::default()
//!     };
//!     let result = executor
//!         .execute(&config, &ExecutionContext::default())
//!         .await
//!         .unwrap();
//!     println!("Status: {}", result.status);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - error taxonomy and execution policy
//! - [`http`] - headers, bodies, requests, raw responses
//! - [`exec`] - the builder/resolver/processor/executor pipeline
//! - [`transport`] - the transport capability and a scripted stub
//!
//! ## Security
//!
//! Redirect hops pass explicit gates before a new request is built:
//! - HTTPS→HTTP downgrades are blocked unless explicitly allowed
//! - A non-empty trusted-domain allowlist confines redirect targets
//! - `authorization`/`cookie` are stripped when a hop crosses hosts

pub mod base;
pub mod exec;
pub mod http;
pub mod transport;

pub use base::error::{ErrorCode, HopError};
pub use base::policy::ExecutionPolicy;
pub use exec::builder::{RequestBuilder, RequestConfig};
pub use exec::executor::HttpExecutor;
pub use exec::processor::{BodyKind, ProcessedBody, ProcessedResponse, ResponseProcessor};
pub use exec::redirect::{is_redirect, redirect_method_for, RedirectDecision, RedirectResolver};
pub use exec::ExecutionContext;
pub use http::body::RequestBody;
pub use http::headers::OrderedHeaders;
pub use http::request::{HttpRequest, RedirectInfo};
pub use http::response::{RawBody, RawResponse};
pub use transport::{ScriptedTransport, Transport, TransportError};
