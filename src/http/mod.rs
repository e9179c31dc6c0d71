pub mod body;
pub mod headers;
pub mod request;
pub mod response;

// Re-exports for convenience
pub use body::RequestBody;
pub use headers::OrderedHeaders;
pub use request::{HttpRequest, RedirectInfo, RequestMetadata};
pub use response::{RawBody, RawResponse};
