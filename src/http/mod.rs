//! HTTP translation subsystem.
//!
//! # Data Flow
//! ```text
//! RequestConfig (from a protocol bridge)
//!     → request.rs (uri, query.rs, body, headers, extensions)
//!     → handler (tower Service, via service.rs)
//!     → response.rs (ResponseWriter buffers status/headers/body)
//!     → binary.rs (base64 or raw body)
//!     → ResponseCapability (protocol response object)
//! ```

pub mod binary;
pub mod query;
pub mod request;
pub mod response;
pub mod service;

pub use request::{
    ProxyContext, RemoteAddr, RequestConfig, RequestTarget, X_AMZN_TRACE_ID, X_REQUEST_ID,
    X_STAGE,
};
pub use response::{ResponseCapability, ResponseWriter, DEFAULT_CONTENT_TYPE};
pub use service::serve;
