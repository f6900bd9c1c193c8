//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (one request each)
//!     → server.rs (accept loop, per-connection pipeline)
//!     → request.rs (tokenize request line into method + path)
//!     → [cache lookup, then routing, then upstream fetch]
//!     → response.rs (HTTP/1.0 framing, connection-close semantics)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{Method, RequestLine, RequestParseError};
pub use server::ProxyServer;
