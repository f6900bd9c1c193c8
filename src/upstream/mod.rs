//! Upstream fetch subsystem.
//!
//! # Data Flow
//! ```text
//! Cache miss + resolved mirror
//!     → fetcher.rs (GET http://{host}{prefix}{path}, bounded timeouts)
//!     → Ok(body)                        → store + relay to client
//!     → Err(Status{status,reason,body}) → relay upstream failure verbatim
//!     → Err(Transport)                  → 502 to the client
//! ```

pub mod fetcher;

pub use fetcher::{UpstreamError, UpstreamFetcher};
