//! Caching HTTP reverse proxy for package-repository mirrors.
//!
//! The first path segment of a request selects an upstream mirror; a
//! whitelisted set of file types is transparently persisted on local disk
//! and served from cache on subsequent requests.

pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod routing;
pub mod upstream;

pub use config::ProxyConfig;
pub use http::ProxyServer;
pub use lifecycle::Shutdown;
pub use net::Listener;
