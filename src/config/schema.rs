//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the caching mirror proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Upstream mirror definitions, keyed by the first request path segment.
    pub mirrors: Vec<MirrorConfig>,

    /// On-disk cache settings.
    pub cache: CacheConfig,

    /// Upstream fetch settings.
    pub upstream: UpstreamConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// One upstream mirror. Requests whose first path segment equals `name`
/// are forwarded to `http://{host}{prefix}{request path}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MirrorConfig {
    /// Top-level path segment selecting this mirror (e.g., "fedora").
    pub name: String,

    /// Upstream hostname (e.g., "dl.fedoraproject.org").
    pub host: String,

    /// Path prefix prepended before forwarding (e.g., "/pub"). May be empty.
    #[serde(default)]
    pub prefix: String,
}

/// On-disk cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root directory. Cached object path = root + request path with
    /// the leading slash stripped.
    pub root: PathBuf,

    /// Substring patterns deciding cacheability. A path qualifies when any
    /// pattern appears anywhere in it; these are not strict suffixes.
    pub cacheable_patterns: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/var/cache/mirror-cache"),
            cacheable_patterns: [
                ".rpm",
                ".img",
                ".sqlite.bz2",
                ".xml",
                ".xml.gz",
                ".qcow2",
                ".raw.xz",
                ".iso",
                "filelist.gz",
                "vmlinuz",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Upstream fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total fetch timeout (request through full body) in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            fetch_timeout_secs: 30,
        }
    }
}
