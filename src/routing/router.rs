//! Mirror table lookup.
//!
//! # Responsibilities
//! - Map the first non-empty path segment to an upstream mirror
//! - Build the forwarded upstream URI
//! - Serialize the mirror table for the unknown-mirror fallback body
//!
//! # Design Decisions
//! - Table compiled at startup, immutable at runtime
//! - Explicit no-match rather than silent default
//! - BTreeMap so the fallback listing is deterministic

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::MirrorConfig;

/// A resolved upstream mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mirror {
    /// Upstream hostname.
    pub host: String,
    /// Path prefix prepended before forwarding.
    pub prefix: String,
}

impl Mirror {
    /// Build the URI the fetcher will request for a given client path.
    pub fn upstream_uri(&self, path: &str) -> String {
        format!("http://{}{}{}", self.host, self.prefix, path)
    }
}

/// Routes requests to upstream mirrors by their top-level path segment.
#[derive(Debug, Clone)]
pub struct MirrorRouter {
    mirrors: BTreeMap<String, Mirror>,
}

impl MirrorRouter {
    /// Compile the router from configuration.
    pub fn from_config(mirrors: &[MirrorConfig]) -> Self {
        let mirrors = mirrors
            .iter()
            .map(|m| {
                (
                    m.name.clone(),
                    Mirror {
                        host: m.host.clone(),
                        prefix: m.prefix.clone(),
                    },
                )
            })
            .collect();
        Self { mirrors }
    }

    /// Resolve a request path to its mirror, if the first non-empty segment
    /// is a configured mirror name.
    pub fn resolve(&self, path: &str) -> Option<&Mirror> {
        let segment = path.split('/').find(|s| !s.is_empty())?;
        self.mirrors.get(segment)
    }

    /// Serialized mirror table, served as the body of the unknown-mirror
    /// fallback response. Deterministic (keys in lexicographic order).
    pub fn listing(&self) -> String {
        // Infallible: the map is String -> Mirror with derived Serialize.
        serde_json::to_string_pretty(&self.mirrors).unwrap_or_default()
    }

    /// Number of configured mirrors.
    pub fn len(&self) -> usize {
        self.mirrors.len()
    }

    /// True when no mirrors are configured.
    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }
}
