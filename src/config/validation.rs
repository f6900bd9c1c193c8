//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check mirror table integrity (unique names, resolvable upstream URLs)
//! - Validate value ranges (timeouts > 0, connection limit > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic configuration error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address {0:?}")]
    InvalidBindAddress(String),

    #[error("max_connections must be greater than zero")]
    ZeroConnectionLimit,

    #[error("mirror name must not be empty")]
    EmptyMirrorName,

    #[error("mirror name {0:?} must not contain '/'")]
    MirrorNameContainsSlash(String),

    #[error("duplicate mirror name {0:?}")]
    DuplicateMirrorName(String),

    #[error("mirror {0:?} has an invalid upstream ({1})")]
    InvalidUpstream(String, String),

    #[error("mirror {0:?} prefix must be empty or start with '/'")]
    InvalidPrefix(String),

    #[error("cache.cacheable_patterns must not contain empty patterns")]
    EmptyCachePattern,

    #[error("upstream timeouts must be greater than zero")]
    ZeroTimeout,
}

/// Validate a parsed configuration, collecting every semantic error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroConnectionLimit);
    }

    let mut seen = HashSet::new();
    for mirror in &config.mirrors {
        if mirror.name.is_empty() {
            errors.push(ValidationError::EmptyMirrorName);
        } else if mirror.name.contains('/') {
            errors.push(ValidationError::MirrorNameContainsSlash(mirror.name.clone()));
        } else if !seen.insert(mirror.name.as_str()) {
            errors.push(ValidationError::DuplicateMirrorName(mirror.name.clone()));
        }

        if !mirror.prefix.is_empty() && !mirror.prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPrefix(mirror.name.clone()));
        }

        // The forwarded URI is http://{host}{prefix}{path}; reject hosts
        // that cannot form a valid URL before the proxy starts serving.
        let base = format!("http://{}{}", mirror.host, mirror.prefix);
        if mirror.host.is_empty() {
            errors.push(ValidationError::InvalidUpstream(
                mirror.name.clone(),
                "empty host".to_string(),
            ));
        } else if let Err(e) = url::Url::parse(&base) {
            errors.push(ValidationError::InvalidUpstream(
                mirror.name.clone(),
                e.to_string(),
            ));
        }
    }

    if config.cache.cacheable_patterns.iter().any(|p| p.is_empty()) {
        errors.push(ValidationError::EmptyCachePattern);
    }

    if config.upstream.connect_timeout_secs == 0 || config.upstream.fetch_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::MirrorConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.listener.max_connections = 0;
        config.upstream.fetch_timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidBindAddress(
            "not-an-address".to_string()
        )));
        assert!(errors.contains(&ValidationError::ZeroConnectionLimit));
        assert!(errors.contains(&ValidationError::ZeroTimeout));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn rejects_duplicate_and_malformed_mirrors() {
        let mut config = ProxyConfig::default();
        config.mirrors.push(MirrorConfig {
            name: "fedora".to_string(),
            host: "dl.fedoraproject.org".to_string(),
            prefix: "/pub".to_string(),
        });
        config.mirrors.push(MirrorConfig {
            name: "fedora".to_string(),
            host: "other.example.org".to_string(),
            prefix: String::new(),
        });
        config.mirrors.push(MirrorConfig {
            name: "bad".to_string(),
            host: "host.example.org".to_string(),
            prefix: "pub".to_string(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateMirrorName("fedora".to_string())));
        assert!(errors.contains(&ValidationError::InvalidPrefix("bad".to_string())));
    }

    #[test]
    fn rejects_empty_host() {
        let mut config = ProxyConfig::default();
        config.mirrors.push(MirrorConfig {
            name: "centos".to_string(),
            host: String::new(),
            prefix: String::new(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidUpstream(name, _)] if name == "centos"
        ));
    }
}
