//! Cacheability policy.
//!
//! # Design Decisions
//! - Substring match, not a strict suffix check: `filelist.gz` and `vmlinuz`
//!   match anywhere in the path. Faithful to the reference behavior.
//! - Evaluated on both the read and the write path

/// Decides whether a request path qualifies for local persistence.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    patterns: Vec<String>,
}

impl CachePolicy {
    /// Build a policy from the configured pattern list.
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// A path is cacheable iff any pattern appears anywhere in it.
    pub fn is_cacheable(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| path.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CachePolicy {
        CachePolicy::new(vec![
            ".rpm".to_string(),
            ".iso".to_string(),
            "vmlinuz".to_string(),
        ])
    }

    #[test]
    fn matches_extension_patterns() {
        let p = policy();
        assert!(p.is_cacheable("/fedora/os/Packages/bash-5.2.rpm"));
        assert!(p.is_cacheable("/fedora/os/disk1.iso"));
    }

    #[test]
    fn matches_substring_not_just_suffix() {
        let p = policy();
        // Mid-path occurrences count; this mirrors the reference behavior.
        assert!(p.is_cacheable("/fedora/images/vmlinuz-6.1"));
        assert!(p.is_cacheable("/fedora/a.rpm.metadata"));
    }

    #[test]
    fn rejects_unmatched_paths() {
        let p = policy();
        assert!(!p.is_cacheable("/fedora/repodata/repomd.json"));
        assert!(!p.is_cacheable("/fedora/os/"));
    }

    #[test]
    fn empty_pattern_list_caches_nothing() {
        let p = CachePolicy::new(Vec::new());
        assert!(!p.is_cacheable("/fedora/os/disk1.iso"));
    }
}
