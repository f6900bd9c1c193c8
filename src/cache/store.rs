//! Filesystem-backed cache store.
//!
//! # Responsibilities
//! - Derive the on-disk path for a request path (pure and deterministic)
//! - Lookup: stream a cached object back in bounded chunks
//! - Store: write-through population with atomic rename
//!
//! # Design Decisions
//! - Entries hold the upstream body bytes only; the status line is framed
//!   fresh on every hit
//! - Writes go to a `.part` file and rename into place, so readers never
//!   observe partial content
//! - A per-destination in-flight map makes concurrent populations of the
//!   same object single-writer: first successful writer wins
//! - File I/O goes through tokio::fs, so it never stalls the accept loop

use std::path::{Path, PathBuf};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::cache::policy::CachePolicy;
use crate::config::CacheConfig;

/// Cached objects are streamed to the client in chunks of this size to bound
/// peak memory for large objects (package archives, install images).
pub const READ_CHUNK_SIZE: usize = 2 * 1024 * 1024;

/// Error type for cache operations. Filesystem failures are not masked;
/// they fail the current request without touching other connections.
#[derive(Debug, thiserror::Error)]
#[error("cache I/O failure at {path}: {source}")]
pub struct CacheError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl CacheError {
    fn new(path: &Path, source: std::io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Outcome of a store attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The object was written and renamed into place.
    Stored,
    /// A file already exists at the destination; nothing was written.
    AlreadyCached,
    /// The path does not satisfy the cacheability policy.
    NotCacheable,
    /// Another connection is populating the same destination right now.
    WriteInFlight,
}

/// An open cached object ready to be streamed to the client.
pub struct CacheHit {
    file: File,
    path: PathBuf,
}

impl CacheHit {
    /// On-disk path of the entry, for logging.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stream the entry into `writer` in [`READ_CHUNK_SIZE`] chunks.
    /// Returns the number of bytes copied.
    pub async fn copy_to<W>(mut self, writer: &mut W) -> Result<u64, CacheError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        let mut total = 0u64;
        loop {
            let n = self
                .file
                .read(&mut buf)
                .await
                .map_err(|e| CacheError::new(&self.path, e))?;
            if n == 0 {
                break;
            }
            writer
                .write_all(&buf[..n])
                .await
                .map_err(|e| CacheError::new(&self.path, e))?;
            total += n as u64;
        }
        writer
            .flush()
            .await
            .map_err(|e| CacheError::new(&self.path, e))?;
        Ok(total)
    }
}

/// Write-through filesystem cache rooted at a configurable directory.
pub struct CacheStore {
    root: PathBuf,
    policy: CachePolicy,
    /// Destinations currently being written, keyed by final path.
    in_flight: DashMap<PathBuf, ()>,
}

impl CacheStore {
    /// Build the store from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            root: config.root.clone(),
            policy: CachePolicy::new(config.cacheable_patterns.clone()),
            in_flight: DashMap::new(),
        }
    }

    /// On-disk path for a request path: cache root + request path with the
    /// leading slashes stripped. Pure function of its inputs.
    pub fn entry_path(&self, request_path: &str) -> PathBuf {
        self.root.join(request_path.trim_start_matches('/'))
    }

    /// Whether the policy admits this path.
    pub fn is_cacheable(&self, request_path: &str) -> bool {
        self.policy.is_cacheable(request_path)
    }

    /// `..` components would resolve outside the cache root after the join;
    /// such paths never touch the disk, in either direction.
    fn escapes_root(request_path: &str) -> bool {
        request_path.split('/').any(|segment| segment == "..")
    }

    /// Look up a cached object. A hit requires a regular file at the derived
    /// path and a cacheable request path; everything else is a miss.
    pub async fn lookup(&self, request_path: &str) -> Result<Option<CacheHit>, CacheError> {
        if !self.policy.is_cacheable(request_path) || Self::escapes_root(request_path) {
            return Ok(None);
        }

        let path = self.entry_path(request_path);
        let metadata = match fs::metadata(&path).await {
            Ok(md) => md,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::new(&path, e)),
        };
        if !metadata.is_file() {
            return Ok(None);
        }

        let file = File::open(&path)
            .await
            .map_err(|e| CacheError::new(&path, e))?;
        Ok(Some(CacheHit { file, path }))
    }

    /// Populate the cache with the body of a fetched object.
    ///
    /// No-op when the path is not cacheable, the destination already exists,
    /// or another connection is writing it. Parent directories are created
    /// on demand.
    pub async fn store(
        &self,
        request_path: &str,
        content: &[u8],
    ) -> Result<StoreOutcome, CacheError> {
        if !self.policy.is_cacheable(request_path) || Self::escapes_root(request_path) {
            return Ok(StoreOutcome::NotCacheable);
        }

        let dest = self.entry_path(request_path);
        match fs::try_exists(&dest).await {
            Ok(true) => return Ok(StoreOutcome::AlreadyCached),
            Ok(false) => {}
            Err(e) => return Err(CacheError::new(&dest, e)),
        }

        match self.in_flight.entry(dest.clone()) {
            Entry::Occupied(_) => return Ok(StoreOutcome::WriteInFlight),
            Entry::Vacant(slot) => {
                slot.insert(());
            }
        }
        let _guard = InFlightGuard {
            map: &self.in_flight,
            key: dest.clone(),
        };

        let result = self.write_atomic(&dest, content).await;
        if result.is_ok() {
            tracing::info!(path = %dest.display(), bytes = content.len(), "STORED");
        }
        result.map(|_| StoreOutcome::Stored)
    }

    async fn write_atomic(&self, dest: &Path, content: &[u8]) -> Result<(), CacheError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::new(parent, e))?;
        }

        // Single writer per destination is guaranteed by the in-flight map,
        // so a deterministic temp name is safe.
        let tmp = PathBuf::from(format!("{}.part", dest.display()));
        if let Err(e) = fs::write(&tmp, content).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(CacheError::new(&tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, dest).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(CacheError::new(dest, e));
        }
        Ok(())
    }
}

/// Removes the in-flight marker when a store attempt finishes, on success or
/// on error.
struct InFlightGuard<'a> {
    map: &'a DashMap<PathBuf, ()>,
    key: PathBuf,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_at(root: &Path) -> CacheStore {
        CacheStore::from_config(&CacheConfig {
            root: root.to_path_buf(),
            cacheable_patterns: vec![".rpm".to_string(), ".iso".to_string()],
        })
    }

    #[test]
    fn entry_path_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());

        let a = store.entry_path("/fedora/os/disk1.iso");
        let b = store.entry_path("/fedora/os/disk1.iso");
        assert_eq!(a, b);
        assert_eq!(a, dir.path().join("fedora/os/disk1.iso"));
    }

    #[tokio::test]
    async fn store_then_lookup_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());

        let outcome = store.store("/fedora/os/disk1.iso", b"iso bytes").await.unwrap();
        assert_eq!(outcome, StoreOutcome::Stored);

        let hit = store.lookup("/fedora/os/disk1.iso").await.unwrap().unwrap();
        let mut out = std::io::Cursor::new(Vec::new());
        let copied = hit.copy_to(&mut out).await.unwrap();
        assert_eq!(copied, 9);
        assert_eq!(out.into_inner(), b"iso bytes");
    }

    #[tokio::test]
    async fn store_creates_parent_directories_and_leaves_no_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());

        store
            .store("/fedora/releases/40/x/images/boot.iso", b"x")
            .await
            .unwrap();

        let dest = dir.path().join("fedora/releases/40/x/images/boot.iso");
        assert!(dest.is_file());
        assert!(!PathBuf::from(format!("{}.part", dest.display())).exists());
    }

    #[tokio::test]
    async fn non_cacheable_paths_are_never_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());

        let outcome = store.store("/fedora/repodata/repomd.json", b"x").await.unwrap();
        assert_eq!(outcome, StoreOutcome::NotCacheable);
        assert!(!store.entry_path("/fedora/repodata/repomd.json").exists());
    }

    #[tokio::test]
    async fn lookup_requires_cacheable_path_even_if_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());

        let path = store.entry_path("/fedora/repodata/repomd.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"stray file").unwrap();

        assert!(store.lookup("/fedora/repodata/repomd.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn existing_entries_are_never_updated_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());

        store.store("/fedora/a.rpm", b"first").await.unwrap();
        let outcome = store.store("/fedora/a.rpm", b"second").await.unwrap();
        assert_eq!(outcome, StoreOutcome::AlreadyCached);

        let content = std::fs::read(store.entry_path("/fedora/a.rpm")).unwrap();
        assert_eq!(content, b"first");
    }

    #[tokio::test]
    async fn parent_components_never_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root");
        std::fs::create_dir(&root).unwrap();
        let store = store_at(&root);

        // Would resolve to a sibling of the root after the join.
        let outcome = store.store("/fedora/../../escape.iso", b"x").await.unwrap();
        assert_eq!(outcome, StoreOutcome::NotCacheable);
        assert!(!dir.path().join("escape.iso").exists());

        // Nor can a file planted outside the root be read through the cache.
        std::fs::write(dir.path().join("escape.iso"), b"outside").unwrap();
        assert!(store.lookup("/fedora/../../escape.iso").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn copy_to_streams_entries_larger_than_one_chunk() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());

        let content: Vec<u8> = (0..READ_CHUNK_SIZE * 2 + 123)
            .map(|i| (i % 251) as u8)
            .collect();
        store.store("/fedora/os/huge.iso", &content).await.unwrap();

        let hit = store.lookup("/fedora/os/huge.iso").await.unwrap().unwrap();
        let mut out = std::io::Cursor::new(Vec::new());
        let copied = hit.copy_to(&mut out).await.unwrap();
        assert_eq!(copied as usize, content.len());
        assert_eq!(out.into_inner(), content);
    }

    #[tokio::test]
    async fn directory_at_entry_path_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path());

        std::fs::create_dir_all(store.entry_path("/fedora/dir.iso")).unwrap();
        assert!(store.lookup("/fedora/dir.iso").await.unwrap().is_none());
    }
}
