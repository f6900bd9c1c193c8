//! Cache subsystem.
//!
//! # Data Flow
//! ```text
//! Request path
//!     → policy.rs (substring cacheability predicate)
//!     → store.rs (derive on-disk path, lookup / write-through store)
//!
//! Lookup hit:  open file → stream to client in 2 MiB chunks
//! Population:  fetched body → .part file → atomic rename into place
//! ```
//!
//! # Design Decisions
//! - The cache check strictly precedes upstream routing
//! - Entries are created once and never updated in place or evicted
//! - Cacheability is checked on both read and write

pub mod policy;
pub mod store;

pub use policy::CachePolicy;
pub use store::{CacheError, CacheHit, CacheStore, StoreOutcome, READ_CHUNK_SIZE};
