//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request path ("/fedora/os/Packages/a.rpm")
//!     → router.rs (first non-empty segment → mirror table lookup)
//!     → Return: Mirror{host, prefix} or no match
//!
//! Table Compilation (at startup):
//!     MirrorConfig[]
//!     → Freeze as immutable BTreeMap
//! ```
//!
//! # Design Decisions
//! - The router is consulted only after a cache miss
//! - No match is not an error: the handler answers with the mirror listing
//! - Deterministic: same path always resolves the same mirror

pub mod router;

pub use router::{Mirror, MirrorRouter};
