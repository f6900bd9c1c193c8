//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Bind listener → Run accept loop
//!
//! Shutdown (shutdown.rs):
//!     Ctrl-C → broadcast signal → accept loop stops → process exits
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
