//! # Cuttle
//!
//! Finds visually similar and duplicate images across directory trees and
//! ranks them so a person can review and discard redundant copies.
//!
//! ## Core Philosophy
//! - **Never auto-delete** - Files are only removed on an explicit request
//! - **Degrade, don't abort** - An unreadable file drops out of the run
//! - **Rank, don't cluster** - Every pair gets a score; the caller picks the threshold
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and presentation layers:
//! - `core` - The similarity engine
//! - `events` - Lifecycle and progress events (GUI-ready)
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{CuttleError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
