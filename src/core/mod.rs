//! # Core Module
//!
//! The GUI-agnostic image similarity engine.
//!
//! ## Modules
//! - `scanner` - Flattens configured roots into record stubs
//! - `fingerprint` - Decodes images and builds their fingerprints
//! - `scheduler` - Worker pool and work-claim loops
//! - `similarity` - Scores a pair of fingerprints
//! - `matrix` - Triangular cache of pairwise scores
//! - `processor` - Sequences a run and answers queries
//! - `reporter` - Side-by-side facts about a matched pair

pub mod fingerprint;
pub mod matrix;
pub mod processor;
pub mod reporter;
pub mod scanner;
pub mod scheduler;
pub mod similarity;

// Re-export commonly used types
pub use fingerprint::{FingerprintRecord, GroupId, RecordId};
pub use matrix::{MatchEntry, MatchMatrix};
pub use processor::{Processor, ProcessorBuilder, ProcessorState, ResultSet};
pub use scanner::ScanRoot;
