//! # Error Module
//!
//! Error types for the similarity engine.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, ids, what went wrong
//! - **Degrade, don't abort** - a failed file excludes one record, never the run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum CuttleError {
    #[error("Fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Failed to remove {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that occur while enumerating roots.
///
/// These are recorded in `ScanResult::skipped` and logged, never returned
/// from a run.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while fingerprinting an image
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Image is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Failed to open image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resampling failed: {0}")]
    Resize(String),

    #[error("Invalid fingerprint resolution: {value} (must be at least 1)")]
    InvalidResolution { value: u16 },
}

/// Errors from the worker pool
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Failed to build worker pool with {workers} threads: {reason}")]
    PoolBuild { workers: usize, reason: String },

    #[error("Failed to spawn processing thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Errors from the query and mutation surface
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    #[error("No completed run to query")]
    NotReady,

    #[error("Unknown record id: {id}")]
    UnknownRecord { id: u32 },

    #[error("A record cannot be paired with itself (id {id})")]
    SelfPair { id: u32 },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, CuttleError>;
