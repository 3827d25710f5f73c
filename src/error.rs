//! Centralized error types for mailstow.
//!
//! Only run-fatal conditions live here. Per-message conditions (no key
//! match, individual file-write failures) are reported as
//! [`OutcomeRecord`](crate::model::outcome::OutcomeRecord) data and never
//! abort a run.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mailstow library.
#[derive(Error, Debug)]
pub enum StowError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The drop folder does not exist or is not a directory.
    #[error("Drop folder not found: {0}")]
    DropFolderNotFound(PathBuf),

    /// The reference directory exists but cannot be read.
    #[error("Cannot read reference directory '{path}': {source}")]
    ReferenceDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The output root cannot be created or written at all.
    #[error("Cannot prepare output root '{path}': {source}")]
    OutputRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A message file could not be decoded as an RFC 5322 message.
    #[error("Cannot decode message '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    /// The requested extraction variant is not in the registry.
    #[error("Unknown extraction variant '{0}'")]
    UnknownVariant(String),

    /// The message source failed before any messages were delivered.
    #[error("Message source error: {0}")]
    Connector(String),
}

/// Convenience alias for `Result<T, StowError>`.
pub type Result<T> = std::result::Result<T, StowError>;

impl StowError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
