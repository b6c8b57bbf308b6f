//! Error types for the media repository engine.
//!
//! Absence is not an error: `get` and `find` return empty results rather
//! than failing. Everything that can actually go wrong is enumerated here.

use crate::media::Media;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Storage-level failure while touching repository files or directories.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O operation failed; carries the operation and the path it touched.
    #[error("failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An index entry could not be serialized.
    #[error("failed to serialize index entry: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StorageError {
    /// Wrap an I/O error with the operation and path it came from.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Repository operation failure.
#[derive(Debug, Error)]
pub enum RepoError {
    /// `create` was called on a repository without a storage directory.
    #[error("media creation is not supported on a memory-only repository")]
    Unsupported,

    /// `add` was called with an ID already present in the index.
    #[error("duplicate media id {id} in repository {repo}")]
    DuplicateId { id: Uuid, repo: String },

    /// A line of the index file could not be decoded. Fatal at load time:
    /// a garbled index is not recoverable per-line.
    #[error("malformed entry in index file {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A freshly created record could not be registered. Carries the record
    /// so the caller can decide what to do with the already-written payload.
    #[error("failed to register created media {id}: {source}", id = media.id)]
    Register {
        media: Box<Media>,
        #[source]
        source: Box<RepoError>,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Top-level error surfaced by the CLI and configuration layers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Configuration loading or validation failed.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Rendering command output failed.
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    #[error(transparent)]
    Repo(#[from] RepoError),
}
