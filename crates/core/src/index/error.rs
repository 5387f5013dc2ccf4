//! Error types for the metadata index.

use thiserror::Error;

use crate::fileio::FsError;
use crate::vault::VaultWalkerError;

#[derive(Debug, Error)]
pub enum IndexError {
    /// An operation ran before `initialize()` (or a first build) completed.
    #[error("index has not been loaded; call initialize() first")]
    NotLoaded,

    #[error("an index build is already in progress")]
    BuildInProgress,

    #[error("failed to stat {path}: {source}")]
    FileStat {
        path: String,
        #[source]
        source: FsError,
    },

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: FsError,
    },

    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: String,
        #[source]
        source: FsError,
    },

    #[error("failed to create directory {path}: {source}")]
    DirCreate {
        path: String,
        #[source]
        source: FsError,
    },

    #[error("corrupt index file {path}: {source}")]
    IndexParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize index: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to scan memory bank: {0}")]
    Walk(#[from] VaultWalkerError),
}
