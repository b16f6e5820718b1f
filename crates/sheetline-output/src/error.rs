//! Error types for writing and merging JSON Lines files.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing a converted file.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to serialize record {index}: {source}")]
    Serialize {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to create output folder {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors that abort a merge pass. Sources are never deleted after one of these.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("failed to read merge source {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A merged file name would overwrite one of the sources.
    #[error("merged file {path} would overwrite a merge source")]
    TargetIsSource { path: PathBuf },

    #[error("failed to write merged file {path} ({written} already written): {source}")]
    WriteMerged {
        path: PathBuf,
        /// Merged files completed before the failure.
        written: usize,
        #[source]
        source: io::Error,
    },
}
