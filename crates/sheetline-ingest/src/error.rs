//! Error types for spreadsheet ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering or reading spreadsheets.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Spreadsheet file not found.
    #[error("spreadsheet file not found: {path}")]
    FileNotFound { path: PathBuf },

    // === Workbook Errors ===
    /// The extension is not a supported spreadsheet format.
    #[error("unsupported spreadsheet extension: {path}")]
    UnsupportedExtension { path: PathBuf },

    /// The workbook could not be opened or decoded.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// The workbook has no sheets.
    #[error("workbook has no sheets: {path}")]
    NoSheets { path: PathBuf },
}

/// Errors that can occur while moving a processed file.
#[derive(Debug, Error)]
pub enum RelocateError {
    /// The source path has no file name component.
    #[error("cannot relocate {path}: no file name")]
    InvalidSource { path: PathBuf },

    /// The destination folder could not be created.
    #[error("failed to create completed folder {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file could not be moved.
    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/in/orders.xlsx"),
        };
        assert_eq!(
            err.to_string(),
            "spreadsheet file not found: /data/in/orders.xlsx"
        );
    }

    #[test]
    fn test_relocate_error_keeps_source() {
        let err = RelocateError::Move {
            from: PathBuf::from("a.xlsx"),
            to: PathBuf::from("done/a.xlsx"),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(err.to_string(), "failed to move a.xlsx to done/a.xlsx: disk full");
        assert!(std::error::Error::source(&err).is_some());
    }
}
