//! Per-file conversion outcomes.

use std::path::{Path, PathBuf};

use crate::record::ValueWarning;

/// What happened to a source file after it was converted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RelocationStatus {
    #[default]
    NotRequested,
    Moved(PathBuf),
    /// The move failed; the conversion itself still counts as successful.
    Failed(String),
}

impl RelocationStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// A spreadsheet that was written as JSON Lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub record_count: usize,
    /// Rows that fell back to key-only normalization.
    pub fallback_rows: usize,
    pub warnings: Vec<ValueWarning>,
    pub relocation: RelocationStatus,
}

/// Result of converting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Converted(ConvertedFile),
    Failed { input: PathBuf, error: String },
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            Self::Converted(file) => &file.input,
            Self::Failed { input, .. } => input,
        }
    }

    pub fn converted(&self) -> Option<&ConvertedFile> {
        match self {
            Self::Converted(file) => Some(file),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_outcome_keeps_input() {
        let outcome = FileOutcome::Failed {
            input: PathBuf::from("in/broken.xlsx"),
            error: "failed to read workbook".to_string(),
        };
        assert!(outcome.is_failed());
        assert!(outcome.converted().is_none());
        assert_eq!(outcome.input(), Path::new("in/broken.xlsx"));
    }
}
