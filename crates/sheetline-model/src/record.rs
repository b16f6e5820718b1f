//! Normalized records and per-row processing outcomes.

use serde_json::{Map, Value};

/// One normalized spreadsheet row, keyed by canonical field key.
///
/// Backed by an insertion-ordered map so serialized fields follow the
/// original column order.
pub type Record = Map<String, Value>;

/// A non-fatal problem with a single cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueWarning {
    /// Canonical key of the column the value belongs to.
    pub column: String,
    /// The raw value that was kept.
    pub value: String,
    pub message: String,
}

/// Result of processing one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Every field went through placeholder and temporal normalization.
    Normalized {
        record: Record,
        /// Values kept unchanged because their temporal conversion failed.
        warnings: Vec<ValueWarning>,
    },
    /// Value normalization failed; only the keys were normalized.
    Fallback { record: Record, reason: String },
}

impl RowOutcome {
    pub fn record(&self) -> &Record {
        match self {
            Self::Normalized { record, .. } | Self::Fallback { record, .. } => record,
        }
    }

    pub fn into_record(self) -> Record {
        match self {
            Self::Normalized { record, .. } | Self::Fallback { record, .. } => record,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn warnings(&self) -> &[ValueWarning] {
        match self {
            Self::Normalized { warnings, .. } => warnings,
            Self::Fallback { .. } => &[],
        }
    }
}
