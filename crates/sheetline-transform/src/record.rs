//! Per-row normalization.
//!
//! Each field gets a canonical key; placeholder dashes become empty strings;
//! everything else goes through temporal conversion. A row whose values
//! cannot be represented falls back to key-only normalization instead of
//! failing the file.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use sheetline_model::{CellValue, Record, RowOutcome, ValueWarning};

use crate::header::normalize_header;
use crate::temporal::{TemporalOptions, TemporalOutcome, convert_temporal};

/// Trimmed text values that mean "no data".
///
/// ASCII double hyphen, em dash, en dash, and minus sign.
pub const PLACEHOLDER_TOKENS: [&str; 4] = ["--", "\u{2014}", "\u{2013}", "\u{2212}"];

/// Returns true when `text` is a "no data" placeholder.
pub fn is_placeholder(text: &str) -> bool {
    let trimmed = text.trim();
    PLACEHOLDER_TOKENS.contains(&trimmed)
}

/// Options for row processing.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordOptions {
    pub temporal: TemporalOptions,
    /// Emit empty cells as `null` instead of leaving the field out.
    pub include_empty: bool,
}

impl RecordOptions {
    #[must_use]
    pub fn with_temporal(mut self, temporal: TemporalOptions) -> Self {
        self.temporal = temporal;
        self
    }

    #[must_use]
    pub fn with_include_empty(mut self, enabled: bool) -> Self {
        self.include_empty = enabled;
        self
    }
}

/// Errors that abort value normalization for a whole row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("column `{column}` holds a number that JSON cannot represent")]
    NonFiniteNumber { column: String },
}

/// Normalize one row.
///
/// Later fields whose keys collide with an earlier one overwrite its value
/// but keep the earlier position.
pub fn process_row(row: &[(String, CellValue)], options: &RecordOptions) -> RowOutcome {
    match normalize_values(row, options) {
        Ok((record, warnings)) => RowOutcome::Normalized { record, warnings },
        Err(error) => {
            debug!(reason = %error, "falling back to key-only normalization");
            RowOutcome::Fallback {
                record: normalize_keys_only(row, options),
                reason: error.to_string(),
            }
        }
    }
}

fn normalize_values(
    row: &[(String, CellValue)],
    options: &RecordOptions,
) -> Result<(Record, Vec<ValueWarning>), RowError> {
    let mut record = Record::new();
    let mut warnings = Vec::new();
    for (label, value) in row {
        if value.is_empty() && !options.include_empty {
            continue;
        }
        let key = normalize_header(label);
        let normalized = match value.as_text() {
            Some(text) if is_placeholder(text) => Value::String(String::new()),
            _ => match convert_temporal(value, &options.temporal) {
                TemporalOutcome::Converted { text, .. } => Value::String(text),
                TemporalOutcome::Unchanged => json_value(&key, value)?,
                TemporalOutcome::Failed(error) => {
                    warnings.push(ValueWarning {
                        column: key.clone(),
                        value: value.to_string(),
                        message: error.to_string(),
                    });
                    json_value(&key, value)?
                }
            },
        };
        record.insert(key, normalized);
    }
    Ok((record, warnings))
}

fn json_value(key: &str, value: &CellValue) -> Result<Value, RowError> {
    value.to_json().ok_or_else(|| RowError::NonFiniteNumber {
        column: key.to_string(),
    })
}

fn normalize_keys_only(row: &[(String, CellValue)], options: &RecordOptions) -> Record {
    row.iter()
        .filter(|(_, value)| options.include_empty || !value.is_empty())
        .map(|(label, value)| (normalize_header(label), value.to_json_lossy()))
        .collect()
}
