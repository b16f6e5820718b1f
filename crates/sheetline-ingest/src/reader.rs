//! First-sheet reading.
//!
//! The first non-empty row of the first sheet is the header row. Every later
//! row that has at least one non-empty cell becomes a [`RawRow`] pairing each
//! header label with its cell.

use std::collections::BTreeSet;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use sheetline_model::{CellValue, RawRow};

use crate::discovery::is_spreadsheet;
use crate::error::{IngestError, Result};

/// Label used for header cells with no text.
const EMPTY_HEADER: &str = "__EMPTY";

/// Source of spreadsheet rows.
pub trait SheetReader {
    /// Read the first sheet of the workbook at `path` as ordered rows.
    fn read_first_sheet(&self, path: &Path) -> Result<Vec<RawRow>>;
}

/// [`SheetReader`] backed by calamine, with native date decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineReader;

impl SheetReader for CalamineReader {
    fn read_first_sheet(&self, path: &Path) -> Result<Vec<RawRow>> {
        if !path.is_file() {
            return Err(IngestError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        if !is_spreadsheet(path) {
            return Err(IngestError::UnsupportedExtension {
                path: path.to_path_buf(),
            });
        }

        let workbook_error = |message: String| IngestError::Workbook {
            path: path.to_path_buf(),
            message,
        };
        let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
        let Some(sheet) = workbook.sheet_names().first().cloned() else {
            return Err(IngestError::NoSheets {
                path: path.to_path_buf(),
            });
        };
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| workbook_error(e.to_string()))?;

        let grid: Vec<Vec<CellValue>> = range
            .rows()
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();
        let rows = rows_from_grid(grid);
        debug!(
            path = %path.display(),
            sheet = %sheet,
            row_count = rows.len(),
            "read first sheet"
        );
        Ok(rows)
    }
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(value) => CellValue::Text(value.clone()),
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Float(value) => CellValue::Number(*value),
        Data::Bool(value) => CellValue::Bool(*value),
        Data::DateTime(value) if value.is_duration() => CellValue::Number(value.as_f64()),
        Data::DateTime(value) => value
            .as_datetime()
            .map_or(CellValue::Number(value.as_f64()), CellValue::DateTime),
        Data::DateTimeIso(value) => parse_iso_datetime(value)
            .map_or_else(|| CellValue::Text(value.clone()), CellValue::DateTime),
        Data::DurationIso(value) => CellValue::Text(value.clone()),
        Data::Error(error) => CellValue::Text(error.to_string()),
    }
}

/// ISO values stored by OpenDocument sheets.
fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

fn is_blank_row(row: &[CellValue]) -> bool {
    row.iter().all(|cell| match cell {
        CellValue::Empty => true,
        CellValue::Text(text) => text.trim().is_empty(),
        _ => false,
    })
}

/// Turn a decoded cell grid into labelled rows.
///
/// Leading blank rows are skipped, the next row supplies the labels, and
/// blank data rows are dropped. Short rows are padded with empty cells.
pub fn rows_from_grid(grid: Vec<Vec<CellValue>>) -> Vec<RawRow> {
    let mut rows = grid.into_iter().skip_while(|row| is_blank_row(row));
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let labels = header_labels(&header);

    rows.filter(|row| !is_blank_row(row))
        .map(|row| {
            let mut cells = row.into_iter();
            labels
                .iter()
                .map(|label| (label.clone(), cells.next().unwrap_or(CellValue::Empty)))
                .collect()
        })
        .collect()
}

/// Build unique labels from a header row.
///
/// Blank header cells become `__EMPTY`, and repeated labels get `_1`, `_2`, ...
/// suffixes so no column is dropped.
pub fn header_labels(header: &[CellValue]) -> Vec<String> {
    let mut used = BTreeSet::new();
    header
        .iter()
        .map(|cell| {
            let text = cell.to_string();
            let base = if text.trim().is_empty() {
                EMPTY_HEADER.to_string()
            } else {
                text
            };
            let mut label = base.clone();
            let mut suffix = 1usize;
            while used.contains(&label) {
                label = format!("{base}_{suffix}");
                suffix += 1;
            }
            used.insert(label.clone());
            label
        })
        .collect()
}
