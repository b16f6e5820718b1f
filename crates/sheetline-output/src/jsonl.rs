//! JSON Lines serialization.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use sheetline_model::Record;

use crate::error::OutputError;

/// Extension used for every file this crate writes.
pub const JSONL_EXTENSION: &str = "jsonl";

/// A JSON Lines file that was written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonlFile {
    pub path: PathBuf,
    pub record_count: usize,
    pub bytes: u64,
}

/// `<stem>.jsonl` for an input file.
pub fn jsonl_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    format!("{stem}.{JSONL_EXTENSION}")
}

/// Serialize records as compact JSON objects separated by `\n`, without a
/// trailing newline.
pub fn to_json_lines(records: &[Record]) -> Result<String, OutputError> {
    let mut lines = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let line = serde_json::to_string(record)
            .map_err(|source| OutputError::Serialize { index, source })?;
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Write records to `path`, creating parent folders as needed.
pub fn write_json_lines(path: &Path, records: &[Record]) -> Result<JsonlFile, OutputError> {
    let contents = to_json_lines(records)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let write_error = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(contents.as_bytes()).map_err(write_error)?;
    writer.flush().map_err(write_error)?;

    debug!(
        path = %path.display(),
        record_count = records.len(),
        bytes = contents.len(),
        "wrote json lines"
    );
    Ok(JsonlFile {
        path: path.to_path_buf(),
        record_count: records.len(),
        bytes: contents.len() as u64,
    })
}
