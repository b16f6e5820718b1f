//! File discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Extensions (lowercase) of workbook formats the reader can decode.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "xlsb", "ods"];

/// Returns true when the path has a spreadsheet extension (case-insensitive).
pub fn is_spreadsheet(path: &Path) -> bool {
    has_extension(path, SPREADSHEET_EXTENSIONS)
}

/// Lists all spreadsheet files directly inside a directory.
///
/// Returns files sorted by filename.
pub fn list_spreadsheet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    list_files_with_extensions(dir, SPREADSHEET_EXTENSIONS)
}

/// Lists files directly inside `dir` whose extension matches one of
/// `extensions` (case-insensitive). Subdirectories are not descended into.
///
/// Returns files sorted by filename.
pub fn list_files_with_extensions(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        if path.is_file() && has_extension(&path, extensions) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        for name in &[
            "b_orders.xlsx",
            "a_stock.XLS",
            "c_notes.txt",
            "d_legacy.ods",
            "e_output.jsonl",
        ] {
            std::fs::write(dir.path().join(name), "data").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.xlsx")).unwrap();

        dir
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_list_spreadsheet_files_sorted() {
        let dir = create_test_dir();
        let files = list_spreadsheet_files(dir.path()).unwrap();

        assert_eq!(
            names(&files),
            vec!["a_stock.XLS", "b_orders.xlsx", "d_legacy.ods"]
        );
    }

    #[test]
    fn test_list_other_extensions() {
        let dir = create_test_dir();
        let files = list_files_with_extensions(dir.path(), &["jsonl"]).unwrap();
        assert_eq!(names(&files), vec!["e_output.jsonl"]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = list_spreadsheet_files(&missing).unwrap_err();
        assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_is_spreadsheet() {
        assert!(is_spreadsheet(Path::new("x/Report.XLSX")));
        assert!(is_spreadsheet(Path::new("old.xls")));
        assert!(!is_spreadsheet(Path::new("data.csv")));
        assert!(!is_spreadsheet(Path::new("xlsx")));
    }
}
