//! Spreadsheet ingestion for sheetline.
//!
//! # Features
//!
//! - **Discovery**: list spreadsheet (or other) files in a folder, sorted by name
//! - **Reading**: decode the first sheet of a workbook into ordered rows
//! - **Relocation**: move processed inputs into a "completed" folder without
//!   overwriting earlier arrivals
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use sheetline_ingest::{CalamineReader, SheetReader, list_spreadsheet_files};
//!
//! for path in list_spreadsheet_files(Path::new("incoming"))? {
//!     let rows = CalamineReader.read_first_sheet(&path)?;
//!     println!("{}: {} rows", path.display(), rows.len());
//! }
//! ```

mod discovery;
mod error;
mod reader;
mod relocate;

// === Error Types ===
pub use error::{IngestError, RelocateError, Result};

// === File Discovery ===
pub use discovery::{
    SPREADSHEET_EXTENSIONS, is_spreadsheet, list_files_with_extensions, list_spreadsheet_files,
};

// === Sheet Reading ===
pub use reader::{CalamineReader, SheetReader, header_labels, rows_from_grid};

// === Relocation ===
pub use relocate::{CompletedDirRelocator, Relocator, timestamped_file_name};
