//! Shared data model for spreadsheet-to-JSON-Lines conversion.
//!
//! - **cell**: raw decoded cell values as produced by the spreadsheet reader
//! - **temporal**: date/time classification tags
//! - **record**: normalized JSON records and per-row outcomes
//! - **outcome**: per-file conversion results

pub mod cell;
pub mod outcome;
pub mod record;
pub mod temporal;

pub use cell::{CellValue, RawRow};
pub use outcome::{ConvertedFile, FileOutcome, RelocationStatus};
pub use record::{Record, RowOutcome, ValueWarning};
pub use temporal::TemporalKind;
