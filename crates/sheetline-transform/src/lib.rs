//! Value normalization for spreadsheet rows.
//!
//! This crate provides the pure transformation steps applied to every row
//! before it is written as a JSON line:
//!
//! - **header**: column label to canonical field key
//! - **months**: named-month lookup used by locale date text
//! - **temporal**: date/time detection and canonical rendering
//! - **record**: placeholder handling and per-row assembly with fallback

pub mod header;
pub mod months;
pub mod record;
pub mod temporal;

pub use header::{normalize_header, normalize_header_value};
pub use record::{PLACEHOLDER_TOKENS, RecordOptions, RowError, is_placeholder, process_row};
pub use temporal::{
    DateOrder, TemporalError, TemporalOptions, TemporalOutcome, classify_temporal,
    convert_temporal, date_attempts, resolve_day_month,
};
