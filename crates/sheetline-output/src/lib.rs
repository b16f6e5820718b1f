//! JSON Lines output for sheetline.
//!
//! - **JSON Lines**: one record per line, `\n` between records
//! - **Merge**: greedy, order-preserving packing of many `.jsonl` files into
//!   `<base>_<NNN>.jsonl` files no larger than a byte ceiling

mod error;
mod jsonl;
mod merge;

pub use error::{MergeError, OutputError};
pub use jsonl::{JSONL_EXTENSION, JsonlFile, jsonl_file_name, to_json_lines, write_json_lines};
pub use merge::{
    DEFAULT_MAX_MERGED_BYTES, DeletionFailure, FsMergeStore, MergeManifest, MergeOptions,
    MergeStore, MergedFile, count_records, merge_json_lines, merge_with_store, merged_file_name,
};
