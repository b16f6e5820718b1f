//! Library components of the sheetline command-line tool.

pub mod config;
pub mod logging;
pub mod pipeline;
