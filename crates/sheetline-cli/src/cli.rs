//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "sheetline",
    version,
    about = "Convert spreadsheets to JSON Lines",
    long_about = "Convert the first sheet of spreadsheets to JSON Lines.\n\n\
                  Column names become lowercase snake_case keys, dates and times are\n\
                  rendered as YYYY-MM-DD / HH:MM:SS, and many outputs can be merged\n\
                  into size-capped files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include cell values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Prefix log lines with a timestamp (pretty and compact formats).
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include the emitting module in log lines.
    #[arg(long = "log-target", global = true)]
    pub log_target: bool,

    /// Log when spans close, with their duration.
    #[arg(long = "log-spans", global = true)]
    pub log_spans: bool,

    /// Settings file (default: ./sheetline.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a spreadsheet, or every spreadsheet in a folder.
    Convert(ConvertArgs),

    /// Merge JSON Lines files into size-capped files.
    Merge(MergeArgs),
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// Spreadsheet file or folder of spreadsheets.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file (file input) or folder (folder input).
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Merge the converted files after a folder run.
    #[arg(long = "merge")]
    pub merge: bool,

    /// Base name for merged files (<BASE>_001.jsonl, ...).
    #[arg(long = "merge-base", value_name = "NAME")]
    pub merge_base: Option<String>,

    /// Maximum size of one merged file in bytes.
    #[arg(long = "max-bytes", value_name = "N")]
    pub max_bytes: Option<u64>,

    /// Move each converted spreadsheet into the completed folder.
    #[arg(long = "move-completed")]
    pub move_completed: bool,

    /// Completed folder (overrides settings).
    #[arg(long = "completed-dir", value_name = "DIR")]
    pub completed_dir: Option<PathBuf>,

    /// Write empty cells as null instead of leaving them out.
    #[arg(long = "include-empty")]
    pub include_empty: bool,

    /// Do not treat numbers as spreadsheet date serials.
    #[arg(long = "no-serial-dates")]
    pub no_serial_dates: bool,
}

#[derive(Parser)]
pub struct MergeArgs {
    /// JSON Lines files, or folders whose .jsonl files are merged in name order.
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Folder for merged files.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Base name for merged files (<BASE>_001.jsonl, ...).
    #[arg(long = "merge-base", value_name = "NAME")]
    pub merge_base: Option<String>,

    /// Maximum size of one merged file in bytes.
    #[arg(long = "max-bytes", value_name = "N")]
    pub max_bytes: Option<u64>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
