//! Conversion pipeline.
//!
//! One spreadsheet goes through these stages:
//! 1. **Read**: first sheet as labelled rows ([`SheetReader`])
//! 2. **Normalize**: keys, placeholders and dates per row ([`process_row`])
//! 3. **Write**: one JSON Lines file
//! 4. **Relocate**: optionally move the source ([`Relocator`])
//!
//! A folder run repeats this for every spreadsheet in name order and can
//! finish with a merge of the produced files. Failures are recorded per file
//! and never stop the run.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{error, info, info_span, warn};

use sheetline_ingest::{Relocator, SheetReader, list_files_with_extensions, list_spreadsheet_files};
use sheetline_model::{ConvertedFile, FileOutcome, RelocationStatus, RowOutcome, ValueWarning};
use sheetline_output::{
    JSONL_EXTENSION, MergeManifest, MergeOptions, jsonl_file_name, merge_json_lines,
    write_json_lines,
};
use sheetline_transform::{RecordOptions, process_row};

use crate::logging::redact_value;

// ============================================================================
// Single file
// ============================================================================

/// Convert one spreadsheet into `output`.
///
/// Relocation runs only after the output was written, and a failed move
/// leaves the conversion successful.
pub fn convert_file(
    reader: &dyn SheetReader,
    input: &Path,
    output: &Path,
    options: &RecordOptions,
    relocator: Option<&dyn Relocator>,
) -> FileOutcome {
    let span = info_span!("convert", input = %input.display());
    let _guard = span.enter();

    match write_converted(reader, input, output, options) {
        Ok(mut converted) => {
            if let Some(relocator) = relocator {
                converted.relocation = relocate_source(relocator, input);
            }
            info!(
                output = %converted.output.display(),
                record_count = converted.record_count,
                fallback_rows = converted.fallback_rows,
                "converted"
            );
            FileOutcome::Converted(converted)
        }
        Err(err) => {
            let message = format!("{err:#}");
            error!(error = %message, "conversion failed");
            FileOutcome::Failed {
                input: input.to_path_buf(),
                error: message,
            }
        }
    }
}

fn write_converted(
    reader: &dyn SheetReader,
    input: &Path,
    output: &Path,
    options: &RecordOptions,
) -> Result<ConvertedFile> {
    let rows = reader.read_first_sheet(input)?;

    let mut records = Vec::with_capacity(rows.len());
    let mut warnings: Vec<ValueWarning> = Vec::new();
    let mut fallback_rows = 0usize;
    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;
        match process_row(row, options) {
            RowOutcome::Normalized {
                record,
                warnings: row_warnings,
            } => {
                for warning in &row_warnings {
                    warn!(
                        row = row_number,
                        column = %warning.column,
                        value = redact_value(&warning.value),
                        reason = %warning.message,
                        "kept value after failed date conversion"
                    );
                }
                warnings.extend(row_warnings);
                records.push(record);
            }
            RowOutcome::Fallback { record, reason } => {
                warn!(row = row_number, %reason, "row kept with header normalization only");
                fallback_rows += 1;
                records.push(record);
            }
        }
    }

    let written = write_json_lines(output, &records)?;
    Ok(ConvertedFile {
        input: input.to_path_buf(),
        output: written.path,
        record_count: written.record_count,
        fallback_rows,
        warnings,
        relocation: RelocationStatus::NotRequested,
    })
}

fn relocate_source(relocator: &dyn Relocator, input: &Path) -> RelocationStatus {
    match relocator.relocate(input) {
        Ok(destination) => RelocationStatus::Moved(destination),
        Err(err) => {
            warn!(error = %err, "could not move converted file");
            RelocationStatus::Failed(err.to_string())
        }
    }
}

/// Output path for a single-file conversion with no explicit target:
/// `<working_dir>/<output_dir_name>/<stem>.jsonl` when that folder exists,
/// otherwise `<stem>.jsonl` next to the input.
pub fn default_output_path(input: &Path, working_dir: &Path, output_dir_name: &str) -> PathBuf {
    let file_name = jsonl_file_name(input);
    let output_dir = working_dir.join(output_dir_name);
    if output_dir.is_dir() {
        output_dir.join(file_name)
    } else {
        input.with_file_name(file_name)
    }
}

// ============================================================================
// Folder
// ============================================================================

#[derive(Debug, Clone)]
pub struct FolderOptions {
    pub output_dir: PathBuf,
    pub record: RecordOptions,
    /// Merge the produced files afterwards.
    pub merge: Option<MergeOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MergeStatus {
    #[default]
    NotRequested,
    Completed(MergeManifest),
    Failed(String),
}

impl MergeStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Everything a folder run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderRun {
    pub files: Vec<FileOutcome>,
    pub merge: MergeStatus,
}

impl FolderRun {
    pub fn converted(&self) -> impl Iterator<Item = &ConvertedFile> {
        self.files.iter().filter_map(FileOutcome::converted)
    }

    pub fn failed_count(&self) -> usize {
        self.files.iter().filter(|file| file.is_failed()).count()
    }

    /// True when a file failed or the merge failed.
    pub fn has_errors(&self) -> bool {
        self.failed_count() > 0 || self.merge.is_failed()
    }
}

/// Convert every spreadsheet in `folder`.
///
/// An empty folder is not an error and produces an empty run.
pub fn convert_folder(
    reader: &dyn SheetReader,
    folder: &Path,
    options: &FolderOptions,
    relocator: Option<&dyn Relocator>,
) -> Result<FolderRun> {
    let inputs = list_spreadsheet_files(folder)?;
    if inputs.is_empty() {
        info!(folder = %folder.display(), "no spreadsheet files found");
        return Ok(FolderRun::default());
    }
    fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("create {}", options.output_dir.display()))?;
    info!(
        folder = %folder.display(),
        file_count = inputs.len(),
        "converting folder"
    );

    let mut used_names = BTreeSet::new();
    let files: Vec<FileOutcome> = inputs
        .iter()
        .map(|input| {
            let output = options
                .output_dir
                .join(unique_output_name(input, &mut used_names));
            convert_file(reader, input, &output, &options.record, relocator)
        })
        .collect();

    let merge = match &options.merge {
        None => MergeStatus::NotRequested,
        Some(merge_options) => {
            let outputs: Vec<PathBuf> = files
                .iter()
                .filter_map(FileOutcome::converted)
                .map(|file| file.output.clone())
                .collect();
            merge_outputs(&outputs, merge_options)
        }
    };
    Ok(FolderRun { files, merge })
}

/// `<stem>.jsonl`, or `<stem>_<ext>.jsonl` when another input in the same run
/// already claimed that name.
fn unique_output_name(input: &Path, used: &mut BTreeSet<String>) -> String {
    let mut name = jsonl_file_name(input);
    if used.contains(&name) {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = input
            .extension()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let base = format!("{stem}_{ext}");
        name = format!("{base}.{JSONL_EXTENSION}");
        let mut counter = 1usize;
        while used.contains(&name) {
            name = format!("{base}_{counter}.{JSONL_EXTENSION}");
            counter += 1;
        }
    }
    used.insert(name.clone());
    name
}

// ============================================================================
// Merge
// ============================================================================

/// Merge JSON Lines files, reporting a failure as a status rather than an error.
pub fn merge_outputs(sources: &[PathBuf], options: &MergeOptions) -> MergeStatus {
    match merge_json_lines(sources, options) {
        Ok(manifest) => MergeStatus::Completed(manifest),
        Err(err) => {
            error!(error = %err, "merge failed, sources kept");
            MergeStatus::Failed(err.to_string())
        }
    }
}

/// Expand merge inputs: files are taken as given, folders contribute their
/// `.jsonl` files in name order.
pub fn collect_merge_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for input in inputs {
        if input.is_dir() {
            sources.extend(list_files_with_extensions(input, &[JSONL_EXTENSION])?);
        } else if input.is_file() {
            sources.push(input.clone());
        } else {
            bail!("merge input not found: {}", input.display());
        }
    }
    Ok(sources)
}
