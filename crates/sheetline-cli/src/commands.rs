use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use sheetline_cli::config::Settings;
use sheetline_cli::pipeline::{
    FolderOptions, FolderRun, MergeStatus, collect_merge_inputs, convert_file, convert_folder,
    default_output_path, merge_outputs,
};
use sheetline_ingest::{CalamineReader, CompletedDirRelocator, Relocator, is_spreadsheet};
use sheetline_output::MergeOptions;
use sheetline_transform::{RecordOptions, TemporalOptions};

use crate::cli::{ConvertArgs, MergeArgs};
use crate::types::{RunKind, RunReport};

pub fn run_convert(args: &ConvertArgs, config: Option<&Path>) -> Result<RunReport> {
    let working_dir = env::current_dir().context("resolve working directory")?;
    let mut settings = Settings::load(config, &working_dir)?;
    if let Some(dir) = &args.completed_dir {
        settings.completed_dir = dir.clone();
    }
    apply_merge_overrides(&mut settings, args.merge_base.as_ref(), args.max_bytes);

    let record_options = RecordOptions::default()
        .with_include_empty(args.include_empty)
        .with_temporal(TemporalOptions::default().with_serial_dates(!args.no_serial_dates));
    let completed = args
        .move_completed
        .then(|| CompletedDirRelocator::new(settings.completed_dir_in(&working_dir)));
    let relocator = completed.as_ref().map(|r| r as &dyn Relocator);

    let input = &args.input;
    if input.is_file() {
        if !is_spreadsheet(input) {
            bail!("unsupported file type: {}", input.display());
        }
        if args.merge {
            warn!("--merge only applies to folder input, ignoring it");
        }
        let output = args.output.clone().unwrap_or_else(|| {
            default_output_path(input, &working_dir, &settings.output_dir_name)
        });
        let outcome = convert_file(&CalamineReader, input, &output, &record_options, relocator);
        return Ok(RunReport {
            input: input.clone(),
            output,
            kind: RunKind::SingleFile,
            run: FolderRun {
                files: vec![outcome],
                merge: MergeStatus::NotRequested,
            },
        });
    }
    if !input.is_dir() {
        bail!("input not found: {}", input.display());
    }

    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| working_dir.join(&settings.output_dir_name));
    let options = FolderOptions {
        output_dir: output_dir.clone(),
        record: record_options,
        merge: args
            .merge
            .then(|| merge_options(&settings, output_dir.clone())),
    };
    let span = info_span!("folder", input = %input.display());
    let run = span.in_scope(|| convert_folder(&CalamineReader, input, &options, relocator))?;
    Ok(RunReport {
        input: input.clone(),
        output: output_dir,
        kind: RunKind::Folder,
        run,
    })
}

pub fn run_merge(args: &MergeArgs, config: Option<&Path>) -> Result<RunReport> {
    let working_dir = env::current_dir().context("resolve working directory")?;
    let mut settings = Settings::load(config, &working_dir)?;
    apply_merge_overrides(&mut settings, args.merge_base.as_ref(), args.max_bytes);

    let sources = collect_merge_inputs(&args.inputs)?;
    info!(source_count = sources.len(), "merging json lines files");
    let merge = merge_outputs(&sources, &merge_options(&settings, args.output_dir.clone()));
    Ok(RunReport {
        input: args.inputs.first().cloned().unwrap_or_default(),
        output: args.output_dir.clone(),
        kind: RunKind::Merge,
        run: FolderRun {
            files: Vec::new(),
            merge,
        },
    })
}

fn apply_merge_overrides(settings: &mut Settings, base: Option<&String>, max_bytes: Option<u64>) {
    if let Some(base) = base {
        settings.merge_base_name = base.clone();
    }
    if let Some(max_bytes) = max_bytes {
        settings.max_merged_bytes = max_bytes;
    }
}

fn merge_options(settings: &Settings, output_dir: PathBuf) -> MergeOptions {
    MergeOptions::new(output_dir)
        .with_base_name(settings.merge_base_name.clone())
        .with_max_bytes(settings.max_merged_bytes)
}
