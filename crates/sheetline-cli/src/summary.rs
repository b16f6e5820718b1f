use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sheetline_cli::pipeline::MergeStatus;
use sheetline_model::{FileOutcome, RelocationStatus};
use sheetline_output::MergeManifest;

use crate::types::{RunKind, RunReport};

pub fn print_summary(report: &RunReport) {
    println!("Input: {}", report.input.display());
    println!("Output: {}", report.output.display());

    if report.kind == RunKind::Folder && report.run.files.is_empty() {
        println!("No spreadsheet files found.");
        return;
    }
    if !report.run.files.is_empty() {
        print_file_table(&report.run.files);
    }
    if let MergeStatus::Completed(manifest) = &report.run.merge {
        print_merge_table(manifest);
    }
    print_errors(report);
}

fn print_file_table(files: &[FileOutcome]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Status"),
        header_cell("Records"),
        header_cell("Fallback"),
        header_cell("Kept values"),
        header_cell("Output"),
        header_cell("Moved to"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);

    let mut total_records = 0usize;
    let mut total_fallback = 0usize;
    for outcome in files {
        let name = file_name(outcome.input());
        match outcome {
            FileOutcome::Converted(file) => {
                total_records += file.record_count;
                total_fallback += file.fallback_rows;
                table.add_row(vec![
                    Cell::new(name),
                    Cell::new("OK").fg(Color::Green).add_attribute(Attribute::Bold),
                    Cell::new(file.record_count),
                    count_cell(file.fallback_rows, Color::Yellow),
                    count_cell(file.warnings.len(), Color::Yellow),
                    Cell::new(file.output.display()),
                    relocation_cell(&file.relocation),
                ]);
            }
            FileOutcome::Failed { .. } => {
                table.add_row(vec![
                    Cell::new(name),
                    Cell::new("FAILED").fg(Color::Red).add_attribute(Attribute::Bold),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                ]);
            }
        }
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} file(s)", files.len())).add_attribute(Attribute::Bold),
        Cell::new(total_records).add_attribute(Attribute::Bold),
        count_cell(total_fallback, Color::Yellow).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");
}

fn print_merge_table(manifest: &MergeManifest) {
    if manifest.files.is_empty() {
        println!("Nothing to merge.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Merged file"),
        header_cell("Sources"),
        header_cell("Records"),
        header_cell("Bytes"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for file in &manifest.files {
        table.add_row(vec![
            Cell::new(file_name(&file.path)),
            Cell::new(file.source_count),
            Cell::new(file.record_count),
            Cell::new(file.bytes),
        ]);
    }
    println!();
    println!("Merge:");
    println!("{table}");
    println!(
        "{} record(s) in {} file(s), {} source(s) deleted",
        manifest.total_records,
        manifest.files.len(),
        manifest.deleted_sources
    );
}

fn print_errors(report: &RunReport) {
    let mut errors = Vec::new();
    for outcome in &report.run.files {
        match outcome {
            FileOutcome::Failed { input, error } => {
                errors.push(format!("{}: {error}", input.display()));
            }
            FileOutcome::Converted(file) => {
                if let RelocationStatus::Failed(message) = &file.relocation {
                    errors.push(format!("{}: not moved: {message}", file.input.display()));
                }
            }
        }
    }
    match &report.run.merge {
        MergeStatus::Failed(message) => errors.push(format!("merge: {message}")),
        MergeStatus::Completed(manifest) => {
            for failure in &manifest.deletion_failures {
                errors.push(format!(
                    "{}: not deleted after merge: {}",
                    failure.path.display(),
                    failure.message
                ));
            }
        }
        MergeStatus::NotRequested => {}
    }
    if !errors.is_empty() {
        eprintln!("Errors:");
        for error in &errors {
            eprintln!("- {error}");
        }
    }
}

fn relocation_cell(status: &RelocationStatus) -> Cell {
    match status {
        RelocationStatus::NotRequested => dim_cell("-"),
        RelocationStatus::Moved(path) => Cell::new(path.display()),
        RelocationStatus::Failed(_) => Cell::new("failed").fg(Color::Red),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
