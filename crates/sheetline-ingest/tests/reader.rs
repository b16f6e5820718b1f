//! Reads workbooks written with rust_xlsxwriter back through calamine.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use tempfile::TempDir;

use sheetline_ingest::{CalamineReader, IngestError, SheetReader};
use sheetline_model::CellValue;

fn write_orders(path: &Path) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let sheet = workbook.add_worksheet();
    sheet.set_name("Orders").unwrap();
    sheet.write_string(1, 0, "No. Invoice").unwrap();
    sheet.write_string(1, 1, "Tanggal").unwrap();
    sheet.write_string(1, 2, "Qty").unwrap();
    sheet.write_string(1, 3, "Lunas").unwrap();
    sheet.write_string(1, 4, "Qty").unwrap();

    sheet.write_string(2, 0, "INV-001").unwrap();
    let date = ExcelDateTime::from_ymd(2024, 5, 17).unwrap();
    sheet
        .write_datetime_with_format(2, 1, &date, &date_format)
        .unwrap();
    sheet.write_number(2, 2, 12).unwrap();
    sheet.write_boolean(2, 3, true).unwrap();
    sheet.write_number(2, 4, 1.5).unwrap();

    sheet.write_string(4, 0, "INV-002").unwrap();

    let other = workbook.add_worksheet();
    other.set_name("Notes").unwrap();
    other.write_string(0, 0, "ignored").unwrap();

    workbook.save(path).unwrap();
}

#[test]
fn reads_first_sheet_with_labels() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("orders.xlsx");
    write_orders(&path);

    let rows = CalamineReader.read_first_sheet(&path).unwrap();
    assert_eq!(rows.len(), 2, "blank row 4 is skipped");

    let labels: Vec<&str> = rows[0].iter().map(|(label, _)| label.as_str()).collect();
    assert_eq!(labels, vec!["No. Invoice", "Tanggal", "Qty", "Lunas", "Qty_1"]);

    let expected_date = NaiveDate::from_ymd_opt(2024, 5, 17)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(rows[0][0].1, CellValue::text("INV-001"));
    assert_eq!(rows[0][1].1, CellValue::DateTime(expected_date));
    assert_eq!(rows[0][2].1, CellValue::Number(12.0));
    assert_eq!(rows[0][3].1, CellValue::Bool(true));
    assert_eq!(rows[0][4].1, CellValue::Number(1.5));

    assert_eq!(rows[1][0].1, CellValue::text("INV-002"));
    assert!(rows[1][1..].iter().all(|(_, cell)| cell.is_empty()));
}

#[test]
fn rejects_missing_and_unsupported_files() {
    let dir = TempDir::new().unwrap();

    let missing = CalamineReader.read_first_sheet(&dir.path().join("nope.xlsx"));
    assert!(matches!(missing, Err(IngestError::FileNotFound { .. })));

    let notes = dir.path().join("notes.txt");
    fs::write(&notes, "hello").unwrap();
    let unsupported = CalamineReader.read_first_sheet(&notes);
    assert!(matches!(
        unsupported,
        Err(IngestError::UnsupportedExtension { .. })
    ));
}

#[test]
fn corrupt_workbook_is_a_workbook_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.xlsx");
    fs::write(&path, b"not a zip archive").unwrap();

    let result = CalamineReader.read_first_sheet(&path);
    assert!(matches!(result, Err(IngestError::Workbook { .. })));
}
