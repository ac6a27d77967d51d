use super::*;
use crate::error::PivotError;
use crate::types::{DayBucket, PivotRow, GRAND_TOTAL_LABEL};
use rust_xlsxwriter::Workbook;
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;

fn write_bookings(path: &Path, rows: &[(&str, &str)]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Booking Ref").unwrap();
    sheet.write_string(0, 1, "Destination").unwrap();
    sheet.write_string(0, 2, "Booking Date").unwrap();
    for (idx, (destination, date)) in rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        sheet.write_string(row, 0, format!("BK-{:03}", idx)).unwrap();
        sheet.write_string(row, 1, *destination).unwrap();
        sheet.write_string(row, 2, *date).unwrap();
    }
    workbook.save(path).unwrap();
}

fn sample_table() -> PivotTable {
    let mut paris = BTreeMap::new();
    paris.insert(DayBucket::Day(5), 1);
    paris.insert(DayBucket::Day(14), 12);
    PivotTable {
        buckets: vec![DayBucket::Day(5), DayBucket::Day(14)],
        rows: vec![
            PivotRow {
                label: "Paris".into(),
                total: 13,
                counts: paris.clone(),
            },
            PivotRow::new("Rome"),
        ],
        grand_total: PivotRow {
            label: GRAND_TOTAL_LABEL.into(),
            total: 13,
            counts: paris,
        },
    }
}

// =========================================================================
// render_table Tests
// =========================================================================

#[test]
fn test_render_table_layout() {
    let rendered = render_table(&sample_table());
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 6);
    assert_eq!(
        lines[0],
        "   Destination  5 Days  14 Days  Grand Total"
    );
    assert!(lines[1].trim().chars().all(|c| c == '─'));
    assert_eq!(lines[2], "   Paris             1       12           13");
    assert_eq!(lines[3], "   Rome              0        0            0");
    assert!(lines[4].trim().chars().all(|c| c == '─'));
    assert!(lines[5].starts_with("   Grand Total"));
    assert!(lines[5].ends_with("13"));
}

#[test]
fn test_render_table_empty_pivot() {
    let table = PivotTable {
        buckets: vec![],
        rows: vec![],
        grand_total: PivotRow::new(GRAND_TOTAL_LABEL),
    };
    let rendered = render_table(&table);
    assert!(rendered.contains("Destination  Grand Total"));
    assert!(rendered.lines().last().unwrap().contains("Grand Total"));
}

// =========================================================================
// report Command Tests
// =========================================================================

#[test]
fn test_report_writes_workbook() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("bookings.xlsx");
    let output = temp_dir.path().join("out.xlsx");
    write_bookings(
        &input,
        &[
            ("Paris", "2024-01-01"),
            ("Paris", "2024-01-10"),
            ("Rome", "2024-02-01"),
        ],
    );

    let result = report(
        input,
        Some("2024-01-15".into()),
        Some(output.clone()),
        ReportOptions::default(),
        true,
    );
    assert!(result.is_ok(), "{:?}", result);
    assert!(output.exists());
}

#[test]
fn test_report_missing_date() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("bookings.xlsx");
    let output = temp_dir.path().join("out.xlsx");
    write_bookings(&input, &[("Paris", "2024-01-01")]);

    let result = report(input, None, Some(output.clone()), ReportOptions::default(), false);
    assert!(matches!(result, Err(PivotError::MissingInput(_))));
    assert!(!output.exists(), "no file should be produced");
}

#[test]
fn test_report_empty_sheet() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("bookings.xlsx");
    let output = temp_dir.path().join("out.xlsx");
    write_bookings(&input, &[]);

    let result = report(
        input,
        Some("2024-01-15".into()),
        Some(output.clone()),
        ReportOptions::default(),
        false,
    );
    assert!(matches!(result, Err(PivotError::NoValidData(_))));
    assert!(!output.exists());
}

#[test]
fn test_report_unwritable_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("bookings.xlsx");
    write_bookings(&input, &[("Paris", "2024-01-01")]);

    let result = report(
        input,
        Some("2024-01-15".into()),
        Some(temp_dir.path().join("missing-dir").join("out.xlsx")),
        ReportOptions::default(),
        false,
    );
    assert!(matches!(result, Err(PivotError::Io(_))));
}

// =========================================================================
// preview Command Tests
// =========================================================================

#[test]
fn test_preview_ok() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("bookings.xlsx");
    write_bookings(&input, &[("Oslo", "2024-01-01"), ("Oslo", "garbage")]);

    let result = preview(
        input,
        Some("2024-03-01".into()),
        PivotOptions::default(),
        true,
    );
    assert!(result.is_ok());
}

#[test]
fn test_preview_unreadable_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("bookings.xlsx");
    fs::write(&input, b"definitely not a zip").unwrap();

    let result = preview(input, Some("2024-03-01".into()), PivotOptions::default(), false);
    assert!(matches!(result, Err(PivotError::Read(_))));
}

#[test]
fn test_init_logging_twice_is_harmless() {
    init_logging(false);
    init_logging(true);
}
