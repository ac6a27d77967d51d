//! Excel exporter implementation - pivot table → report workbook

use crate::error::{PivotError, PivotResult};
use crate::types::{PivotRow, PivotTable};
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

/// Worksheet name used for the report
pub const DEFAULT_SHEET_NAME: &str = "Report";

/// File name prefix for downloads
pub const DEFAULT_FILE_PREFIX: &str = "Report";

/// Download name for a report generated at `stamp`, e.g. `Report-20240115-093000.xlsx`
pub fn timestamped_file_name(prefix: &str, stamp: NaiveDateTime) -> String {
    format!("{}-{}.xlsx", prefix, stamp.format("%Y%m%d-%H%M%S"))
}

/// Excel exporter for pivot tables
pub struct ExcelExporter<'a> {
    table: &'a PivotTable,
    sheet_name: String,
}

impl<'a> ExcelExporter<'a> {
    /// Create a new Excel exporter writing to the `Report` worksheet
    pub fn new(table: &'a PivotTable) -> Self {
        Self {
            table,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }

    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }

    /// Export the pivot to an Excel .xlsx file
    pub fn export(&self, output_path: &Path) -> PivotResult<()> {
        let mut workbook = self.build_workbook()?;
        workbook
            .save(output_path)
            .map_err(|e| PivotError::Export(format!("Failed to save Excel file: {}", e)))?;
        Ok(())
    }

    /// Export the pivot to an in-memory .xlsx file
    pub fn to_bytes(&self) -> PivotResult<Vec<u8>> {
        let mut workbook = self.build_workbook()?;
        workbook
            .save_to_buffer()
            .map_err(|e| PivotError::Export(format!("Failed to serialize Excel file: {}", e)))
    }

    fn build_workbook(&self) -> PivotResult<Workbook> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&self.sheet_name)
            .map_err(|e| PivotError::Export(format!("Failed to set worksheet name: {}", e)))?;

        self.write_report(worksheet)?;
        Ok(workbook)
    }

    fn write_report(&self, worksheet: &mut Worksheet) -> PivotResult<()> {
        let header_format = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_border_bottom(FormatBorder::Thin);
        let total_format = Format::new()
            .set_bold()
            .set_border_top(FormatBorder::Thin);

        // Header row, pivot column order
        let columns = self.table.columns();
        for (col_idx, name) in columns.iter().enumerate() {
            worksheet
                .write_string_with_format(0, col_idx as u16, name, &header_format)
                .map_err(|e| PivotError::Export(format!("Failed to write header: {}", e)))?;
        }

        for (row_idx, row) in self.table.rows.iter().enumerate() {
            self.write_row(worksheet, (row_idx + 1) as u32, row, None)?;
        }

        let total_row = (self.table.rows.len() + 1) as u32;
        self.write_row(worksheet, total_row, &self.table.grand_total, Some(&total_format))?;

        // Widths: destination column sized to its longest label
        let widest = self
            .table
            .all_rows()
            .map(|r| r.label.chars().count())
            .max()
            .unwrap_or(0)
            .max(columns[0].len());
        worksheet
            .set_column_width(0, (widest + 2) as f64)
            .map_err(|e| PivotError::Export(format!("Failed to set column width: {}", e)))?;
        for col_idx in 1..columns.len() {
            worksheet
                .set_column_width(col_idx as u16, 11)
                .map_err(|e| PivotError::Export(format!("Failed to set column width: {}", e)))?;
        }
        worksheet
            .set_freeze_panes(1, 1)
            .map_err(|e| PivotError::Export(format!("Failed to freeze header: {}", e)))?;

        Ok(())
    }

    /// Write label, one count per bucket column, and the row total
    fn write_row(
        &self,
        worksheet: &mut Worksheet,
        row: u32,
        pivot_row: &PivotRow,
        format: Option<&Format>,
    ) -> PivotResult<()> {
        let write_err = |e: rust_xlsxwriter::XlsxError| {
            PivotError::Export(format!("Failed to write row '{}': {}", pivot_row.label, e))
        };

        let written = match format {
            Some(f) => worksheet.write_string_with_format(row, 0, &pivot_row.label, f),
            None => worksheet.write_string(row, 0, &pivot_row.label),
        };
        written.map_err(write_err)?;

        let values = self
            .table
            .buckets
            .iter()
            .map(|bucket| pivot_row.count(*bucket))
            .chain(std::iter::once(pivot_row.total));

        for (offset, value) in values.enumerate() {
            let col = (offset + 1) as u16;
            let written = match format {
                Some(f) => worksheet.write_number_with_format(row, col, value as f64, f),
                None => worksheet.write_number(row, col, value as f64),
            };
            written.map_err(write_err)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{build_pivot, PivotOptions};
    use crate::types::BookingRecord;
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scenario_table() -> PivotTable {
        let records = vec![
            BookingRecord {
                row: 2,
                destination: "Paris".into(),
                booking_date: date(2024, 1, 1),
            },
            BookingRecord {
                row: 3,
                destination: "Paris".into(),
                booking_date: date(2024, 1, 10),
            },
            BookingRecord {
                row: 4,
                destination: "Rome".into(),
                booking_date: date(2024, 2, 1),
            },
        ];
        build_pivot(&records, date(2024, 1, 15), PivotOptions::default()).table
    }

    #[test]
    fn test_timestamped_file_name() {
        let stamp = date(2024, 1, 15).and_hms_opt(9, 30, 5).unwrap();
        assert_eq!(
            timestamped_file_name("Report", stamp),
            "Report-20240115-093005.xlsx"
        );
        assert_eq!(
            timestamped_file_name("aging", stamp),
            "aging-20240115-093005.xlsx"
        );
    }

    #[test]
    fn test_export_writes_report_sheet() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("report.xlsx");
        let table = scenario_table();

        ExcelExporter::new(&table).export(&output).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&output).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Report".to_string()]);
        let range = workbook.worksheet_range("Report").unwrap();

        let header: Vec<String> = range.rows().next().unwrap().iter().map(|c| c.to_string()).collect();
        assert_eq!(header, vec!["Destination", "5 Days", "14 Days", "Grand Total"]);

        assert_eq!(range.get((1, 0)), Some(&Data::String("Paris".into())));
        assert_eq!(range.get((1, 1)), Some(&Data::Float(1.0)));
        assert_eq!(range.get((1, 2)), Some(&Data::Float(1.0)));
        assert_eq!(range.get((1, 3)), Some(&Data::Float(2.0)));

        assert_eq!(range.get((2, 0)), Some(&Data::String("Rome".into())));
        assert_eq!(range.get((2, 3)), Some(&Data::Float(0.0)));

        assert_eq!(range.get((3, 0)), Some(&Data::String("Grand Total".into())));
        assert_eq!(range.get((3, 3)), Some(&Data::Float(2.0)));
        assert_eq!(range.get_size(), (4, 4));
    }

    #[test]
    fn test_to_bytes_is_a_zip() {
        let table = scenario_table();
        let bytes = ExcelExporter::new(&table).to_bytes().unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_custom_sheet_name() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("aging.xlsx");
        let table = scenario_table();

        ExcelExporter::new(&table)
            .with_sheet_name("Aging")
            .export(&output)
            .unwrap();

        let workbook: Xlsx<_> = open_workbook(&output).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Aging".to_string()]);
    }

    #[test]
    fn test_invalid_sheet_name_fails() {
        let table = scenario_table();
        let result = ExcelExporter::new(&table)
            .with_sheet_name("bad/name")
            .to_bytes();
        assert!(matches!(result, Err(PivotError::Export(_))));
    }

    #[test]
    fn test_export_to_nonexistent_directory_fails() {
        let table = scenario_table();
        let result = ExcelExporter::new(&table).export(Path::new("/nonexistent/dir/report.xlsx"));
        assert!(result.is_err());
    }
}
