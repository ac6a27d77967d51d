//! Excel import/export module
//!
//! - Import: booking workbook (.xlsx/.xls, first sheet) → booking records
//! - Export: pivot table → `Report` worksheet (.xlsx)

mod exporter;
mod importer;

pub use exporter::{
    timestamped_file_name, ExcelExporter, DEFAULT_FILE_PREFIX, DEFAULT_SHEET_NAME,
};
pub use importer::{validate_rows, ExcelImporter, SheetRows};
