//! Excel importer implementation - booking workbook (.xlsx/.xls) → records

use crate::core::parse_booking_date;
use crate::error::{PivotError, PivotResult};
use crate::types::{
    BookingRecord, CellValue, IngestedSheet, IssueReason, RowIssue, BOOKING_DATE_COLUMN,
    DESTINATION_COLUMN,
};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// First worksheet of a workbook: header names plus data rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRows {
    pub headers: Vec<String>,
    /// 1-based sheet row number of the header row
    pub header_row: usize,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetRows {
    /// Position of a column by header name (surrounding whitespace ignored)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

/// Excel importer for booking workbooks held in memory
pub struct ExcelImporter {
    source: String,
    bytes: Vec<u8>,
}

impl ExcelImporter {
    /// Create an importer over uploaded bytes
    pub fn from_bytes(source: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            bytes,
        }
    }

    /// Read a workbook from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> PivotResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| PivotError::Read(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_bytes(path.display().to_string(), bytes))
    }

    /// Name of the file the bytes came from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parse the first worksheet into header + rows
    pub fn read_rows(&self) -> PivotResult<SheetRows> {
        if self.bytes.is_empty() {
            return Err(PivotError::Read(format!("{} is empty", self.source)));
        }

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(self.bytes.as_slice()))
            .map_err(|e| PivotError::Read(format!("Failed to open {}: {}", self.source, e)))?;

        let range = match workbook.worksheet_range_at(0) {
            Some(result) => result.map_err(|e| {
                PivotError::Read(format!("Failed to read first worksheet: {}", e))
            })?,
            None => {
                return Err(PivotError::NoValidData(
                    "workbook has no worksheets".to_string(),
                ))
            }
        };

        let sheet = Self::range_to_rows(&range);
        debug!(
            source = %self.source,
            columns = sheet.headers.len(),
            rows = sheet.rows.len(),
            "read first worksheet"
        );
        Ok(sheet)
    }

    /// Parse and validate the first worksheet
    pub fn import(&self) -> PivotResult<IngestedSheet> {
        let sheet = self.read_rows()?;
        validate_rows(&sheet)
    }

    fn range_to_rows(range: &Range<Data>) -> SheetRows {
        if range.is_empty() {
            return SheetRows::default();
        }

        let header_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
        let mut rows = range.rows();

        let headers = rows
            .next()
            .map(|cells| {
                cells
                    .iter()
                    .map(|cell| data_to_cell_value(cell).to_string().trim().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let rows = rows
            .map(|cells| cells.iter().map(data_to_cell_value).collect())
            .collect();

        SheetRows {
            headers,
            header_row,
            rows,
        }
    }
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // as_datetime honors the workbook's 1900/1904 date system
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => CellValue::Date(datetime.date()),
            None => CellValue::Error(format!("invalid date serial {}", dt.as_f64())),
        },
        Data::DateTimeIso(s) => CellValue::DateTimeIso(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(format!("#ERROR: {:?}", e)),
    }
}

/// Turn raw rows into booking records at the ingestion boundary.
///
/// Fully blank rows are skipped. Rows without a destination or a usable
/// booking date become [`RowIssue`]s. A sheet with no header, a header
/// missing a required column, or no records at all is `NoValidData`.
pub fn validate_rows(sheet: &SheetRows) -> PivotResult<IngestedSheet> {
    if sheet.headers.is_empty() {
        return Err(PivotError::NoValidData("the first sheet is empty".to_string()));
    }

    let destination_col = sheet.column_index(DESTINATION_COLUMN).ok_or_else(|| {
        PivotError::NoValidData(format!("missing required column '{}'", DESTINATION_COLUMN))
    })?;
    let date_col = sheet.column_index(BOOKING_DATE_COLUMN).ok_or_else(|| {
        PivotError::NoValidData(format!("missing required column '{}'", BOOKING_DATE_COLUMN))
    })?;

    let mut ingested = IngestedSheet::default();
    let empty = CellValue::Empty;

    for (idx, cells) in sheet.rows.iter().enumerate() {
        if cells.iter().all(CellValue::is_blank) {
            continue;
        }
        ingested.rows_read += 1;
        let row = sheet.header_row + idx + 1;

        let destination_cell = cells.get(destination_col).unwrap_or(&empty);
        let date_cell = cells.get(date_col).unwrap_or(&empty);

        if destination_cell.is_blank() {
            ingested.issues.push(RowIssue {
                row,
                reason: IssueReason::MissingDestination,
                value: String::new(),
            });
            continue;
        }

        if date_cell.is_blank() {
            ingested.issues.push(RowIssue {
                row,
                reason: IssueReason::MissingBookingDate,
                value: String::new(),
            });
            continue;
        }

        match parse_booking_date(date_cell) {
            Some(booking_date) => ingested.records.push(BookingRecord {
                row,
                destination: destination_cell.to_string().trim().to_string(),
                booking_date,
            }),
            None => {
                ingested.issues.push(RowIssue {
                    row,
                    reason: IssueReason::UnparsableBookingDate,
                    value: date_cell.to_string(),
                });
            }
        }
    }

    for issue in &ingested.issues {
        warn!(row = issue.row, value = %issue.value, "skipped row: {}", issue.reason);
    }

    if ingested.records.is_empty() {
        let detail = if ingested.rows_read == 0 {
            "the sheet has no data rows".to_string()
        } else {
            format!(
                "none of the {} data rows has a destination and a valid booking date",
                ingested.rows_read
            )
        };
        return Err(PivotError::NoValidData(detail));
    }

    Ok(ingested)
}
