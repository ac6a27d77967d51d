use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

//==============================================================================
// Column names
//==============================================================================

/// Header of the destination column in the booking sheet and the report
pub const DESTINATION_COLUMN: &str = "Destination";

/// Header of the booking date column in the booking sheet
pub const BOOKING_DATE_COLUMN: &str = "Booking Date";

/// Label of the synthetic totals row and column
pub const GRAND_TOTAL_LABEL: &str = "Grand Total";

//==============================================================================
// Ingestion Types
//==============================================================================

/// A single cell as read from the booking workbook
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Date cell, already converted with the workbook's date system
    Date(NaiveDate),
    /// ISO 8601 date/time text produced by the reader
    DateTimeIso(String),
    Error(String),
}

impl CellValue {
    /// True for empty cells and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) | CellValue::DateTimeIso(s) | CellValue::Error(s) => {
                write!(f, "{}", s)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Date(d) => write!(f, "{}", d),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A validated booking row: the two columns the pivot needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRecord {
    /// 1-based row number in the source sheet (header is row 1)
    pub row: usize,
    pub destination: String,
    pub booking_date: NaiveDate,
}

/// Why a data row did not become a [`BookingRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueReason {
    MissingDestination,
    MissingBookingDate,
    UnparsableBookingDate,
}

impl fmt::Display for IssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IssueReason::MissingDestination => "missing destination",
            IssueReason::MissingBookingDate => "missing booking date",
            IssueReason::UnparsableBookingDate => "unparsable booking date",
        };
        f.write_str(text)
    }
}

/// A data row excluded at the ingestion boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub row: usize,
    pub reason: IssueReason,
    /// Raw cell text that caused the issue (empty when the cell was blank)
    pub value: String,
}

/// Result of validating the raw sheet rows
#[derive(Debug, Clone, Default)]
pub struct IngestedSheet {
    pub records: Vec<BookingRecord>,
    pub issues: Vec<RowIssue>,
    /// Non-blank data rows seen (records + issues)
    pub rows_read: usize,
}

//==============================================================================
// Day Buckets
//==============================================================================

/// Days at which bookings stop getting their own bucket
pub const OVERFLOW_DAYS: i64 = 30;

/// Aging bucket for a booking.
///
/// The derived ordering is the report column order: `Day(0) < Day(1) < ...
/// < Day(29) < Overflow`. Labels are never compared, so "10 Days" sorts after
/// "2 Days".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayBucket {
    /// Exactly this many days (0..=29)
    Day(u8),
    /// 30 days or more
    Overflow,
}

impl DayBucket {
    /// Every bucket in column order
    pub fn all() -> impl Iterator<Item = DayBucket> {
        (0..OVERFLOW_DAYS as u8)
            .map(DayBucket::Day)
            .chain(std::iter::once(DayBucket::Overflow))
    }

    pub fn label(&self) -> String {
        match self {
            DayBucket::Day(n) => format!("{} Days", n),
            DayBucket::Overflow => format!("{}+ Days", OVERFLOW_DAYS),
        }
    }
}

impl fmt::Display for DayBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

//==============================================================================
// Pivot Table
//==============================================================================

/// One report row: a destination (or the grand total) with its bucket counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotRow {
    pub label: String,
    pub counts: BTreeMap<DayBucket, u64>,
    pub total: u64,
}

impl PivotRow {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            counts: BTreeMap::new(),
            total: 0,
        }
    }

    /// Count for a bucket (0 when the bucket never occurred)
    pub fn count(&self, bucket: DayBucket) -> u64 {
        self.counts.get(&bucket).copied().unwrap_or(0)
    }
}

/// Destination x day-bucket contingency table with marginal totals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotTable {
    /// Bucket columns in report order
    pub buckets: Vec<DayBucket>,
    /// Destination rows sorted by destination
    pub rows: Vec<PivotRow>,
    pub grand_total: PivotRow,
}

impl PivotTable {
    /// Header labels: `Destination`, bucket labels, `Grand Total`
    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.buckets.len() + 2);
        columns.push(DESTINATION_COLUMN.to_string());
        columns.extend(self.buckets.iter().map(DayBucket::label));
        columns.push(GRAND_TOTAL_LABEL.to_string());
        columns
    }

    /// Destination rows followed by the Grand Total row
    pub fn all_rows(&self) -> impl Iterator<Item = &PivotRow> {
        self.rows.iter().chain(std::iter::once(&self.grand_total))
    }

    pub fn row(&self, destination: &str) -> Option<&PivotRow> {
        self.rows.iter().find(|r| r.label == destination)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Counts reported back to the user alongside the report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Non-blank data rows in the sheet
    pub rows_read: usize,
    /// Records that landed in a bucket
    pub counted: usize,
    /// Records with a booking date after the reference date
    pub excluded_future: usize,
    /// Rows rejected at ingestion
    pub issues: Vec<RowIssue>,
}

impl IngestSummary {
    pub fn skipped(&self) -> usize {
        self.issues.len()
    }
}
