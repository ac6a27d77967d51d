//! Pivot - booking aging report from an Excel upload
//!
//! Reads the first sheet of a booking workbook, counts bookings per
//! destination by days since booking relative to a reference date, and
//! writes the result as a `Report` worksheet.
//!
//! # Buckets
//!
//! - `0 Days` ... `29 Days`: exact days since booking
//! - `30+ Days`: 30 days or more
//! - bookings after the reference date are excluded from every total
//!
//! # Example
//!
//! ```no_run
//! use royalbit_pivot::report::{ReportPipeline, ReportRequest, ReportSource};
//! use std::path::PathBuf;
//!
//! let pipeline = ReportPipeline::default();
//! let request = ReportRequest::new(
//!     Some("2024-01-15".to_string()),
//!     Some(ReportSource::Path(PathBuf::from("bookings.xlsx"))),
//! );
//! let outcome = pipeline.run_blocking(request)?;
//!
//! println!("Destinations: {}", outcome.analysis.pivot.rows.len());
//! std::fs::write(&outcome.file_name, &outcome.workbook)?;
//! # Ok::<(), royalbit_pivot::error::PivotError>(())
//! ```

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod report;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use error::{PivotError, PivotResult};
pub use types::{BookingRecord, DayBucket, IngestSummary, PivotRow, PivotTable};
