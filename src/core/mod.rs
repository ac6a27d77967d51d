//! Pivot transform: day offsets, bucket assignment, aggregation

pub mod bucket;
pub mod dates;
pub mod pivot;

pub use bucket::assign_bucket;
pub use dates::{day_offset, parse_booking_date, parse_reference_date};
pub use pivot::{build_pivot, PivotBuilder, PivotOptions, PivotOutcome};
