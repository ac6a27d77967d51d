//! Day bucket assignment

use crate::types::{DayBucket, OVERFLOW_DAYS};

/// Bucket for a day offset.
///
/// `0..=29` get their own bucket, `30` and above share the overflow bucket.
/// Negative offsets (bookings after the reference date) have no bucket and
/// are left out of every total.
pub fn assign_bucket(offset: i64) -> Option<DayBucket> {
    match offset {
        o if o < 0 => None,
        o if o < OVERFLOW_DAYS => Some(DayBucket::Day(o as u8)),
        _ => Some(DayBucket::Overflow),
    }
}
