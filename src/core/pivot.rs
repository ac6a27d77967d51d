//! Pivot aggregation: destination x day bucket counts with marginal totals

use super::bucket::assign_bucket;
use super::dates::day_offset;
use crate::types::{BookingRecord, DayBucket, PivotRow, PivotTable, GRAND_TOTAL_LABEL};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Options that shape the pivot columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PivotOptions {
    /// Emit every bucket column (0..29 Days, 30+ Days), not only observed ones
    pub include_empty_buckets: bool,
}

/// A finished pivot plus the record counts behind it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotOutcome {
    pub table: PivotTable,
    /// Records that landed in a bucket
    pub counted: usize,
    /// Records dated after the reference date
    pub excluded_future: usize,
}

/// Single-pass accumulator for booking records
pub struct PivotBuilder {
    reference: NaiveDate,
    options: PivotOptions,
    destinations: BTreeMap<String, BTreeMap<DayBucket, u64>>,
    totals: BTreeMap<DayBucket, u64>,
    counted: usize,
    excluded_future: usize,
}

impl PivotBuilder {
    pub fn new(reference: NaiveDate, options: PivotOptions) -> Self {
        Self {
            reference,
            options,
            destinations: BTreeMap::new(),
            totals: BTreeMap::new(),
            counted: 0,
            excluded_future: 0,
        }
    }

    /// Add one record, returning the bucket it was counted in.
    ///
    /// The destination gets a row even when the record is excluded.
    pub fn add(&mut self, record: &BookingRecord) -> Option<DayBucket> {
        let counts = self
            .destinations
            .entry(record.destination.clone())
            .or_default();

        let offset = day_offset(record.booking_date, self.reference);
        match assign_bucket(offset) {
            Some(bucket) => {
                *counts.entry(bucket).or_insert(0) += 1;
                *self.totals.entry(bucket).or_insert(0) += 1;
                self.counted += 1;
                Some(bucket)
            }
            None => {
                self.excluded_future += 1;
                None
            }
        }
    }

    pub fn finish(self) -> PivotOutcome {
        let buckets: Vec<DayBucket> = if self.options.include_empty_buckets {
            DayBucket::all().collect()
        } else {
            // Key order of the totals map is the report column order
            self.totals.keys().copied().collect()
        };

        let rows: Vec<PivotRow> = self
            .destinations
            .into_iter()
            .map(|(destination, counts)| {
                let total = counts.values().sum();
                PivotRow {
                    label: destination,
                    counts,
                    total,
                }
            })
            .collect();

        let grand_total = PivotRow {
            label: GRAND_TOTAL_LABEL.to_string(),
            total: self.totals.values().sum(),
            counts: self.totals,
        };

        PivotOutcome {
            table: PivotTable {
                buckets,
                rows,
                grand_total,
            },
            counted: self.counted,
            excluded_future: self.excluded_future,
        }
    }
}

/// Build the pivot for `records` as of `reference`
pub fn build_pivot(
    records: &[BookingRecord],
    reference: NaiveDate,
    options: PivotOptions,
) -> PivotOutcome {
    let mut builder = PivotBuilder::new(reference, options);
    for record in records {
        builder.add(record);
    }
    builder.finish()
}
