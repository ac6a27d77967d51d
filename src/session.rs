//! Busy-state tracking and user notifications for report actions

use crate::error::{ErrorKind, PivotError, PivotResult};
use crate::report::{ReportOutcome, ReportPipeline, ReportRequest};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks whether a report action is in flight.
///
/// A second action while one is running is refused with
/// [`PivotError::Busy`] instead of queued.
#[derive(Debug, Default)]
pub struct ReportSession {
    busy: AtomicBool,
}

impl ReportSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Mark the session busy until the returned guard is dropped
    pub fn begin(&self) -> PivotResult<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PivotError::Busy)?;
        Ok(BusyGuard { session: self })
    }

    /// Run one request under the busy flag
    pub fn run_blocking(
        &self,
        pipeline: &ReportPipeline,
        request: ReportRequest,
    ) -> PivotResult<ReportOutcome> {
        let _guard = self.begin()?;
        pipeline.run_blocking(request)
    }
}

/// Clears the session's busy flag on drop, whatever the exit path
#[derive(Debug)]
pub struct BusyGuard<'a> {
    session: &'a ReportSession,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.session.busy.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient, non-blocking message shown to the user after an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(outcome: &ReportOutcome) -> Self {
        let summary = &outcome.analysis.summary;
        let mut message = format!(
            "{}: {} bookings across {} destinations",
            outcome.file_name,
            summary.counted,
            outcome.analysis.pivot.rows.len()
        );
        if summary.excluded_future > 0 {
            message.push_str(&format!(
                ", {} after the reference date excluded",
                summary.excluded_future
            ));
        }
        if summary.skipped() > 0 {
            message.push_str(&format!(", {} rows skipped", summary.skipped()));
        }

        Self {
            level: NotificationLevel::Success,
            title: "Report ready".to_string(),
            message,
        }
    }

    pub fn failure(error: &PivotError) -> Self {
        let title = match error.kind() {
            ErrorKind::Input => match error {
                PivotError::MissingInput(_) => "No file or date selected",
                _ => "Invalid input",
            },
            ErrorKind::Unreadable => "Error reading the file. Please try again.",
            ErrorKind::TooLarge => "File too large",
            ErrorKind::NoData => "No valid data found in the file.",
            ErrorKind::Busy => "A report is already being generated",
            ErrorKind::Internal => "Something went wrong. Please try again.",
        };

        Self {
            level: NotificationLevel::Error,
            title: title.to_string(),
            message: error.to_string(),
        }
    }
}
