//! Report pipeline: ingestion → pivot → export
//!
//! One call per user action. Reading the file is the only await point; the
//! transform and export that follow are synchronous.

use crate::core::{build_pivot, parse_reference_date, PivotOptions};
use crate::error::{PivotError, PivotResult};
use crate::excel::{
    timestamped_file_name, ExcelExporter, ExcelImporter, DEFAULT_FILE_PREFIX, DEFAULT_SHEET_NAME,
};
use crate::types::{IngestSummary, PivotTable};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File extensions accepted as booking workbooks
pub const ACCEPTED_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Where the booking workbook comes from
#[derive(Debug, Clone)]
pub enum ReportSource {
    /// A workbook on disk, read when the pipeline runs
    Path(PathBuf),
    /// An uploaded workbook already in memory
    Upload { file_name: String, bytes: Vec<u8> },
}

impl ReportSource {
    pub fn name(&self) -> String {
        match self {
            ReportSource::Path(path) => path.display().to_string(),
            ReportSource::Upload { file_name, .. } => file_name.clone(),
        }
    }

    fn check_extension(&self) -> PivotResult<()> {
        let name = self.name();
        if name.is_empty() {
            return Ok(());
        }
        let accepted = Path::new(&name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                ACCEPTED_EXTENSIONS
                    .iter()
                    .any(|a| a.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false);
        if accepted {
            Ok(())
        } else {
            Err(PivotError::UnsupportedFile(name))
        }
    }
}

/// What the user submitted: a reference date and a file, either possibly missing
#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    pub reference_date: Option<String>,
    pub source: Option<ReportSource>,
}

impl ReportRequest {
    pub fn new(reference_date: Option<String>, source: Option<ReportSource>) -> Self {
        Self {
            reference_date,
            source,
        }
    }

    /// Check both inputs before anything is read or computed
    pub fn validate(self) -> PivotResult<(NaiveDate, ReportSource)> {
        let date = self
            .reference_date
            .filter(|d| !d.trim().is_empty());

        let (date, source) = match (date, self.source) {
            (Some(date), Some(source)) => (date, source),
            (None, Some(_)) => {
                return Err(PivotError::MissingInput(
                    "choose a reference date".to_string(),
                ))
            }
            (Some(_), None) => {
                return Err(PivotError::MissingInput(
                    "choose a file to upload".to_string(),
                ))
            }
            (None, None) => {
                return Err(PivotError::MissingInput(
                    "choose a reference date and a file to upload".to_string(),
                ))
            }
        };

        if let ReportSource::Upload { bytes, .. } = &source {
            if bytes.is_empty() {
                return Err(PivotError::MissingInput(
                    "choose a file to upload".to_string(),
                ));
            }
        }

        let reference = parse_reference_date(&date)?;
        source.check_extension()?;
        Ok((reference, source))
    }
}

/// Knobs for the generated report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub sheet_name: String,
    pub file_prefix: String,
    pub pivot: PivotOptions,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            pivot: PivotOptions::default(),
        }
    }
}

/// Pivot plus ingestion counts, before export
#[derive(Debug, Clone)]
pub struct Analysis {
    pub reference_date: NaiveDate,
    pub source: String,
    pub pivot: PivotTable,
    pub summary: IngestSummary,
}

/// A finished report ready to save or download
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub analysis: Analysis,
    pub file_name: String,
    pub workbook: Vec<u8>,
}

/// Runs report requests with a fixed set of options
#[derive(Debug, Clone, Default)]
pub struct ReportPipeline {
    options: ReportOptions,
}

impl ReportPipeline {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Build the report workbook for a request
    pub async fn run(&self, request: ReportRequest) -> PivotResult<ReportOutcome> {
        let analysis = self.analyze(request).await?;
        self.render(analysis)
    }

    /// Same as [`run`](Self::run), reading the file synchronously
    pub fn run_blocking(&self, request: ReportRequest) -> PivotResult<ReportOutcome> {
        let analysis = self.analyze_blocking(request)?;
        self.render(analysis)
    }

    /// Compute the pivot without producing a workbook
    pub async fn analyze(&self, request: ReportRequest) -> PivotResult<Analysis> {
        let (reference, source) = request.validate()?;
        let (name, bytes) = match source {
            ReportSource::Path(path) => {
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| PivotError::Read(format!("{}: {}", path.display(), e)))?;
                (path.display().to_string(), bytes)
            }
            ReportSource::Upload { file_name, bytes } => (file_name, bytes),
        };
        self.analyze_bytes(name, bytes, reference)
    }

    /// Same as [`analyze`](Self::analyze), reading the file synchronously
    pub fn analyze_blocking(&self, request: ReportRequest) -> PivotResult<Analysis> {
        let (reference, source) = request.validate()?;
        let importer = match source {
            ReportSource::Path(path) => ExcelImporter::from_path(path)?,
            ReportSource::Upload { file_name, bytes } => {
                ExcelImporter::from_bytes(file_name, bytes)
            }
        };
        self.analyze_importer(&importer, reference)
    }

    fn analyze_bytes(
        &self,
        name: String,
        bytes: Vec<u8>,
        reference: NaiveDate,
    ) -> PivotResult<Analysis> {
        let importer = ExcelImporter::from_bytes(name, bytes);
        self.analyze_importer(&importer, reference)
    }

    fn analyze_importer(
        &self,
        importer: &ExcelImporter,
        reference: NaiveDate,
    ) -> PivotResult<Analysis> {
        let ingested = importer.import()?;
        debug!(
            records = ingested.records.len(),
            issues = ingested.issues.len(),
            "ingested booking sheet"
        );

        let outcome = build_pivot(&ingested.records, reference, self.options.pivot);
        let summary = IngestSummary {
            rows_read: ingested.rows_read,
            counted: outcome.counted,
            excluded_future: outcome.excluded_future,
            issues: ingested.issues,
        };

        Ok(Analysis {
            reference_date: reference,
            source: importer.source().to_string(),
            pivot: outcome.table,
            summary,
        })
    }

    /// Export an analysis to workbook bytes with a timestamped name
    pub fn render(&self, analysis: Analysis) -> PivotResult<ReportOutcome> {
        let workbook = ExcelExporter::new(&analysis.pivot)
            .with_sheet_name(self.options.sheet_name.clone())
            .to_bytes()?;
        let file_name =
            timestamped_file_name(&self.options.file_prefix, Local::now().naive_local());

        info!(
            source = %analysis.source,
            reference = %analysis.reference_date,
            destinations = analysis.pivot.rows.len(),
            counted = analysis.summary.counted,
            excluded = analysis.summary.excluded_future,
            skipped = analysis.summary.skipped(),
            file = %file_name,
            "report generated"
        );

        Ok(ReportOutcome {
            analysis,
            file_name,
            workbook,
        })
    }
}
