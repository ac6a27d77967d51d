//! API request handlers
//!
//! The form page, health/version endpoints, and the report endpoints that
//! take a multipart upload (`date`, `file`, optional `all_buckets`).

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use super::server::AppState;
use crate::core::PivotOptions;
use crate::error::{ErrorKind, PivotError, PivotResult};
use crate::report::{Analysis, ReportOptions, ReportOutcome, ReportPipeline, ReportRequest, ReportSource};
use crate::session::Notification;
use crate::types::IngestSummary;

/// MIME type of .xlsx downloads
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const FORM_HTML: &str = include_str!("form.html");

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data,
            error: Some(message.into()),
        }
    }
}

/// GET / - Upload form
pub async fn form() -> Html<&'static str> {
    Html(FORM_HTML)
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub busy: bool,
}

/// GET /health - Health check
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        busy: state.session.is_busy(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec!["report".to_string(), "preview".to_string()],
    }))
}

/// Fields of the upload form
#[derive(Debug, Default)]
pub struct ReportForm {
    pub date: Option<String>,
    pub file: Option<(String, Vec<u8>)>,
    pub all_buckets: bool,
}

impl ReportForm {
    fn into_request(self) -> ReportRequest {
        let source = self
            .file
            .filter(|(_, bytes)| !bytes.is_empty())
            .map(|(file_name, bytes)| ReportSource::Upload { file_name, bytes });
        ReportRequest::new(self.date, source)
    }
}

/// Upload failures: the body limit is its own error, anything else is unreadable
fn upload_error(error: MultipartError) -> PivotError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PivotError::TooLarge(error.body_text())
    } else {
        PivotError::Read(format!("Upload failed: {}", error))
    }
}

/// Collect the form fields from a multipart body
pub async fn read_report_form(mut multipart: Multipart) -> PivotResult<ReportForm> {
    let mut form = ReportForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "date" => {
                let text = field
                    .text()
                    .await
                    .map_err(upload_error)?;
                form.date = Some(text);
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(upload_error)?;
                form.file = Some((file_name, bytes.to_vec()));
            }
            "all_buckets" => {
                let text = field
                    .text()
                    .await
                    .map_err(upload_error)?;
                form.all_buckets = matches!(text.trim(), "on" | "true" | "1");
            }
            _ => {}
        }
    }

    Ok(form)
}

/// HTTP status for a pipeline failure
pub fn status_for(error: &PivotError) -> StatusCode {
    match error.kind() {
        ErrorKind::Input => StatusCode::BAD_REQUEST,
        ErrorKind::Unreadable | ErrorKind::NoData => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorKind::Busy => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &PivotError) -> Response {
    match error.kind() {
        ErrorKind::Internal => tracing::error!("report failed: {}", error),
        _ => tracing::warn!("report rejected: {}", error),
    }
    let body = ApiResponse::err(error.to_string(), Some(Notification::failure(error)));
    (status_for(error), Json(body)).into_response()
}

/// Pipeline for one request, honoring the form's bucket option
fn pipeline_for(state: &AppState, all_buckets: bool) -> ReportPipeline {
    let defaults = state.pipeline.options();
    ReportPipeline::new(ReportOptions {
        pivot: PivotOptions {
            include_empty_buckets: all_buckets || defaults.pivot.include_empty_buckets,
        },
        ..defaults.clone()
    })
}

fn download_response(outcome: ReportOutcome) -> PivotResult<Response> {
    let summary = &outcome.analysis.summary;
    let disposition = format!("attachment; filename=\"{}\"", outcome.file_name);
    let header_err = |e: axum::http::Error| PivotError::Unexpected(e.to_string());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE))
        .header(header::CONTENT_DISPOSITION, disposition)
        .header("x-pivot-counted", summary.counted.to_string())
        .header("x-pivot-excluded", summary.excluded_future.to_string())
        .header("x-pivot-skipped", summary.skipped().to_string())
        .header("x-pivot-destinations", outcome.analysis.pivot.rows.len().to_string())
        .body(Body::from(outcome.workbook))
        .map_err(header_err)
}

/// POST /api/v1/report - Upload bookings, download the report workbook
pub async fn report(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let _guard = match state.session.begin() {
        Ok(guard) => guard,
        Err(e) => return error_response(&e),
    };

    let result = async {
        let form = read_report_form(multipart).await?;
        let pipeline = pipeline_for(&state, form.all_buckets);
        let outcome = pipeline.run(form.into_request()).await?;
        download_response(outcome)
    }
    .await;

    match result {
        Ok(response) => response,
        Err(e) => error_response(&e),
    }
}

/// One pivot row in a preview, counts aligned with the bucket columns
#[derive(Debug, Serialize)]
pub struct PreviewRow {
    pub label: String,
    pub counts: Vec<u64>,
    pub total: u64,
}

/// Preview response
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub reference_date: String,
    pub columns: Vec<String>,
    pub rows: Vec<PreviewRow>,
    pub grand_total: PreviewRow,
    pub summary: IngestSummary,
}

impl From<Analysis> for PreviewResponse {
    fn from(analysis: Analysis) -> Self {
        let pivot = &analysis.pivot;
        let to_row = |row: &crate::types::PivotRow| PreviewRow {
            label: row.label.clone(),
            counts: pivot.buckets.iter().map(|b| row.count(*b)).collect(),
            total: row.total,
        };

        Self {
            reference_date: analysis.reference_date.to_string(),
            columns: pivot.columns(),
            rows: pivot.rows.iter().map(to_row).collect(),
            grand_total: to_row(&pivot.grand_total),
            summary: analysis.summary.clone(),
        }
    }
}

/// POST /api/v1/preview - Upload bookings, get the pivot as JSON
pub async fn preview(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let _guard = match state.session.begin() {
        Ok(guard) => guard,
        Err(e) => return error_response(&e),
    };

    let result = async {
        let form = read_report_form(multipart).await?;
        let pipeline = pipeline_for(&state, form.all_buckets);
        pipeline.analyze(form.into_request()).await
    }
    .await;

    match result {
        Ok(analysis) => Json(ApiResponse::ok(PreviewResponse::from(analysis))).into_response(),
        Err(e) => error_response(&e),
    }
}
