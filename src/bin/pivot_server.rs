//! Pivot API Server binary
//!
//! Upload form and report download over HTTP.

use clap::Parser;
use royalbit_pivot::api::{run_api_server, server::ApiConfig};
use royalbit_pivot::core::PivotOptions;
use royalbit_pivot::report::ReportOptions;

#[derive(Parser, Debug)]
#[command(name = "pivot-server")]
#[command(version)]
#[command(author = "RoyalBit Inc. <admin@royalbit.ca>")]
#[command(about = "Pivot Server - booking aging report upload form")]
#[command(long_about = r#"
Pivot Server - booking aging report upload form

Endpoints:
  - GET  /                 - Upload form (date, Excel file)
  - POST /api/v1/report    - Multipart upload, returns the .xlsx report
  - POST /api/v1/preview   - Multipart upload, returns the pivot as JSON
  - GET  /health           - Health check
  - GET  /version          - Server version info

Only one report runs at a time; concurrent submissions get 409 Conflict.

Example usage:
  pivot-server                           # Start on localhost:8080
  pivot-server --host 0.0.0.0 --port 3000

  curl -F date=2024-01-15 -F file=@bookings.xlsx \
    -o report.xlsx http://localhost:8080/api/v1/report
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "PIVOT_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "PIVOT_PORT")]
    port: u16,

    /// Largest accepted upload in megabytes
    #[arg(long, default_value = "20", env = "PIVOT_MAX_UPLOAD_MB")]
    max_upload_mb: usize,

    /// Worksheet name for the report
    #[arg(long, default_value = "Report", env = "PIVOT_SHEET_NAME")]
    sheet: String,

    /// Prefix of the timestamped download name
    #[arg(long, default_value = "Report", env = "PIVOT_FILE_PREFIX")]
    prefix: String,

    /// Always emit every bucket column
    #[arg(long)]
    all_buckets: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        max_upload_bytes: args.max_upload_mb * 1024 * 1024,
        report: ReportOptions {
            sheet_name: args.sheet,
            file_prefix: args.prefix,
            pivot: PivotOptions {
                include_empty_buckets: args.all_buckets,
            },
        },
    };

    run_api_server(config).await
}
