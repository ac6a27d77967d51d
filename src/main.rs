use clap::{Parser, Subcommand};
use royalbit_pivot::cli;
use royalbit_pivot::core::PivotOptions;
use royalbit_pivot::error::PivotResult;
use royalbit_pivot::report::ReportOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pivot")]
#[command(about = "Booking aging report: destinations x days since booking, from an Excel upload.")]
#[command(long_about = "Pivot - Booking aging report from an Excel workbook

Reads the first sheet of a booking workbook (.xlsx/.xls) with 'Destination'
and 'Booking Date' columns, counts bookings per destination by days since
booking relative to a reference date, and writes a 'Report' worksheet.

BUCKETS:
  0 Days ... 29 Days   exact days since booking
  30+ Days             30 days or more
  (bookings after the reference date are excluded and counted separately)

COMMANDS:
  report   - Write the report workbook (.xlsx)
  preview  - Print the pivot in the terminal

EXAMPLES:
  pivot report bookings.xlsx --date 2024-01-15
  pivot report bookings.xlsx --date 2024-01-15 -o aging.xlsx --all-buckets
  pivot preview bookings.xlsx --date 2024-01-15

Run 'pivot-server' for the upload form in a browser.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Write the booking aging report workbook.

Output defaults to a timestamped file in the current directory
(Report-YYYYMMDD-HHMMSS.xlsx). Rows without a destination or a readable
booking date are skipped and counted; use --verbose to list them.")]
    /// Write the report workbook (.xlsx)
    Report {
        /// Booking workbook (.xlsx or .xls)
        input: PathBuf,

        /// Reference date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// Output Excel file path (.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worksheet name for the report
        #[arg(long, default_value = "Report", env = "PIVOT_SHEET_NAME")]
        sheet: String,

        /// Prefix of the timestamped output file name
        #[arg(long, default_value = "Report", env = "PIVOT_FILE_PREFIX")]
        prefix: String,

        /// Emit every bucket column, including empty ones
        #[arg(long)]
        all_buckets: bool,

        /// Show verbose steps and skipped rows
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the pivot table without writing a file
    Preview {
        /// Booking workbook (.xlsx or .xls)
        input: PathBuf,

        /// Reference date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// Emit every bucket column, including empty ones
        #[arg(long)]
        all_buckets: bool,

        /// Show skipped rows
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> PivotResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            input,
            date,
            output,
            sheet,
            prefix,
            all_buckets,
            verbose,
        } => {
            cli::init_logging(verbose);
            let options = ReportOptions {
                sheet_name: sheet,
                file_prefix: prefix,
                pivot: PivotOptions {
                    include_empty_buckets: all_buckets,
                },
            };
            cli::report(input, date, output, options, verbose)
        }

        Commands::Preview {
            input,
            date,
            all_buckets,
            verbose,
        } => {
            cli::init_logging(verbose);
            let pivot = PivotOptions {
                include_empty_buckets: all_buckets,
            };
            cli::preview(input, date, pivot, verbose)
        }
    }
}
