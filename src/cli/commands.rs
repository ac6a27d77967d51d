use crate::core::PivotOptions;
use crate::error::{PivotError, PivotResult};
use crate::report::{Analysis, ReportOptions, ReportPipeline, ReportRequest, ReportSource};
use crate::session::{Notification, ReportSession};
use crate::types::{IngestSummary, PivotTable};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

/// Install the stderr tracing subscriber (idempotent)
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "royalbit_pivot=debug"
    } else {
        "royalbit_pivot=error"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Execute the report command
pub fn report(
    input: PathBuf,
    date: Option<String>,
    output: Option<PathBuf>,
    options: ReportOptions,
    verbose: bool,
) -> PivotResult<()> {
    println!("{}", "📊 Pivot - Booking Aging Report".bold().green());
    println!("   Input: {}", input.display());
    if let Some(ref d) = date {
        println!("   Reference date: {}", d.bright_yellow().bold());
    }
    println!();

    if verbose {
        println!("{}", "📖 Reading booking sheet...".cyan());
    }

    let session = ReportSession::new();
    let pipeline = ReportPipeline::new(options);
    let request = ReportRequest::new(date, Some(ReportSource::Path(input)));

    let outcome = match session.run_blocking(&pipeline, request) {
        Ok(outcome) => outcome,
        Err(e) => {
            print_notification(&Notification::failure(&e));
            return Err(e);
        }
    };

    let output = output.unwrap_or_else(|| PathBuf::from(&outcome.file_name));
    if verbose {
        println!("{}", format!("💾 Writing {}...", output.display()).cyan());
    }
    if let Err(e) = fs::write(&output, &outcome.workbook) {
        let e: PivotError = e.into();
        print_notification(&Notification::failure(&e));
        return Err(e);
    }

    print_notification(&Notification::success(&outcome));
    print_summary(&outcome.analysis.summary, verbose);
    println!("   Excel file: {}\n", output.display());

    Ok(())
}

/// Execute the preview command: print the pivot without writing a file
pub fn preview(
    input: PathBuf,
    date: Option<String>,
    pivot: PivotOptions,
    verbose: bool,
) -> PivotResult<()> {
    println!("{}", "📊 Pivot - Preview".bold().green());
    println!("   Input: {}", input.display());
    println!();

    let pipeline = ReportPipeline::new(ReportOptions {
        pivot,
        ..ReportOptions::default()
    });
    let request = ReportRequest::new(date, Some(ReportSource::Path(input)));

    let analysis: Analysis = match pipeline.analyze_blocking(request) {
        Ok(analysis) => analysis,
        Err(e) => {
            print_notification(&Notification::failure(&e));
            return Err(e);
        }
    };

    println!(
        "{}",
        format!("✅ Bookings as of {}:", analysis.reference_date)
            .bold()
            .green()
    );
    println!();
    print!("{}", render_table(&analysis.pivot));
    println!();
    print_summary(&analysis.summary, verbose);

    Ok(())
}

fn print_notification(notification: &Notification) {
    use crate::session::NotificationLevel;

    match notification.level {
        NotificationLevel::Success => {
            println!("{}", format!("✅ {}", notification.title).bold().green());
            println!("   {}", notification.message);
        }
        NotificationLevel::Error => {
            println!("{}", format!("❌ {}", notification.title).bold().red());
            println!("   {}", notification.message.red());
        }
    }
}

fn print_summary(summary: &IngestSummary, verbose: bool) {
    println!(
        "   Rows read: {}  Counted: {}  Future: {}  Skipped: {}",
        summary.rows_read,
        summary.counted.to_string().green(),
        summary.excluded_future.to_string().yellow(),
        summary.skipped().to_string().red()
    );

    if summary.issues.is_empty() {
        return;
    }
    if verbose {
        println!("\n   {}", "⚠️  Skipped rows:".yellow());
        for issue in &summary.issues {
            if issue.value.is_empty() {
                println!("      row {}: {}", issue.row, issue.reason);
            } else {
                println!("      row {}: {} ({:?})", issue.row, issue.reason, issue.value);
            }
        }
    } else {
        println!(
            "{}",
            "   💡 Run with --verbose to list skipped rows".yellow()
        );
    }
}

/// Render a pivot as a fixed-width text table
fn render_table(table: &PivotTable) -> String {
    let columns = table.columns();

    let mut lines: Vec<Vec<String>> = Vec::with_capacity(table.rows.len() + 2);
    lines.push(columns.clone());
    for row in table.all_rows() {
        let mut cells = Vec::with_capacity(columns.len());
        cells.push(row.label.clone());
        cells.extend(table.buckets.iter().map(|b| row.count(*b).to_string()));
        cells.push(row.total.to_string());
        lines.push(cells);
    }

    let widths: Vec<usize> = (0..columns.len())
        .map(|col| {
            lines
                .iter()
                .map(|cells| cells[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let last = lines.len() - 1;
    for (idx, cells) in lines.iter().enumerate() {
        if idx == last {
            out.push_str(&rule(&widths));
        }
        let formatted: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                if col == 0 {
                    format!("{:<width$}", cell, width = widths[col])
                } else {
                    format!("{:>width$}", cell, width = widths[col])
                }
            })
            .collect();
        out.push_str("   ");
        out.push_str(formatted.join("  ").trim_end());
        out.push('\n');
        if idx == 0 {
            out.push_str(&rule(&widths));
        }
    }
    out
}

fn rule(widths: &[usize]) -> String {
    let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    format!("   {}\n", "─".repeat(total))
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
