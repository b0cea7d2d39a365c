//! CLI entry point for the scorecard rater.
//!
//! Provides subcommands for converting a spreadsheet into JSON records,
//! aggregating records into a ranked scorecard, and querying a processed
//! scorecard by status, department or performance band.

use anyhow::Result;
use clap::{Parser, Subcommand};
use scorecard_rater::output::{log_group, log_summary};
use scorecard_rater::scoring::filter::{GroupFilter, Performance};
use scorecard_rater::scoring::pipeline::{convert_file, process_file, report_file};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "scorecard_rater")]
#[command(about = "Aggregates scorecard spreadsheets into ranked summaries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a spreadsheet or CSV into a JSON array of records
    Convert {
        /// Spreadsheet (.xlsx, .xls, .ods) or CSV file
        #[arg(value_name = "SPREADSHEET")]
        input: PathBuf,

        /// JSON file to write the records to
        #[arg(short, long, default_value = "data.json")]
        output: PathBuf,
    },
    /// Aggregate records into a scorecard summary
    Process {
        /// Records file (.json, .csv, .xlsx, .xls, .ods)
        #[arg(value_name = "INPUT", default_value = "data.json")]
        input: PathBuf,

        /// JSON file to write the summary to
        #[arg(short, long, default_value = "processed_data.json")]
        output: PathBuf,

        /// Optional: also write every indicator detail to this CSV file
        #[arg(long)]
        details_csv: Option<PathBuf>,
    },
    /// Log the groups of a processed summary, optionally filtered
    Report {
        /// Summary written by `process`
        #[arg(value_name = "SUMMARY", default_value = "processed_data.json")]
        input: PathBuf,

        /// Keep groups with at least one detail in this status (case-insensitive)
        #[arg(long)]
        status: Option<String>,

        /// Keep groups with at least one detail in this department
        #[arg(long)]
        department: Option<String>,

        /// Keep groups in this performance band: zero, low, medium, high or perfect
        #[arg(long)]
        performance: Option<Performance>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_logging()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert { input, output } => {
            convert_file(&input, &output)?;
        }
        Commands::Process {
            input,
            output,
            details_csv,
        } => {
            let summary = process_file(&input, &output, details_csv.as_deref())?;
            log_summary(&summary);
            info!(output = %output.display(), "Summary saved");
        }
        Commands::Report {
            input,
            status,
            department,
            performance,
        } => {
            let filter = GroupFilter {
                status,
                department,
                performance,
            };
            let (summary, groups) = report_file(&input, &filter)?;

            info!(
                score = summary.overall_achieved,
                max_score = summary.overall_maximum,
                percentage = summary.overall_percentage,
                rank = %summary.overall_rank,
                "Scorecard"
            );
            if filter.is_empty() {
                info!(departments = ?summary.departments(), "Departments");
            }
            for group in &groups {
                log_group(group);
            }
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard flushes the file writer when dropped.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/scorecard_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("scorecard_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}
