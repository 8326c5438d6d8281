//! `fitcoach` command-line entry point.
//!
//! # Responsibility
//! - Expose transform, load and statistics use-cases at the process boundary.
//! - Keep stdout for JSON/report output; logs go to stderr or a log directory.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fitcoach_core::db::open_store;
use fitcoach_core::{
    default_log_level, handle_stats_request, handle_store_stats_request, health, init_logging,
    read_transform_output, transform_export, ExportDocument, LoadReport, Loader, StatsRequest,
    StoreConfig,
};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Workout export ETL and statistics
#[derive(Parser, Debug)]
#[command(name = "fitcoach", about = "Workout export ETL and statistics", version)]
struct Cli {
    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "FITCOACH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rotating log files; stderr when unset
    #[arg(long, global = true, env = "FITCOACH_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Transform an export document into normalized records
    Transform {
        /// Export JSON file; stdin when unset
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output JSON file; stdout when unset
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Load a transform output file into the store
    Load {
        /// Transform output JSON file
        path: PathBuf,
        /// Store connection string
        #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
        database_url: Option<String>,
    },
    /// Compute one statistic from a request document
    Stats {
        /// Request JSON file; stdin when unset
        #[arg(long)]
        request: Option<PathBuf>,
    },
    /// Compute one statistic over a user's stored workouts
    StoreStats {
        #[arg(long)]
        user_id: String,
        /// Inclusive start date, YYYY-MM-DD
        #[arg(long)]
        start_date: String,
        /// Inclusive end date, YYYY-MM-DD
        #[arg(long)]
        end_date: String,
        /// avg_heart_rate | total_distance | total_duration | run_count | avg_pace_min_per_km
        #[arg(long)]
        field: String,
        /// Store connection string
        #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
        database_url: Option<String>,
    },
    /// Print liveness status
    Health,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    init_logging(level, cli.log_dir.as_deref())
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;

    run(cli.command)
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Transform { input, output } => {
            let reader = open_input(input.as_deref())?;
            let writer = open_output(output.as_deref())?;
            transform_document(reader, writer)
        }
        Command::Load { path, database_url } => {
            let config = StoreConfig::from_optional_url(database_url.as_deref())?;
            let batch = read_transform_output(&path)?;
            let mut conn = open_store(&config).context("failed to open store")?;

            let report = Loader::new(&mut conn).load_transform_output(&batch)?;
            info!(
                "event=load_complete module=cli users={} users_created={} workouts={} knowledge={}",
                report.users_referenced,
                report.users_created,
                report.workouts_loaded,
                report.knowledge_loaded
            );
            for line in load_summary_lines(&report) {
                println!("{line}");
            }
            Ok(())
        }
        Command::Stats { request } => {
            let reader = open_input(request.as_deref())?;
            stats_document(reader, std::io::stdout().lock())
        }
        Command::StoreStats {
            user_id,
            start_date,
            end_date,
            field,
            database_url,
        } => {
            let config = StoreConfig::from_optional_url(database_url.as_deref())?;
            let conn = open_store(&config).context("failed to open store")?;
            let response =
                handle_store_stats_request(&conn, &user_id, &start_date, &end_date, &field)?;
            write_json(std::io::stdout().lock(), &response)
        }
        Command::Health => write_json(std::io::stdout().lock(), &health()),
    }
}

/// Summary lines for sections that actually loaded records.
fn load_summary_lines(report: &LoadReport) -> Vec<String> {
    let mut lines = Vec::new();
    if report.workouts_loaded > 0 {
        lines.push(format!("loaded {} workouts", report.workouts_loaded));
    }
    if report.knowledge_loaded > 0 {
        lines.push(format!(
            "loaded {} knowledge_base records",
            report.knowledge_loaded
        ));
    }
    lines
}

/// Reads an export document and writes the transform output as pretty JSON.
fn transform_document<R: Read, W: Write>(reader: R, writer: W) -> Result<()> {
    let doc: ExportDocument = read_json(reader).context("invalid export document")?;
    write_json(writer, &transform_export(&doc))
}

/// Reads a statistics request and writes the response as pretty JSON.
fn stats_document<R: Read, W: Write>(reader: R, writer: W) -> Result<()> {
    let request: StatsRequest = read_json(reader).context("invalid stats request")?;
    write_json(writer, &handle_stats_request(&request))
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open `{}`", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(std::io::stdin().lock())),
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create `{}`", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(std::io::stdout().lock())),
    }
}

fn read_json<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    Ok(serde_json::from_reader(reader)?)
}

fn write_json<T: Serialize, W: Write>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
