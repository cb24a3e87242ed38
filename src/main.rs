//! # Shelf CLI
//!
//! Usage:
//!   shelf --records items.json -o report.pdf
//!   shelf --records items.json --options opts.json --ids a1,b7 --format csv

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use shelf::source::{fetch_records_by_ids, InMemoryRecords};
use shelf::{ReportEngine, ReportOptions, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pdf,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "shelf", version, about = "Build inventory reports as PDF or label-printer text")]
struct Cli {
    /// Inventory records, a JSON array.
    #[arg(long)]
    records: PathBuf,

    /// Report options, a JSON object. Defaults apply when omitted.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Only report these record ids, in this order.
    #[arg(long, value_delimiter = ',')]
    ids: Vec<String>,

    #[arg(long, value_enum, default_value_t = Format::Pdf)]
    format: Format,

    /// Output file. Defaults to the suggested file name in the current
    /// directory.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok((path, bytes)) => {
            println!("Written {} bytes to {}", bytes, path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "report failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(PathBuf, usize)> {
    let source = InMemoryRecords::from_json(&fs::read_to_string(&cli.records)?)?;
    let options = match &cli.options {
        Some(path) => ReportOptions::from_json(&fs::read_to_string(path)?)?,
        None => ReportOptions::default(),
    };
    let records = if cli.ids.is_empty() {
        source.all()
    } else {
        fetch_records_by_ids(&source, &cli.ids)
    };

    let engine = ReportEngine::new();
    let now = Local::now().naive_local();
    match cli.format {
        Format::Pdf => {
            let out = engine.build_pdf(&records, &options, now)?;
            let path = cli
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&out.suggested_file_name));
            out.persist(&path)?;
            Ok((path, out.bytes.len()))
        }
        Format::Csv => {
            let out = engine.build_text(&records, &options, now)?;
            let path = cli
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&out.suggested_file_name));
            out.persist(&path)?;
            Ok((path, out.text.len()))
        }
    }
}
