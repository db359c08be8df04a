//! Healthstream CLI
//!
//! Command-line interface over the export reader:
//! - List records
//! - Reconstruct sleep sessions
//! - List vital signs
//! - Generate a config file

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use healthstream::config::{generate_default_config, Config};
use healthstream::logging::init_tracing;
use healthstream::parser::{format_timestamp, iter_health_records, AttrValue, HealthRecord, RecordFilter};
use healthstream::sleep::{gap_from_hours, sleep_sessions, SleepSession};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "healthstream")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Read Apple Health exports and reconstruct sleep sessions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List records of an export
    Records {
        /// Path to export.xml
        file: PathBuf,
        /// Record types or tags (comma-separated or repeated)
        #[arg(short, long)]
        types: Vec<String>,
        /// Inclusive start (export format, ISO-8601 or naive)
        #[arg(short, long)]
        start: Option<String>,
        /// Inclusive end
        #[arg(short, long)]
        end: Option<String>,
        /// Stop after this many records
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Reconstruct sleep sessions
    Sessions {
        /// Path to export.xml
        file: PathBuf,
        #[arg(short, long)]
        start: Option<String>,
        #[arg(short, long)]
        end: Option<String>,
        /// Idle gap separating sessions (default: from config)
        #[arg(short, long)]
        gap_hours: Option<f64>,
    },

    /// List vital-sign records
    Vitals {
        /// Path to export.xml
        file: PathBuf,
        /// Types to include (default: from config)
        #[arg(short, long)]
        types: Vec<String>,
        #[arg(short, long)]
        start: Option<String>,
        #[arg(short, long)]
        end: Option<String>,
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::from_env(),
    };
    // Quiet by default; output goes to stdout, logs to stderr
    let mut logging = config.logging.clone();
    if std::env::var_os("RUST_LOG").is_none() && logging.file.is_none() {
        logging.level = "warn".to_string();
    }
    init_tracing(&logging).context("initializing logging")?;

    match cli.command {
        Commands::Records {
            file,
            types,
            start,
            end,
            limit,
        } => {
            let filter = window(split_list(&types), start, end);
            let records = read_records(&file, filter, limit)?;
            print_records(&records, cli.format)?;
        }

        Commands::Vitals {
            file,
            types,
            start,
            end,
            limit,
        } => {
            let mut types = split_list(&types);
            if types.is_empty() {
                types = config.parser.vital_types.clone();
            }
            let records = read_records(&file, window(types, start, end), limit)?;
            print_records(&records, cli.format)?;
        }

        Commands::Sessions {
            file,
            start,
            end,
            gap_hours,
        } => {
            let gap_hours = gap_hours.unwrap_or(config.sleep.gap_hours);
            if !gap_hours.is_finite() || gap_hours <= 0.0 {
                anyhow::bail!("--gap-hours must be greater than 0, got {}", gap_hours);
            }
            let sessions = sleep_sessions(&file, start.as_deref(), end.as_deref(), gap_from_hours(gap_hours))
                .with_context(|| format!("reading {}", file.display()))?;
            print_sessions(&sessions, cli.format)?;
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Flatten repeated and comma-separated values
fn split_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn window(types: Vec<String>, start: Option<String>, end: Option<String>) -> RecordFilter {
    RecordFilter::new()
        .types(types)
        .start(start.as_deref())
        .end(end.as_deref())
}

fn read_records(file: &Path, filter: RecordFilter, limit: Option<usize>) -> anyhow::Result<Vec<HealthRecord>> {
    let reader = iter_health_records(file, filter).with_context(|| format!("reading {}", file.display()))?;
    Ok(match limit {
        Some(n) => reader.take(n).collect(),
        None => reader.collect(),
    })
}

fn print_records(records: &[HealthRecord], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => write_records_csv(records, std::io::stdout())?,
        OutputFormat::Table => print_records_table(records),
    }
    Ok(())
}

/// One column per attribute key, in first-seen order. Nested lists are
/// written as JSON.
fn write_records_csv(records: &[HealthRecord], out: impl Write) -> anyhow::Result<()> {
    let mut columns: Vec<&str> = Vec::new();
    for record in records {
        for key in record.attributes().keys() {
            if !columns.contains(&key) {
                columns.push(key);
            }
        }
    }

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&columns)?;
    for record in records {
        let row = columns
            .iter()
            .map(|key| match record.attributes().get(key) {
                Some(AttrValue::Scalar(s)) => Ok(s.clone()),
                Some(nested) => serde_json::to_string(nested),
                None => Ok(String::new()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_records_table(records: &[HealthRecord]) {
    if records.is_empty() {
        println!("No records found");
        return;
    }

    println!("{:<14} {:<50} {:<26} {:<26} {}", "Tag", "Type", "Start", "End", "Value");
    println!("{}", "-".repeat(130));

    for record in records {
        println!(
            "{:<14} {:<50} {:<26} {:<26} {}",
            record.tag(),
            record.record_type(),
            record.start().map(|t| format_timestamp(&t)).unwrap_or_else(|| "-".to_string()),
            record.end().map(|t| format_timestamp(&t)).unwrap_or_else(|| "-".to_string()),
            record.get("value").unwrap_or("-"),
        );
    }
    println!();
    println!("{} records", records.len());
}

fn print_sessions(sessions: &[SleepSession], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(sessions)?),
        OutputFormat::Csv => write_sessions_csv(sessions, std::io::stdout())?,
        OutputFormat::Table => print_sessions_table(sessions),
    }
    Ok(())
}

fn write_sessions_csv(sessions: &[SleepSession], out: impl Write) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "startDate",
        "endDate",
        "duration",
        "asleepDuration",
        "awakeDuration",
        "awakenings",
        "segments",
    ])?;
    for session in sessions {
        let summary = session.summary();
        writer.write_record([
            summary.start_date,
            summary.end_date,
            summary.duration.to_string(),
            summary.asleep_duration.to_string(),
            summary.awake_duration.to_string(),
            summary.awakenings.to_string(),
            summary.segments.len().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_sessions_table(sessions: &[SleepSession]) {
    if sessions.is_empty() {
        println!("No sleep sessions found");
        return;
    }

    println!(
        "{:<26} {:<26} {:>9} {:>9} {:>9} {:>10}",
        "Start", "End", "In bed", "Asleep", "Awake", "Awakenings"
    );
    println!("{}", "-".repeat(96));

    for session in sessions {
        println!(
            "{:<26} {:<26} {:>9} {:>9} {:>9} {:>10}",
            format_timestamp(&session.start()),
            format_timestamp(&session.end()),
            format_duration(session.duration().num_seconds()),
            format_duration(session.asleep_duration().num_seconds()),
            format_duration(session.awake_duration().num_seconds()),
            session.awakenings(),
        );
    }
}

fn format_duration(seconds: i64) -> String {
    if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}
