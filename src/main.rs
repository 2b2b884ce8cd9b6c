//! CLI entry point for the Gradebook Rater tool.
//!
//! Loads a student roster, runs the cleaning, grading and scholarship
//! pipeline, and exposes the summary queries as subcommands.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gradebook_rater::loader::load_roster;
use gradebook_rater::output::{StatsReport, print_json, print_pretty, save_table};
use gradebook_rater::{Pipeline, Record, RosterConfig};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gradebook_rater")]
#[command(about = "Grade a student roster and pick scholarship recipients", long_about = None)]
struct Cli {
    /// Roster CSV with name, group and one column per subject
    #[arg(short, long, global = true, default_value = "data/roster.csv")]
    input: PathBuf,

    /// JSON run configuration (falls back to GRADEBOOK_CONFIG, then defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process the roster and write the augmented table as CSV
    Process {
        /// CSV file to write the processed roster to
        #[arg(short, long, default_value = "output/roster_processed.csv")]
        output: PathBuf,
    },
    /// Show overall statistics, or statistics for one group
    Stats {
        /// Group to analyze (defaults to target_group from the config)
        #[arg(short, long)]
        group: Option<String>,
    },
    /// Find students by full or partial name (case-insensitive)
    Find {
        #[arg(value_name = "QUERY")]
        query: String,
    },
    /// List all scholarship recipients
    Scholars,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/gradebook_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gradebook_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

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

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let raw = load_roster(&cli.input, &config)
        .with_context(|| format!("failed to load roster from {}", cli.input.display()))?;

    let mut pipeline = Pipeline::new(config)?;
    pipeline.run(raw)?;

    match cli.command {
        Commands::Process { output } => {
            save_table(&output, pipeline.records()?, pipeline.config())?;
            print_json(&StatsReport::new(pipeline.overall_stats()?, None))?;
        }
        Commands::Stats { group } => {
            let overall = pipeline.overall_stats()?;
            let group_stats = match group {
                Some(group) => Some(pipeline.group_stats(&group)?),
                None if pipeline.config().target_group.is_some() => {
                    Some(pipeline.target_group_stats()?)
                }
                None => None,
            };
            print_json(&StatsReport::new(overall, group_stats))?;
        }
        Commands::Find { query } => {
            let query = query.trim();
            if query.is_empty() {
                warn!("Search term cannot be empty");
                return Ok(());
            }
            let found = pipeline.find_by_name_substring(query)?;
            if found.is_empty() {
                info!(query, "No students found");
            }
            for record in found {
                display_student(record, pipeline.config());
            }
        }
        Commands::Scholars => {
            let scholars = pipeline.scholarship_recipients()?;
            if scholars.is_empty() {
                info!("No students found receiving scholarships");
            }
            for record in &scholars {
                info!(name = %record.name, group = %record.group, gpa = ?record.composite_score, "Scholarship recipient");
            }
            info!(count = scholars.len(), "Scholarship recipients listed");
        }
    }

    Ok(())
}

/// Resolves the run configuration: explicit path, then `GRADEBOOK_CONFIG`,
/// then the built-in defaults.
fn load_config(path: Option<&Path>) -> Result<RosterConfig> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("GRADEBOOK_CONFIG").map(PathBuf::from));
    match path {
        Some(path) => RosterConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => {
            info!("No config file given, using built-in defaults");
            Ok(RosterConfig::default())
        }
    }
}

/// Logs one student's scores, grades, GPA and scholarship status.
fn display_student(record: &Record, config: &RosterConfig) {
    print_pretty(record);
    info!(
        name = %record.name,
        group = %record.group,
        gpa = ?record.composite_score,
        scholarship = record.eligible,
        "Student"
    );
    for (idx, subject) in config.subjects.iter().enumerate() {
        info!(
            subject = %subject,
            score = ?record.score(idx),
            grade = record.grade(idx).unwrap_or("N/A"),
            "Score"
        );
    }
}
