//! Output formatting and persistence for the processed roster.
//!
//! Supports pretty-printing, JSON serialization of stats, and CSV export of
//! the finalized table.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::RosterConfig;
use crate::error::{Result, RosterError};
use crate::pipeline::types::{GroupStats, Record, SummaryStats};

/// Stats envelope handed to report collaborators.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub generated_at: DateTime<Utc>,
    pub overall: SummaryStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupStats>,
}

impl StatsReport {
    pub fn new(overall: SummaryStats, group: Option<GroupStats>) -> Self {
        Self {
            generated_at: Utc::now(),
            overall,
            group,
        }
    }
}

/// Logs a record using Rust's debug pretty-print format.
pub fn print_pretty(record: &Record) {
    debug!("{:#?}", record);
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Header row of the exported table.
pub fn table_headers(config: &RosterConfig) -> Vec<String> {
    let mut headers = vec![config.name_column.clone(), config.group_column.clone()];
    for subject in &config.subjects {
        headers.push(subject.clone());
        headers.push(config.grade_column(subject));
    }
    headers.push(config.gpa_column.clone());
    headers.push(config.scholarship_column.clone());
    headers
}

fn table_row(record: &Record, config: &RosterConfig) -> Vec<String> {
    let mut row = vec![record.name.clone(), record.group.clone()];
    for idx in 0..config.subjects.len() {
        row.push(record.score(idx).map(|s| s.to_string()).unwrap_or_default());
        row.push(record.grade(idx).unwrap_or_default().to_string());
    }
    row.push(
        record
            .composite_score
            .map(|c| format!("{c:.2}"))
            .unwrap_or_default(),
    );
    row.push(if record.eligible {
        config.scholarship_marker.clone()
    } else {
        String::new()
    });
    row
}

/// Writes the finalized table as CSV to any writer.
pub fn write_table<W: Write>(writer: W, records: &[Record], config: &RosterConfig) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(table_headers(config))?;
    for record in records {
        writer.write_record(table_row(record, config))?;
    }
    writer
        .flush()
        .map_err(|e| RosterError::Csv(csv::Error::from(e)))?;
    Ok(())
}

/// Writes the finalized table to a CSV file, creating parent directories.
pub fn save_table(path: impl AsRef<Path>, records: &[Record], config: &RosterConfig) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| RosterError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| RosterError::io(path, e))?;
    write_table(file, records, config)?;
    info!(path = %path.display(), rows = records.len(), "Processed roster saved");
    Ok(())
}
