//! CSV roster loader.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::RosterConfig;
use crate::error::{Result, RosterError};
use crate::pipeline::types::RawRecord;

/// Reads a roster CSV from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, is not valid CSV, or lacks
/// the name, group or subject columns named in `config`.
pub fn load_roster(path: impl AsRef<Path>, config: &RosterConfig) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| RosterError::io(path, e))?;
    let rows = read_roster(file, config)?;
    info!(path = %path.display(), rows = rows.len(), "Roster loaded");
    Ok(rows)
}

/// Reads a roster CSV with a header row from any reader.
///
/// Only headers are trimmed, so name and group cells keep their exact text.
/// Blank score cells load as `None`; cells that do not parse as numbers are
/// coerced to `None` with a warning.
pub fn read_roster<R: Read>(reader: R, config: &RosterConfig) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let column = |name: &str| headers.iter().position(|h| h == name);
    let mut missing = Vec::new();
    let name_idx = column(&config.name_column);
    let group_idx = column(&config.group_column);
    if name_idx.is_none() {
        missing.push(config.name_column.as_str());
    }
    if group_idx.is_none() {
        missing.push(config.group_column.as_str());
    }
    let subject_idx: Vec<Option<usize>> = config.subjects.iter().map(|s| column(s)).collect();
    for (subject, idx) in config.subjects.iter().zip(&subject_idx) {
        if idx.is_none() {
            missing.push(subject.as_str());
        }
    }

    let (Some(name_idx), Some(group_idx), true) =
        (name_idx, group_idx, missing.is_empty())
    else {
        return Err(RosterError::data_shape(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    };
    let subject_idx: Vec<usize> = subject_idx.into_iter().flatten().collect();
    debug!(?subject_idx, "Resolved roster columns");

    let mut rows = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        let line = source_line(index, &record);
        let name = record.get(name_idx).unwrap_or_default();
        let group = record.get(group_idx).unwrap_or_default();
        let scores = subject_idx
            .iter()
            .zip(&config.subjects)
            .map(|(&idx, subject)| parse_score(record.get(idx).unwrap_or_default(), line, subject))
            .collect();
        rows.push(RawRecord::new(name, group, scores));
    }

    Ok(rows)
}

/// 1-based line of `record` in the source file, counting the header.
fn source_line(index: usize, record: &csv::StringRecord) -> u64 {
    record
        .position()
        .map_or(index as u64 + 2, |pos| pos.line())
}

fn parse_score(cell: &str, line: u64, subject: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            warn!(line, subject, value = cell, "Non-numeric score coerced to null");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RosterConfig {
        RosterConfig {
            subjects: vec!["Math".into(), "Physics".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_read_roster_basic() {
        let csv = "Name,Group,Math,Physics\nAlice,G1,90,80\nBob,G2,,75.5\n";
        let rows = read_roster(csv.as_bytes(), &config()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], RawRecord::new("Alice", "G1", vec![Some(90.0), Some(80.0)]));
        assert_eq!(rows[1], RawRecord::new("Bob", "G2", vec![None, Some(75.5)]));
    }

    #[test]
    fn test_read_roster_column_order_and_extra_columns() {
        let csv = "Physics,Email,Group,Name,Math\n70,a@x,G1,Alice,95\n";
        let rows = read_roster(csv.as_bytes(), &config()).unwrap();
        assert_eq!(rows[0].scores, vec![Some(95.0), Some(70.0)]);
    }

    #[test]
    fn test_read_roster_coerces_non_numeric() {
        let csv = "Name,Group,Math,Physics\nAlice,G1,absent,\"88,5\"\n";
        let rows = read_roster(csv.as_bytes(), &config()).unwrap();
        assert_eq!(rows[0].scores, vec![None, None]);
    }

    #[test]
    fn test_read_roster_thousands_separator_is_not_a_score() {
        let config = RosterConfig {
            subjects: vec!["Math".into()],
            min_score: 0.0,
            ..Default::default()
        };
        let csv = "Name,Group,Math\nAlice,G1,\"1,000\"\nBob,G1, 72 \n";
        let rows = read_roster(csv.as_bytes(), &config).unwrap();
        assert_eq!(rows[0].scores, vec![None]);
        assert_eq!(rows[1].scores, vec![Some(72.0)]);
    }

    #[test]
    fn test_read_roster_keeps_names_exact() {
        let config = RosterConfig {
            subjects: vec!["Math".into()],
            ..Default::default()
        };
        let csv = " Name , Group ,Math\n\" Alice\",G1,90\nAlice,G1,80\n";
        let rows = read_roster(csv.as_bytes(), &config).unwrap();
        assert_eq!(rows[0].name, " Alice");
        assert_eq!(rows[1].name, "Alice");
    }

    #[test]
    fn test_source_line_counts_header() {
        let csv = "Name,Group,Math,Physics\nAlice,G1,90,80\nBob,G2,70,75\n";
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let lines: Vec<u64> = rdr
            .records()
            .enumerate()
            .map(|(index, r)| source_line(index, &r.unwrap()))
            .collect();
        assert_eq!(lines, vec![2, 3]);
    }

    #[test]
    fn test_read_roster_missing_columns() {
        let csv = "Student,Group,Math\nAlice,G1,90\n";
        let err = read_roster(csv.as_bytes(), &config()).unwrap_err();
        match err {
            RosterError::DataShape { message } => {
                assert!(message.contains("Name"));
                assert!(message.contains("Physics"));
                assert!(!message.contains("Math"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_roster_missing_file() {
        let err = load_roster("/nonexistent/roster.csv", &config()).unwrap_err();
        assert!(matches!(err, RosterError::Io { .. }));
    }
}
