use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::config::RosterConfig;
use crate::error::{Result, RosterError};
use crate::pipeline::types::{RawRecord, Record};

/// Deduplicates the roster by name and nulls scores outside the valid range.
///
/// The first row of every name wins. Out-of-range and `NaN` scores become
/// `None`; the only failure is a row whose score layout does not match the
/// configured subjects.
pub fn clean(records: Vec<RawRecord>, config: &RosterConfig) -> Result<Vec<Record>> {
    let n_subjects = config.subjects.len();
    if let Some((row, raw)) = records
        .iter()
        .enumerate()
        .find(|(_, r)| r.scores.len() != n_subjects)
    {
        return Err(RosterError::data_shape(format!(
            "row {} ('{}') has {} score columns, expected {} ({})",
            row,
            raw.name,
            raw.scores.len(),
            n_subjects,
            config.subjects.join(", ")
        )));
    }

    let initial_rows = records.len();
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    for raw in &records {
        *occurrences.entry(raw.name.clone()).or_default() += 1;
    }

    let mut seen = HashSet::new();
    let mut cleaned: Vec<Record> = records
        .into_iter()
        .filter(|raw| seen.insert(raw.name.clone()))
        .map(Record::from_raw)
        .collect();

    let removed = initial_rows - cleaned.len();
    if removed > 0 {
        let duplicated: Vec<&str> = cleaned
            .iter()
            .filter(|r| occurrences.get(&r.name).copied().unwrap_or(0) > 1)
            .map(|r| r.name.as_str())
            .collect();
        warn!(
            removed,
            names = ?duplicated,
            "Duplicate names found, keeping first occurrence"
        );
    } else {
        debug!("No duplicate names found");
    }

    for (idx, subject) in config.subjects.iter().enumerate() {
        let mut invalidated = 0usize;
        for record in &mut cleaned {
            if let Some(score) = record.scores[idx] {
                if score.is_nan() || !config.in_range(score) {
                    record.scores[idx] = None;
                    invalidated += 1;
                }
            }
        }
        if invalidated > 0 {
            warn!(
                subject = %subject,
                invalidated,
                min = config.min_score,
                max = config.max_score,
                "Scores outside the valid range set to null"
            );
        }
    }

    info!(rows = cleaned.len(), removed, "Roster cleaning completed");
    Ok(cleaned)
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
    fn test_duplicates_keep_first_occurrence() {
        let raw = vec![
            RawRecord::new("Alice", "A", vec![Some(90.0), Some(80.0)]),
            RawRecord::new("Bob", "A", vec![Some(70.0), Some(75.0)]),
            RawRecord::new("Alice", "B", vec![Some(60.0), Some(60.0)]),
            RawRecord::new("Bob", "B", vec![None, None]),
        ];
        let cleaned = clean(raw, &config()).unwrap();

        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].name, "Alice");
        assert_eq!(cleaned[0].group, "A");
        assert_eq!(cleaned[0].scores, vec![Some(90.0), Some(80.0)]);
        assert_eq!(cleaned[1].name, "Bob");
        assert_eq!(cleaned[1].group, "A");
    }

    #[test]
    fn test_out_of_range_scores_become_null() {
        let raw = vec![
            RawRecord::new("Alice", "A", vec![Some(59.0), Some(101.0)]),
            RawRecord::new("Bob", "A", vec![Some(60.0), Some(100.0)]),
        ];
        let cleaned = clean(raw, &config()).unwrap();

        assert_eq!(cleaned[0].scores, vec![None, None]);
        assert_eq!(cleaned[1].scores, vec![Some(60.0), Some(100.0)]);
    }

    #[test]
    fn test_missing_and_nan_scores_stay_null() {
        let raw = vec![RawRecord::new("Alice", "A", vec![None, Some(f64::NAN)])];
        let cleaned = clean(raw, &config()).unwrap();
        assert_eq!(cleaned[0].scores, vec![None, None]);
    }

    #[test]
    fn test_derived_fields_start_empty() {
        let raw = vec![RawRecord::new("Alice", "A", vec![Some(90.0), Some(80.0)])];
        let cleaned = clean(raw, &config()).unwrap();
        assert_eq!(cleaned[0].grades, vec![None, None]);
        assert_eq!(cleaned[0].composite_score, None);
        assert!(!cleaned[0].eligible);
    }

    #[test]
    fn test_mismatched_row_is_data_shape_error() {
        let raw = vec![
            RawRecord::new("Alice", "A", vec![Some(90.0), Some(80.0)]),
            RawRecord::new("Bob", "A", vec![Some(70.0)]),
        ];
        let err = clean(raw, &config()).unwrap_err();
        assert!(matches!(err, RosterError::DataShape { .. }));
    }

    #[test]
    fn test_empty_roster() {
        let cleaned = clean(Vec::new(), &config()).unwrap();
        assert!(cleaned.is_empty());
    }
}
