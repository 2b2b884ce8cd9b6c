use tracing::{debug, info, warn};

use crate::config::{RosterConfig, TiePolicy};
use crate::pipeline::types::Record;
use crate::pipeline::utility::mean;

/// Number of scholarships for `valid` ranked students: `ceil(valid * fraction)`.
pub fn eligible_count(valid: usize, fraction: f64) -> usize {
    if valid == 0 {
        return 0;
    }
    let k = (valid as f64 * fraction).ceil() as usize;
    k.min(valid)
}

/// Computes each record's composite score and marks the top performers.
///
/// Records without any valid score get no composite and are never eligible.
/// Ranking is by descending composite with input order breaking ties, so at
/// the cutoff the earlier of two equal composites is selected unless the
/// config asks for [`TiePolicy::IncludeTies`].
pub fn determine_eligibility(mut records: Vec<Record>, config: &RosterConfig) -> Vec<Record> {
    for record in &mut records {
        record.composite_score = mean(record.valid_scores());
        record.eligible = false;
    }

    let mut ranked: Vec<(usize, f64)> = records
        .iter()
        .enumerate()
        .filter_map(|(idx, r)| r.composite_score.map(|c| (idx, c)))
        .collect();

    if ranked.is_empty() {
        warn!("No students with a valid GPA, no scholarships assigned");
        return records;
    }

    // stable: equal composites stay in input order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let k = eligible_count(ranked.len(), config.eligibility_fraction);
    let tied_at_cutoff = k > 0 && k < ranked.len() && ranked[k].1 == ranked[k - 1].1;
    if tied_at_cutoff {
        debug!(
            cutoff = ranked[k - 1].1,
            policy = ?config.tie_policy,
            "Tie at the scholarship cutoff"
        );
    }

    let selected = match config.tie_policy {
        TiePolicy::KeepFirst => k,
        TiePolicy::IncludeTies if tied_at_cutoff => {
            let cutoff = ranked[k - 1].1;
            k + ranked[k..].iter().take_while(|(_, c)| *c == cutoff).count()
        }
        TiePolicy::IncludeTies => k,
    };

    for &(idx, _) in ranked.iter().take(selected) {
        records[idx].eligible = true;
    }

    info!(
        valid_gpa = ranked.len(),
        fraction = config.eligibility_fraction,
        quota = k,
        awarded = selected,
        "Scholarship determination completed"
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::RawRecord;

    fn config() -> RosterConfig {
        RosterConfig {
            subjects: vec!["Math".into(), "Physics".into()],
            ..Default::default()
        }
    }

    fn record(name: &str, scores: [Option<f64>; 2]) -> Record {
        Record::from_raw(RawRecord::new(name, "A", scores.to_vec()))
    }

    fn uniform(name: &str, score: f64) -> Record {
        record(name, [Some(score), Some(score)])
    }

    fn eligible_names(records: &[Record]) -> Vec<&str> {
        records
            .iter()
            .filter(|r| r.eligible)
            .map(|r| r.name.as_str())
            .collect()
    }

    #[test]
    fn test_eligible_count() {
        assert_eq!(eligible_count(0, 0.6), 0);
        assert_eq!(eligible_count(4, 0.6), 3);
        assert_eq!(eligible_count(5, 0.6), 3);
        assert_eq!(eligible_count(6, 0.6), 4);
        assert_eq!(eligible_count(3, 1.0), 3);
        assert_eq!(eligible_count(1, 0.01), 1);
    }

    #[test]
    fn test_composite_ignores_missing_scores() {
        let out = determine_eligibility(vec![record("Charlie", [None, Some(70.0)])], &config());
        assert_eq!(out[0].composite_score, Some(70.0));
    }

    #[test]
    fn test_composite_is_mean() {
        let out = determine_eligibility(vec![record("Alice", [Some(100.0), Some(90.0)])], &config());
        assert_eq!(out[0].composite_score, Some(95.0));
    }

    #[test]
    fn test_no_scores_no_composite_never_eligible() {
        let out = determine_eligibility(
            vec![record("Ghost", [None, None]), uniform("Alice", 80.0)],
            &config(),
        );
        assert_eq!(out[0].composite_score, None);
        assert!(!out[0].eligible);
        assert!(out[1].eligible);
    }

    #[test]
    fn test_tie_at_cutoff_keeps_first() {
        let records = vec![
            uniform("A", 100.0),
            uniform("B", 95.0),
            uniform("C", 90.0),
            uniform("D", 85.0),
            uniform("E", 85.0),
            uniform("F", 80.0),
        ];
        let out = determine_eligibility(records, &config());
        assert_eq!(eligible_names(&out), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_tie_at_cutoff_include_ties() {
        let records = vec![
            uniform("A", 100.0),
            uniform("B", 95.0),
            uniform("C", 90.0),
            uniform("D", 85.0),
            uniform("E", 85.0),
            uniform("F", 80.0),
        ];
        let config = RosterConfig {
            tie_policy: TiePolicy::IncludeTies,
            ..config()
        };
        let out = determine_eligibility(records, &config);
        assert_eq!(eligible_names(&out), vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_ranking_independent_of_position() {
        let records = vec![
            uniform("Low", 65.0),
            uniform("High", 99.0),
            uniform("Mid", 80.0),
        ];
        let config = RosterConfig {
            eligibility_fraction: 0.34,
            ..config()
        };
        let out = determine_eligibility(records, &config);
        assert_eq!(eligible_names(&out), vec!["High", "Mid"]);
    }

    #[test]
    fn test_all_null_roster_has_no_recipients() {
        let out = determine_eligibility(
            vec![record("X", [None, None]), record("Y", [None, None])],
            &config(),
        );
        assert!(out.iter().all(|r| !r.eligible && r.composite_score.is_none()));
    }
}
