use tracing::{debug, info};

use crate::config::{GradeBin, RosterConfig};
use crate::pipeline::types::Record;

/// Ordered lookup table from score to grade label.
///
/// Ranges are right-closed: with bins `(59,74]`, `(74,89]`, `(89,100]`
///
/// | Score | Grade        |
/// |-------|--------------|
/// | 100   | Excellent    |
/// | 90    | Excellent    |
/// | 89    | Good         |
/// | 75    | Good         |
/// | 74    | Satisfactory |
/// | 60    | Satisfactory |
/// | 59    | none         |
///
/// A score that falls between two configured bins has no grade.
#[derive(Debug, Clone)]
pub struct GradeScale {
    bins: Vec<GradeBin>,
}

impl GradeScale {
    pub fn new(bins: &[GradeBin]) -> Self {
        let mut bins = bins.to_vec();
        bins.sort_by(|a, b| a.lower.total_cmp(&b.lower));
        Self { bins }
    }

    pub fn from_config(config: &RosterConfig) -> Self {
        Self::new(&config.grade_bins)
    }

    pub fn grade(&self, score: f64) -> Option<&str> {
        self.bins
            .iter()
            .find(|bin| bin.contains(score))
            .map(|bin| bin.label.as_str())
    }
}

/// Fills `grades` for every subject from the corresponding score.
pub fn assign_grades(mut records: Vec<Record>, config: &RosterConfig) -> Vec<Record> {
    let scale = GradeScale::from_config(config);
    debug!(bins = ?scale.bins, "Using grade scale");

    for (idx, subject) in config.subjects.iter().enumerate() {
        let mut ungraded = 0usize;
        for record in &mut records {
            let grade = record.score(idx).and_then(|s| scale.grade(s));
            if record.score(idx).is_some() && grade.is_none() {
                ungraded += 1;
            }
            record.grades[idx] = grade.map(str::to_string);
        }
        if ungraded > 0 {
            debug!(subject = %subject, ungraded, "Scores outside every grade bin");
        }
    }

    info!(rows = records.len(), "Grade assignment completed");
    records
}
