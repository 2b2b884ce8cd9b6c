//! Data types flowing through the roster pipeline.

use serde::Serialize;

/// A single roster row as handed over by the loader.
///
/// `scores` is positional and must line up with the configured subjects.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub name: String,
    pub group: String,
    pub scores: Vec<Option<f64>>,
}

impl RawRecord {
    pub fn new(name: &str, group: &str, scores: Vec<Option<f64>>) -> Self {
        Self {
            name: name.to_string(),
            group: group.to_string(),
            scores,
        }
    }
}

/// One student row of the working table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub name: String,
    pub group: String,
    pub scores: Vec<Option<f64>>,
    pub grades: Vec<Option<String>>,
    pub composite_score: Option<f64>,
    pub eligible: bool,
}

impl Record {
    pub(crate) fn from_raw(raw: RawRecord) -> Self {
        let n = raw.scores.len();
        Self {
            name: raw.name,
            group: raw.group,
            scores: raw.scores,
            grades: vec![None; n],
            composite_score: None,
            eligible: false,
        }
    }

    /// Score for the subject at position `subject` of the configured list.
    pub fn score(&self, subject: usize) -> Option<f64> {
        self.scores.get(subject).copied().flatten()
    }

    pub fn grade(&self, subject: usize) -> Option<&str> {
        self.grades.get(subject).and_then(|g| g.as_deref())
    }

    pub fn valid_scores(&self) -> impl Iterator<Item = f64> + '_ {
        self.scores.iter().filter_map(|s| *s)
    }
}

/// Aggregates over a set of records.
///
/// Numeric fields and scorer names are `None` when no record in the set has a
/// composite score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_students: usize,
    pub valid_gpa_students: usize,
    pub min_gpa: Option<f64>,
    pub max_gpa: Option<f64>,
    pub mean_gpa: Option<f64>,
    pub top_student: Option<String>,
    pub bottom_student: Option<String>,
    pub scholarship_recipients: usize,
}

/// [`SummaryStats`] restricted to one cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub group_id: String,
    #[serde(flatten)]
    pub stats: SummaryStats,
}
