//! Run configuration for the roster pipeline.
//!
//! Stored as a JSON object on disk; every field is optional and falls back to
//! the built-in curriculum:
//! ```json
//! {
//!   "subjects": ["Math", "Physics"],
//!   "min_score": 60,
//!   "max_score": 100,
//!   "grade_bins": [
//!     { "lower": 59, "upper": 74, "label": "Satisfactory" },
//!     { "lower": 74, "upper": 89, "label": "Good" },
//!     { "lower": 89, "upper": 100, "label": "Excellent" }
//!   ],
//!   "eligibility_fraction": 0.6
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, RosterError};

/// One grading range: scores in `(lower, upper]` receive `label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBin {
    pub lower: f64,
    pub upper: f64,
    pub label: String,
}

impl GradeBin {
    pub fn new(lower: f64, upper: f64, label: &str) -> Self {
        Self {
            lower,
            upper,
            label: label.to_string(),
        }
    }

    pub fn contains(&self, score: f64) -> bool {
        self.lower < score && score <= self.upper
    }
}

/// How the scholarship cutoff treats records tied with the last selected one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// Exactly `k` records; among ties the earlier input row wins.
    #[default]
    KeepFirst,
    /// Every record tied with the k-th composite is selected as well.
    IncludeTies,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub name_column: String,
    pub group_column: String,
    pub subjects: Vec<String>,
    pub min_score: f64,
    pub max_score: f64,
    pub grade_bins: Vec<GradeBin>,
    pub eligibility_fraction: f64,
    pub tie_policy: TiePolicy,
    pub target_group: Option<String>,

    // output column naming
    pub gpa_column: String,
    pub scholarship_column: String,
    pub scholarship_marker: String,
    pub grade_suffix: String,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            name_column: "Name".into(),
            group_column: "Group".into(),
            subjects: vec![
                "Discrete Math".into(),
                "Higher Math".into(),
                "English".into(),
                "Elective 1".into(),
                "Elective 2".into(),
            ],
            min_score: 60.0,
            max_score: 100.0,
            grade_bins: vec![
                GradeBin::new(89.0, 100.0, "Excellent"),
                GradeBin::new(74.0, 89.0, "Good"),
                GradeBin::new(59.0, 74.0, "Satisfactory"),
            ],
            eligibility_fraction: 0.6,
            tie_policy: TiePolicy::KeepFirst,
            target_group: None,
            gpa_column: "GPA".into(),
            scholarship_column: "Scholarship".into(),
            scholarship_marker: "*".into(),
            grade_suffix: " (grade)".into(),
        }
    }
}

impl RosterConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RosterError::io(path, e))?;
        let config: RosterConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants every pipeline stage relies on.
    pub fn validate(&self) -> Result<()> {
        if self.subjects.is_empty() {
            return Err(RosterError::config("at least one subject is required"));
        }
        let mut seen = HashSet::new();
        for subject in &self.subjects {
            if !seen.insert(subject.as_str()) {
                return Err(RosterError::config(format!(
                    "subject '{subject}' is listed more than once"
                )));
            }
        }
        if self.min_score.is_nan() || self.max_score.is_nan() || self.min_score > self.max_score {
            return Err(RosterError::config(format!(
                "min_score {} exceeds max_score {}",
                self.min_score, self.max_score
            )));
        }
        if !(0.0 < self.eligibility_fraction && self.eligibility_fraction <= 1.0) {
            return Err(RosterError::config(format!(
                "eligibility_fraction {} is outside (0, 1]",
                self.eligibility_fraction
            )));
        }
        for bin in &self.grade_bins {
            if bin.lower.is_nan() || bin.upper.is_nan() || bin.lower >= bin.upper {
                return Err(RosterError::config(format!(
                    "grade bin '{}' has lower {} >= upper {}",
                    bin.label, bin.lower, bin.upper
                )));
            }
        }
        let sorted = self.sorted_bins();
        for pair in sorted.windows(2) {
            if pair[1].lower < pair[0].upper {
                return Err(RosterError::config(format!(
                    "grade bins '{}' and '{}' overlap",
                    pair[0].label, pair[1].label
                )));
            }
        }
        Ok(())
    }

    /// Bin table ordered ascending by lower bound.
    pub fn sorted_bins(&self) -> Vec<GradeBin> {
        let mut bins = self.grade_bins.clone();
        bins.sort_by(|a, b| a.lower.total_cmp(&b.lower));
        bins
    }

    pub fn in_range(&self, score: f64) -> bool {
        score >= self.min_score && score <= self.max_score
    }

    /// Output column name for the grade derived from `subject`.
    pub fn grade_column(&self, subject: &str) -> String {
        format!("{}{}", subject, self.grade_suffix)
    }
}
