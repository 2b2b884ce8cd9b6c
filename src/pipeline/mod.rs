//! Roster transformation pipeline and read-only queries.
//!
//! Raw rows flow once through cleaning, grading and scholarship ranking; the
//! resulting table is kept by [`Pipeline`] and answers summary queries.

pub mod aggregate;
pub mod cleaner;
pub mod grade;
pub mod scholarship;
pub mod types;
pub mod utility;

use tracing::{info, warn};

use crate::config::RosterConfig;
use crate::error::{Result, RosterError};
use crate::pipeline::aggregate::summarize;
use crate::pipeline::cleaner::clean;
use crate::pipeline::grade::assign_grades;
use crate::pipeline::scholarship::determine_eligibility;
use crate::pipeline::types::{GroupStats, RawRecord, Record, SummaryStats};

/// Owns one run configuration and, once [`Pipeline::run`] has completed, the
/// finalized table.
#[derive(Debug)]
pub struct Pipeline {
    config: RosterConfig,
    table: Option<Vec<Record>>,
}

impl Pipeline {
    pub fn new(config: RosterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            table: None,
        })
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    pub fn is_processed(&self) -> bool {
        self.table.is_some()
    }

    /// Cleans, grades and ranks `raw`, in that order.
    ///
    /// Once the table is finalized, later calls ignore their input and return
    /// the existing table.
    #[tracing::instrument(skip_all, fields(rows = raw.len()))]
    pub fn run(&mut self, raw: Vec<RawRecord>) -> Result<&[Record]> {
        if self.table.is_some() {
            info!("Roster already processed, skipping reprocessing");
            return self.records();
        }

        info!("Starting roster processing");
        let cleaned = clean(raw, &self.config)?;
        let graded = assign_grades(cleaned, &self.config);
        let ranked = determine_eligibility(graded, &self.config);
        info!(rows = ranked.len(), "Roster processing completed");

        let table = self.table.insert(ranked);
        Ok(table.as_slice())
    }

    /// The finalized table.
    pub fn records(&self) -> Result<&[Record]> {
        self.table.as_deref().ok_or(RosterError::NotProcessed)
    }

    pub fn overall_stats(&self) -> Result<SummaryStats> {
        let records = self.records()?;
        let stats = summarize(records);
        if stats.valid_gpa_students == 0 {
            warn!("No students with a valid GPA to compute overall stats");
        }
        info!(?stats, "Calculated overall stats");
        Ok(stats)
    }

    /// Stats restricted to the records of `group_id`.
    pub fn group_stats(&self, group_id: &str) -> Result<GroupStats> {
        let members = self.group_records(group_id)?;
        if members.is_empty() {
            warn!(group = group_id, "Group not found in the roster");
            return Err(RosterError::group_not_found(group_id));
        }

        let stats = summarize(members);
        if stats.valid_gpa_students == 0 {
            warn!(group = group_id, "No students with a valid GPA in group");
        }
        info!(group = group_id, ?stats, "Calculated group stats");
        Ok(GroupStats {
            group_id: group_id.to_string(),
            stats,
        })
    }

    /// [`Pipeline::group_stats`] for the configured `target_group`.
    pub fn target_group_stats(&self) -> Result<GroupStats> {
        let group = self
            .config
            .target_group
            .as_deref()
            .ok_or_else(|| RosterError::config("no target_group configured"))?;
        self.group_stats(group)
    }

    /// Records belonging to `group_id`, in table order. Empty when none match.
    pub fn group_records(&self, group_id: &str) -> Result<Vec<&Record>> {
        Ok(self
            .records()?
            .iter()
            .filter(|r| r.group == group_id)
            .collect())
    }

    /// Case-insensitive substring search over student names.
    pub fn find_by_name_substring(&self, query: &str) -> Result<Vec<&Record>> {
        let needle = query.to_lowercase();
        Ok(self
            .records()?
            .iter()
            .filter(|r| r.name.to_lowercase().contains(&needle))
            .collect())
    }

    pub fn scholarship_recipients(&self) -> Result<Vec<&Record>> {
        Ok(self.records()?.iter().filter(|r| r.eligible).collect())
    }
}
