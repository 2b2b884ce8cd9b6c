use crate::pipeline::types::{Record, SummaryStats};
use crate::pipeline::utility::{first_max_index, first_min_index, mean};

/// Aggregates a set of finalized records into a [`SummaryStats`].
///
/// Only records with a composite score contribute to min/max/mean and to the
/// top/bottom scorer; ties go to the record that comes first.
pub fn summarize<'a, I>(records: I) -> SummaryStats
where
    I: IntoIterator<Item = &'a Record>,
{
    let records: Vec<&Record> = records.into_iter().collect();

    let gpas: Vec<(usize, f64)> = records
        .iter()
        .enumerate()
        .filter_map(|(idx, r)| r.composite_score.map(|c| (idx, c)))
        .collect();

    let name_at = |idx: Option<usize>| idx.map(|i| records[i].name.clone());

    SummaryStats {
        total_students: records.len(),
        valid_gpa_students: gpas.len(),
        min_gpa: gpas.iter().map(|(_, c)| *c).min_by(f64::total_cmp),
        max_gpa: gpas.iter().map(|(_, c)| *c).max_by(f64::total_cmp),
        mean_gpa: mean(gpas.iter().map(|(_, c)| *c)),
        top_student: name_at(first_max_index(&gpas)),
        bottom_student: name_at(first_min_index(&gpas)),
        scholarship_recipients: records.iter().filter(|r| r.eligible).count(),
    }
}
