use serde::Serialize;

use super::group_by;
use crate::models::VoteRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyEntry {
    pub option: String,
    pub count: usize,
}

/// Counts votes per option, most votes first. Options nobody voted for are
/// absent rather than reported with a zero.
pub fn tally(records: &[VoteRecord]) -> Vec<TallyEntry> {
    let mut entries: Vec<TallyEntry> = group_by(
        records,
        |record| Some(record.option.as_str()),
        |count: &mut usize, _| *count += 1,
    )
    .into_iter()
    .map(|(option, count)| TallyEntry {
        option: option.to_string(),
        count,
    })
    .collect();

    // Stable sort: equal counts stay in first-occurrence order
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}
