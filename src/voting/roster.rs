use serde::Serialize;

use super::group_by;
use crate::models::VoteRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub option: String,
    pub count: usize,
    pub voters: Vec<String>,
}

/// Who voted for what. Entries follow first-occurrence order, not vote count.
/// `voters` keeps store order and repeats, so `count == voters.len()`.
pub fn voter_roster(records: &[VoteRecord]) -> Vec<RosterEntry> {
    group_by(
        records,
        |record| Some(record.option.as_str()),
        |voters: &mut Vec<String>, record| voters.push(record.username.clone()),
    )
    .into_iter()
    .map(|(option, voters)| RosterEntry {
        option: option.to_string(),
        count: voters.len(),
        voters,
    })
    .collect()
}
