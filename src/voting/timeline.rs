use chrono::Timelike;
use log::warn;
use serde::Serialize;

use super::group_by;
use crate::models::VoteRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineBucket {
    pub hour: u32,
    pub option: String,
    pub count: usize,
}

/// Votes per (UTC hour of day, option), ordered by hour.
///
/// Buckets sharing an hour come out in whatever order the grouping produced
/// them; callers must not rely on it. Records without a timestamp are skipped.
pub fn timeline(records: &[VoteRecord]) -> Vec<TimelineBucket> {
    let mut skipped = 0usize;

    let mut buckets: Vec<TimelineBucket> = group_by(
        records,
        |record| match record.timestamp {
            Some(ts) => Some((ts.hour(), record.option.as_str())),
            None => {
                skipped += 1;
                None
            }
        },
        |count: &mut usize, _| *count += 1,
    )
    .into_iter()
    .map(|((hour, option), count)| TimelineBucket {
        hour,
        option: option.to_string(),
        count,
    })
    .collect();

    if skipped > 0 {
        warn!("Timeline skipped {} vote record(s) without a timestamp", skipped);
    }

    buckets.sort_by_key(|bucket| bucket.hour);
    buckets
}
