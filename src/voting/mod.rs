//! Read-side views over the raw vote records.
//!
//! Every view is rebuilt from scratch on each call: the functions here borrow
//! a snapshot of records, hold no state between calls and never fail. Values
//! outside the allow-list are grouped like any other option.

pub mod geo;
pub mod roster;
pub mod tally;
pub mod timeline;

use std::collections::HashMap;
use std::hash::Hash;

pub use geo::{GeoCluster, geo_clusters};
pub use roster::{RosterEntry, voter_roster};
pub use tally::{TallyEntry, tally};
pub use timeline::{TimelineBucket, timeline};

/// Groups `items` by the key `key` extracts, folding each item into its
/// group's accumulator. Items for which `key` returns `None` are dropped.
/// Groups come back in order of first occurrence.
pub(crate) fn group_by<T, K, V>(
    items: impl IntoIterator<Item = T>,
    mut key: impl FnMut(T) -> Option<K>,
    mut fold: impl FnMut(&mut V, T),
) -> Vec<(K, V)>
where
    T: Copy,
    K: Eq + Hash + Clone,
    V: Default,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, V)> = Vec::new();

    for item in items {
        let Some(k) = key(item) else { continue };
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, V::default()));
            groups.len() - 1
        });
        fold(&mut groups[slot].1, item);
    }

    groups
}
