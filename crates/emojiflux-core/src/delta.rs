use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::model::{Snapshot, StoredSnapshot};

/// name -> (current score - previous score), for names present in both snapshots.
pub type DeltaSet = BTreeMap<String, f64>;

/// Age of the stored snapshot at `now`. Negative when the store clock runs ahead of ours.
pub fn snapshot_age(previous: &StoredSnapshot, now: DateTime<Utc>) -> Duration {
    now - previous.last_modified
}

/// Returns `None` when `previous` is older than `freshness_window`; a base that old would
/// fold several intervals into one delta. An age equal to the window is still fresh.
pub fn compute_deltas(
    current: &Snapshot,
    previous: &StoredSnapshot,
    now: DateTime<Utc>,
    freshness_window: Duration,
) -> Option<DeltaSet> {
    if snapshot_age(previous, now) > freshness_window {
        return None;
    }

    let current_scores = current.scores();
    let previous_scores = previous.snapshot.scores();

    let deltas = current_scores
        .iter()
        .filter_map(|(name, current_score)| {
            previous_scores
                .get(name)
                .map(|previous_score| (name.to_string(), current_score - previous_score))
        })
        .collect();

    Some(deltas)
}
