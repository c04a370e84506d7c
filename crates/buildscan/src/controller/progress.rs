//! Progress and ETA derived from a job snapshot.

use serde::Serialize;

use crate::model::JobSnapshot;

/// Derived progress of a running job.
///
/// The time estimate is a heuristic: it multiplies the remaining item count
/// by a fixed per-item cost and does not measure actual throughput.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub processed: u32,
    pub total: u32,
    /// Whole percent, rounded half up. Always 0 when `total` is 0.
    pub percent: u32,
    pub remaining: u32,
    pub estimated_seconds_remaining: u64,
    pub estimated_minutes_remaining: u64,
    pub current_item: Option<String>,
}

impl Progress {
    pub fn from_snapshot(snapshot: &JobSnapshot, seconds_per_item: u64) -> Self {
        let total = snapshot.total_count;
        let processed = snapshot.processed_count;
        let remaining = snapshot.remaining();
        let estimated_seconds_remaining = u64::from(remaining) * seconds_per_item;

        Self {
            processed,
            total,
            percent: percent(processed, total),
            remaining,
            estimated_seconds_remaining,
            estimated_minutes_remaining: estimated_seconds_remaining.div_ceil(60),
            current_item: snapshot.current_item.clone(),
        }
    }
}

fn percent(processed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let processed = u64::from(processed.min(total));
    let total = u64::from(total);
    ((200 * processed + total) / (2 * total)) as u32
}
