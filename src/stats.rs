use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Visit count for a single domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCount {
    pub domain: String,
    pub count: u64,
}

/// Heuristic sleep window derived from the longest idle run in the hourly
/// activity vector. This is an estimate of inactivity, not a measured sleep
/// period; with little data it can be wildly off (a history with a single
/// busy hour yields a 23-hour "sleep" window).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SleepEstimate {
    /// Longest idle run found; `sleep_start` and `wake_time` are hours of
    /// day, `duration_hours` the run length.
    Estimated {
        sleep_start: u32,
        wake_time: u32,
        duration_hours: f64,
    },
    /// No visits, or no idle hour at all; no window is fabricated.
    InsufficientData,
}

/// Aggregate result of one analysis run. Produced once, immutable, consumed
/// by every output path without mutation.
///
/// Invariant: `hourly` and `weekday` each sum to `total_visits`, which
/// equals the length of the input visit sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Visits per hour of day (index 0..24)
    pub hourly: [u64; 24],
    /// Visits per weekday, Monday = 0
    pub weekday: [u64; 7],
    /// Descending by count; equal counts keep first-seen order
    pub top_domains: Vec<DomainCount>,
    pub sleep: SleepEstimate,
    pub total_visits: u64,
    /// History rows dropped for a bad timestamp; surfaced as a data-quality
    /// note, never silently discarded
    pub skipped_rows: u64,
    /// Mean first browsing hour across calendar days, `None` when empty
    pub avg_first_hour: Option<f64>,
    /// Mean last browsing hour across calendar days, `None` when empty
    pub avg_last_hour: Option<f64>,
    /// Values of custom metrics registered on the analyzer
    pub extra_metrics: BTreeMap<String, f64>,
}
