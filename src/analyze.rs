use chrono::{Datelike, NaiveDate, Timelike};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use tracing::info;

use crate::stats::{DomainCount, SleepEstimate, Statistics};
use crate::visit::Visit;

/// A custom metric: a pure function over the visit sequence, registered
/// under a name. The result lands in `Statistics::extra_metrics`.
pub type MetricFn = fn(&[Visit]) -> f64;

/// Computes aggregate statistics from an ordered visit sequence.
///
/// Pure and deterministic: no I/O, and the same input always yields the
/// same `Statistics`.
#[derive(Default)]
pub struct Analyzer {
    extra_metrics: Vec<(String, MetricFn)>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom metric to be evaluated alongside the built-ins.
    pub fn with_metric(mut self, name: &str, f: MetricFn) -> Self {
        self.extra_metrics.push((name.to_string(), f));
        self
    }

    /// Analyze the visit sequence. `skipped_rows` is the extractor's count
    /// of rows dropped for malformed data, carried through so the report
    /// can surface it.
    pub fn analyze(&self, visits: &[Visit], skipped_rows: u64) -> Statistics {
        let start_time = Instant::now();

        let mut hourly = [0u64; 24];
        let mut weekday = [0u64; 7];
        // Insertion order doubles as first-seen order for the tie-break.
        let mut domain_order: Vec<String> = Vec::new();
        let mut domain_counts: HashMap<String, u64> = HashMap::new();
        let mut day_bounds: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();

        for visit in visits {
            let hour = visit.visit_time.hour();
            hourly[hour as usize] += 1;
            weekday[visit.visit_time.weekday().num_days_from_monday() as usize] += 1;

            let count = domain_counts.entry(visit.domain.clone()).or_insert(0);
            if *count == 0 {
                domain_order.push(visit.domain.clone());
            }
            *count += 1;

            day_bounds
                .entry(visit.visit_time.date_naive())
                .and_modify(|(first, last)| {
                    *first = (*first).min(hour);
                    *last = (*last).max(hour);
                })
                .or_insert((hour, hour));
        }

        // Stable sort over first-seen order keeps ties in input order.
        let mut top_domains: Vec<DomainCount> = domain_order
            .into_iter()
            .map(|domain| {
                let count = domain_counts[&domain];
                DomainCount { domain, count }
            })
            .collect();
        top_domains.sort_by(|a, b| b.count.cmp(&a.count));

        let (avg_first_hour, avg_last_hour) = if day_bounds.is_empty() {
            (None, None)
        } else {
            let days = day_bounds.len() as f64;
            let (first_sum, last_sum) = day_bounds
                .values()
                .fold((0u64, 0u64), |(f, l), (first, last)| {
                    (f + u64::from(*first), l + u64::from(*last))
                });
            (
                Some(first_sum as f64 / days),
                Some(last_sum as f64 / days),
            )
        };

        let extra_metrics = self
            .extra_metrics
            .iter()
            .map(|(name, f)| (name.clone(), f(visits)))
            .collect();

        let stats = Statistics {
            sleep: estimate_sleep_window(&hourly),
            hourly,
            weekday,
            top_domains,
            total_visits: visits.len() as u64,
            skipped_rows,
            avg_first_hour,
            avg_last_hour,
            extra_metrics,
        };

        info!(
            action = "complete",
            component = "analyzer",
            total_visits = stats.total_visits,
            unique_domains = stats.top_domains.len(),
            skipped_rows,
            duration_ms = start_time.elapsed().as_millis(),
            "Pattern analysis completed"
        );

        stats
    }
}

/// Find the longest contiguous run of zero-activity hours, treating hour 23
/// and hour 0 as adjacent so a window that spans midnight is detected as
/// one run. Returns `InsufficientData` when there are no visits at all or
/// no idle hour exists.
fn estimate_sleep_window(hourly: &[u64; 24]) -> SleepEstimate {
    let total: u64 = hourly.iter().sum();
    if total == 0 {
        return SleepEstimate::InsufficientData;
    }

    let mut best_start = 0usize;
    let mut best_len = 0usize;
    // Scan the vector doubled so wrap-around runs appear contiguous; a run
    // is capped at 24 (all-idle is excluded above).
    let mut run_start = 0usize;
    let mut run_len = 0usize;
    for i in 0..48 {
        if hourly[i % 24] == 0 {
            if run_len == 0 {
                run_start = i;
            }
            run_len += 1;
            // Only record runs that start in the first cycle; the second
            // cycle exists purely to let first-cycle runs wrap.
            if run_len > best_len && run_start < 24 {
                best_start = run_start;
                best_len = run_len.min(24);
            }
        } else {
            run_len = 0;
        }
    }

    if best_len == 0 {
        return SleepEstimate::InsufficientData;
    }

    let sleep_start = (best_start % 24) as u32;
    let wake_time = ((best_start + best_len) % 24) as u32;
    SleepEstimate::Estimated {
        sleep_start,
        wake_time,
        duration_hours: best_len as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn visit_at(day: u32, hour: u32, domain: &str) -> Visit {
        let time = Local.with_ymd_and_hms(2024, 3, day, hour, 15, 0).unwrap();
        Visit::new(&format!("https://{domain}/page"), None, time)
    }

    #[test]
    fn histograms_sum_to_total() {
        let visits = vec![
            visit_at(4, 9, "a.com"),
            visit_at(4, 9, "a.com"),
            visit_at(5, 14, "b.com"),
            visit_at(6, 23, "c.com"),
        ];
        let stats = Analyzer::new().analyze(&visits, 0);
        assert_eq!(stats.total_visits, 4);
        assert_eq!(stats.hourly.iter().sum::<u64>(), 4);
        assert_eq!(stats.weekday.iter().sum::<u64>(), 4);
    }

    #[test]
    fn weekday_buckets_are_monday_based() {
        // 2024-03-04 is a Monday.
        let stats = Analyzer::new().analyze(&[visit_at(4, 10, "a.com")], 0);
        assert_eq!(stats.weekday[0], 1);
        assert_eq!(stats.weekday[1..].iter().sum::<u64>(), 0);
    }

    #[test]
    fn basic_scenario_hours_and_domains() {
        let visits = vec![
            visit_at(4, 9, "a.com"),
            visit_at(4, 9, "a.com"),
            visit_at(4, 14, "b.com"),
        ];
        let stats = Analyzer::new().analyze(&visits, 0);
        assert_eq!(stats.hourly[9], 2);
        assert_eq!(stats.hourly[14], 1);
        assert_eq!(stats.total_visits, 3);
        assert_eq!(stats.top_domains.len(), 2);
        assert_eq!(stats.top_domains[0].domain, "a.com");
        assert_eq!(stats.top_domains[0].count, 2);
        assert_eq!(stats.top_domains[1].domain, "b.com");
        assert_eq!(stats.top_domains[1].count, 1);
    }

    #[test]
    fn domain_ties_keep_first_seen_order() {
        let visits = vec![
            visit_at(4, 9, "z.com"),
            visit_at(4, 10, "a.com"),
            visit_at(4, 11, "m.com"),
            visit_at(4, 12, "m.com"),
        ];
        let stats = Analyzer::new().analyze(&visits, 0);
        let order: Vec<&str> = stats
            .top_domains
            .iter()
            .map(|d| d.domain.as_str())
            .collect();
        assert_eq!(order, vec!["m.com", "z.com", "a.com"]);
    }

    #[test]
    fn sleep_window_wraps_midnight() {
        // Activity only at 22, 23, 0, 1: the idle run 2..=21 (20 hours)
        // must win over any non-wrapping reading.
        let visits = vec![
            visit_at(4, 22, "a.com"),
            visit_at(4, 23, "a.com"),
            visit_at(5, 0, "a.com"),
            visit_at(5, 1, "a.com"),
        ];
        let stats = Analyzer::new().analyze(&visits, 0);
        assert_eq!(
            stats.sleep,
            SleepEstimate::Estimated {
                sleep_start: 2,
                wake_time: 22,
                duration_hours: 20.0,
            }
        );
    }

    #[test]
    fn sleep_window_simple_overnight() {
        // Activity 8..=22; idle run is 23..=7 wrapping midnight.
        let visits: Vec<Visit> = (8..=22).map(|h| visit_at(4, h, "a.com")).collect();
        let stats = Analyzer::new().analyze(&visits, 0);
        assert_eq!(
            stats.sleep,
            SleepEstimate::Estimated {
                sleep_start: 23,
                wake_time: 8,
                duration_hours: 9.0,
            }
        );
    }

    #[test]
    fn empty_input_yields_insufficient_data() {
        let stats = Analyzer::new().analyze(&[], 0);
        assert_eq!(stats.total_visits, 0);
        assert!(stats.top_domains.is_empty());
        assert_eq!(stats.sleep, SleepEstimate::InsufficientData);
        assert_eq!(stats.avg_first_hour, None);
        assert_eq!(stats.avg_last_hour, None);
    }

    #[test]
    fn fully_busy_day_yields_insufficient_data() {
        let visits: Vec<Visit> = (0..24).map(|h| visit_at(4, h, "a.com")).collect();
        let stats = Analyzer::new().analyze(&visits, 0);
        assert_eq!(stats.sleep, SleepEstimate::InsufficientData);
    }

    #[test]
    fn single_busy_hour_reports_23_hour_idle_run() {
        // Degenerate case: the heuristic reports the literal idle run; the
        // rendering layers label it an estimate.
        let stats = Analyzer::new().analyze(&[visit_at(4, 12, "a.com")], 0);
        assert_eq!(
            stats.sleep,
            SleepEstimate::Estimated {
                sleep_start: 13,
                wake_time: 12,
                duration_hours: 23.0,
            }
        );
    }

    #[test]
    fn analysis_is_deterministic() {
        let visits = vec![
            visit_at(4, 9, "a.com"),
            visit_at(5, 14, "b.com"),
            visit_at(6, 23, "a.com"),
        ];
        let analyzer = Analyzer::new();
        assert_eq!(analyzer.analyze(&visits, 1), analyzer.analyze(&visits, 1));
    }

    #[test]
    fn avg_first_and_last_hours_per_day() {
        let visits = vec![
            visit_at(4, 8, "a.com"),
            visit_at(4, 22, "a.com"),
            visit_at(5, 10, "b.com"),
            visit_at(5, 20, "b.com"),
        ];
        let stats = Analyzer::new().analyze(&visits, 0);
        assert_eq!(stats.avg_first_hour, Some(9.0));
        assert_eq!(stats.avg_last_hour, Some(21.0));
    }

    #[test]
    fn custom_metrics_land_in_output() {
        fn unknown_share(visits: &[Visit]) -> f64 {
            if visits.is_empty() {
                return 0.0;
            }
            let unknown = visits.iter().filter(|v| v.domain == "unknown").count();
            unknown as f64 / visits.len() as f64
        }

        let visits = vec![visit_at(4, 9, "a.com")];
        let stats = Analyzer::new()
            .with_metric("unknown_share", unknown_share)
            .analyze(&visits, 0);
        assert_eq!(stats.extra_metrics.get("unknown_share"), Some(&0.0));
    }

    #[test]
    fn skipped_rows_are_carried_through() {
        let stats = Analyzer::new().analyze(&[visit_at(4, 9, "a.com")], 7);
        assert_eq!(stats.skipped_rows, 7);
    }
}
