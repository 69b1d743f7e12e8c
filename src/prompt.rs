use std::fmt::Write;

use crate::stats::{SleepEstimate, Statistics};

/// Render the statistics into the fixed natural-language document handed to
/// an external summarizer. Pure templating: every number comes straight from
/// the `Statistics`, and a run with no visits degrades to explicit
/// "no data available" sections instead of failing.
pub fn build_prompt(stats: &Statistics) -> String {
    let mut out = String::new();

    out.push_str("Analyze this browsing history data:\n\n");

    out.push_str("1. Hourly activity pattern:\n");
    if stats.total_visits == 0 {
        out.push_str("no data available\n");
    } else {
        for (hour, count) in stats.hourly.iter().enumerate() {
            let _ = writeln!(out, "{hour:>2}:00  {count} visits");
        }
    }

    out.push_str("\n2. Top domains visited:\n");
    if stats.top_domains.is_empty() {
        out.push_str("no data available\n");
    } else {
        for entry in stats.top_domains.iter().take(20) {
            let _ = writeln!(out, "{}  {} visits", entry.domain, entry.count);
        }
    }

    out.push_str("\n3. Average first and last browsing hours per day:\n");
    match (stats.avg_first_hour, stats.avg_last_hour) {
        (Some(first), Some(last)) => {
            let _ = writeln!(out, "first: {first:.2}, last: {last:.2}");
        }
        _ => out.push_str("no data available\n"),
    }

    out.push_str("\n4. Estimated sleep window (heuristic from idle hours, not a measurement):\n");
    match &stats.sleep {
        SleepEstimate::Estimated {
            sleep_start,
            wake_time,
            duration_hours,
        } => {
            let _ = writeln!(
                out,
                "around {sleep_start}:00 to {wake_time}:00 ({duration_hours:.1} hours)"
            );
        }
        SleepEstimate::InsufficientData => out.push_str("insufficient data\n"),
    }

    if stats.skipped_rows > 0 {
        let _ = writeln!(
            out,
            "\nNote: {} history rows were skipped as malformed.",
            stats.skipped_rows
        );
    }

    out.push_str(
        "\nBased on this data, please provide insights about:\n\
         1. Sleep patterns (when the person likely wakes up and goes to sleep)\n\
         2. Work focus and productivity patterns\n\
         3. Main interests based on content\n\
         4. Recommendations for better time management\n",
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::Analyzer;
    use crate::visit::Visit;
    use chrono::{Local, TimeZone};

    fn sample_stats() -> Statistics {
        let visits = vec![
            Visit::new(
                "https://a.com/x",
                None,
                Local.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap(),
            ),
            Visit::new(
                "https://b.com/y",
                None,
                Local.with_ymd_and_hms(2024, 3, 4, 14, 0, 0).unwrap(),
            ),
        ];
        Analyzer::new().analyze(&visits, 0)
    }

    #[test]
    fn prompt_embeds_findings() {
        let prompt = build_prompt(&sample_stats());
        assert!(prompt.contains("a.com  1 visits"));
        assert!(prompt.contains("Estimated sleep window"));
        assert!(prompt.contains("Recommendations for better time management"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let stats = sample_stats();
        assert_eq!(build_prompt(&stats), build_prompt(&stats));
    }

    #[test]
    fn empty_stats_degrade_to_no_data_sections() {
        let stats = Analyzer::new().analyze(&[], 0);
        let prompt = build_prompt(&stats);
        assert!(prompt.contains("no data available"));
        assert!(prompt.contains("insufficient data"));
        assert!(!prompt.contains("0:00  "));
    }

    #[test]
    fn skipped_rows_are_noted() {
        let stats = Analyzer::new().analyze(&[], 3);
        assert!(build_prompt(&stats).contains("3 history rows were skipped"));
    }
}
