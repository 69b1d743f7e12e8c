use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::prompt::build_prompt;
use crate::stats::{DomainCount, SleepEstimate, Statistics};

/// Report formats the exporter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
    Markdown,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] =
        [OutputFormat::Csv, OutputFormat::Json, OutputFormat::Markdown];

    fn file_name(self) -> &'static str {
        match self {
            OutputFormat::Csv => "history_report.csv",
            OutputFormat::Json => "history_report.json",
            OutputFormat::Markdown => "history_report.md",
        }
    }
}

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// One row of the long-form CSV report. A single `section,key,value` file
/// covers every statistics field and re-parses losslessly.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    section: String,
    key: String,
    value: String,
}

impl CsvRow {
    fn new(section: &str, key: impl ToString, value: impl ToString) -> Self {
        Self {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// Render the statistics as long-form CSV. Total over `Statistics`: every
/// field appears, including zero hour buckets, so [`from_csv`] can rebuild
/// the full value.
pub fn to_csv(stats: &Statistics) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.serialize(CsvRow::new("total", "visits", stats.total_visits))?;
    writer.serialize(CsvRow::new("total", "skipped_rows", stats.skipped_rows))?;
    for (hour, count) in stats.hourly.iter().enumerate() {
        writer.serialize(CsvRow::new("hour", hour, count))?;
    }
    for (day, count) in stats.weekday.iter().enumerate() {
        writer.serialize(CsvRow::new("weekday", day, count))?;
    }
    for entry in &stats.top_domains {
        writer.serialize(CsvRow::new("domain", &entry.domain, entry.count))?;
    }
    if let SleepEstimate::Estimated {
        sleep_start,
        wake_time,
        duration_hours,
    } = &stats.sleep
    {
        writer.serialize(CsvRow::new("sleep", "start", sleep_start))?;
        writer.serialize(CsvRow::new("sleep", "wake", wake_time))?;
        writer.serialize(CsvRow::new("sleep", "duration_hours", duration_hours))?;
    }
    if let Some(first) = stats.avg_first_hour {
        writer.serialize(CsvRow::new("avg", "first_hour", first))?;
    }
    if let Some(last) = stats.avg_last_hour {
        writer.serialize(CsvRow::new("avg", "last_hour", last))?;
    }
    for (name, value) in &stats.extra_metrics {
        writer.serialize(CsvRow::new("metric", name, value))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::MalformedReport(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::MalformedReport(e.to_string()))
}

/// Re-parse a CSV report produced by [`to_csv`].
pub fn from_csv(text: &str) -> Result<Statistics> {
    let mut stats = Statistics {
        hourly: [0; 24],
        weekday: [0; 7],
        top_domains: Vec::new(),
        sleep: SleepEstimate::InsufficientData,
        total_visits: 0,
        skipped_rows: 0,
        avg_first_hour: None,
        avg_last_hour: None,
        extra_metrics: Default::default(),
    };
    let mut sleep_start = None;
    let mut wake_time = None;
    let mut duration_hours = None;

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    for row in reader.deserialize() {
        let row: CsvRow = row?;
        let bad = |what: &str| Error::MalformedReport(format!("{what}: {}/{}", row.section, row.key));
        match row.section.as_str() {
            "total" => {
                let value: u64 = row.value.parse().map_err(|_| bad("bad count"))?;
                match row.key.as_str() {
                    "visits" => stats.total_visits = value,
                    "skipped_rows" => stats.skipped_rows = value,
                    _ => return Err(bad("unknown total row")),
                }
            }
            "hour" => {
                let hour: usize = row.key.parse().map_err(|_| bad("bad hour"))?;
                if hour >= 24 {
                    return Err(bad("hour out of range"));
                }
                stats.hourly[hour] = row.value.parse().map_err(|_| bad("bad count"))?;
            }
            "weekday" => {
                let day: usize = row.key.parse().map_err(|_| bad("bad weekday"))?;
                if day >= 7 {
                    return Err(bad("weekday out of range"));
                }
                stats.weekday[day] = row.value.parse().map_err(|_| bad("bad count"))?;
            }
            "domain" => stats.top_domains.push(DomainCount {
                domain: row.key.clone(),
                count: row.value.parse().map_err(|_| bad("bad count"))?,
            }),
            "sleep" => match row.key.as_str() {
                "start" => sleep_start = Some(row.value.parse().map_err(|_| bad("bad hour"))?),
                "wake" => wake_time = Some(row.value.parse().map_err(|_| bad("bad hour"))?),
                "duration_hours" => {
                    duration_hours = Some(row.value.parse().map_err(|_| bad("bad duration"))?)
                }
                _ => return Err(bad("unknown sleep row")),
            },
            "avg" => {
                let value: f64 = row.value.parse().map_err(|_| bad("bad average"))?;
                match row.key.as_str() {
                    "first_hour" => stats.avg_first_hour = Some(value),
                    "last_hour" => stats.avg_last_hour = Some(value),
                    _ => return Err(bad("unknown avg row")),
                }
            }
            "metric" => {
                let value: f64 = row.value.parse().map_err(|_| bad("bad metric"))?;
                stats.extra_metrics.insert(row.key.clone(), value);
            }
            _ => return Err(bad("unknown section")),
        }
    }

    if let (Some(sleep_start), Some(wake_time), Some(duration_hours)) =
        (sleep_start, wake_time, duration_hours)
    {
        stats.sleep = SleepEstimate::Estimated {
            sleep_start,
            wake_time,
            duration_hours,
        };
    }

    Ok(stats)
}

pub fn to_json(stats: &Statistics) -> Result<String> {
    Ok(serde_json::to_string_pretty(stats)?)
}

pub fn from_json(text: &str) -> Result<Statistics> {
    Ok(serde_json::from_str(text)?)
}

/// Render the statistics as a human-readable Markdown report.
pub fn to_markdown(stats: &Statistics) -> String {
    let mut out = String::new();
    out.push_str("# Browsing History Analysis\n\n");

    let _ = writeln!(
        out,
        "Total visits analyzed: {}",
        crate::utils::format_number(stats.total_visits)
    );
    if stats.skipped_rows > 0 {
        let _ = writeln!(
            out,
            "\nData quality: {} malformed rows were skipped during extraction.",
            crate::utils::format_number(stats.skipped_rows)
        );
    }

    out.push_str("\n## Activity by Hour\n\n");
    if stats.total_visits == 0 {
        out.push_str("No data available.\n");
    } else {
        for (hour, count) in stats.hourly.iter().enumerate() {
            if *count > 0 {
                let _ = writeln!(out, "- {hour}:00 - {count} visits");
            }
        }
    }

    out.push_str("\n## Activity by Weekday\n\n");
    if stats.total_visits == 0 {
        out.push_str("No data available.\n");
    } else {
        for (day, count) in stats.weekday.iter().enumerate() {
            if *count > 0 {
                let _ = writeln!(out, "- {} - {count} visits", WEEKDAY_NAMES[day]);
            }
        }
    }

    out.push_str("\n## Top Domains\n\n");
    if stats.top_domains.is_empty() {
        out.push_str("No data available.\n");
    } else {
        for entry in stats.top_domains.iter().take(10) {
            let _ = writeln!(
                out,
                "- {}: {} visits",
                entry.domain,
                crate::utils::format_number(entry.count)
            );
        }
    }

    out.push_str("\n## Estimated Sleep Window\n\n");
    match &stats.sleep {
        SleepEstimate::Estimated {
            sleep_start,
            wake_time,
            duration_hours,
        } => {
            let _ = writeln!(
                out,
                "Estimated sleep from {sleep_start}:00 to {wake_time}:00 ({duration_hours:.1} hours)."
            );
            out.push_str(
                "This is a heuristic based on idle hours in the history, not a measurement.\n",
            );
        }
        SleepEstimate::InsufficientData => {
            out.push_str("Insufficient data to estimate a sleep window.\n");
        }
    }

    out.push_str("\n## Daily Browsing Hours\n\n");
    match (stats.avg_first_hour, stats.avg_last_hour) {
        (Some(first), Some(last)) => {
            let _ = writeln!(out, "- Average first browsing hour: {first:.2}");
            let _ = writeln!(out, "- Average last browsing hour: {last:.2}");
        }
        _ => out.push_str("No data available.\n"),
    }

    if !stats.extra_metrics.is_empty() {
        out.push_str("\n## Custom Metrics\n\n");
        for (name, value) in &stats.extra_metrics {
            let _ = writeln!(out, "- {name}: {value}");
        }
    }

    out
}

fn render(stats: &Statistics, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Csv => to_csv(stats),
        OutputFormat::Json => to_json(stats),
        OutputFormat::Markdown => Ok(to_markdown(stats)),
    }
}

/// Write one report file per requested format under `output_dir`, plus the
/// summarizer prompt (`llm_prompt.txt`), which is always produced. Returns
/// the written paths.
pub fn write_reports(
    stats: &Statistics,
    output_dir: &Path,
    formats: &[OutputFormat],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let mut written = Vec::new();
    for format in formats {
        let path = output_dir.join(format.file_name());
        fs::write(&path, render(stats, *format)?)?;
        info!(action = "write", component = "report", format = ?format, path = ?path, "Report written");
        written.push(path);
    }

    let prompt_path = output_dir.join("llm_prompt.txt");
    fs::write(&prompt_path, build_prompt(stats))?;
    info!(action = "write", component = "report", path = ?prompt_path, "Prompt written");
    written.push(prompt_path);

    Ok(written)
}
