use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::analyze::Analyzer;
use crate::error::Result;
use crate::report::{write_reports, OutputFormat};
use crate::stats::Statistics;
use crate::store;
use crate::timestamp::TimeWindow;

/// Everything one run needs, passed in explicitly. "Now" lives here rather
/// than being captured inside the pipeline so the window is reproducible
/// and the analyzer stays pure.
#[derive(Debug, Clone)]
pub struct Config {
    pub now: DateTime<Utc>,
    pub days: u32,
    /// Override for the history store location; defaults to the
    /// OS-conventional Chrome path
    pub history_path: Option<PathBuf>,
    /// Override for the scratch copy location
    pub temp_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub formats: Vec<OutputFormat>,
}

/// Run the whole pipeline: copy the store, extract visits in the window,
/// analyze, and write the requested reports plus the summarizer prompt.
pub fn run(config: &Config) -> Result<Statistics> {
    run_with(config, &Analyzer::new())
}

/// [`run`] with a caller-supplied analyzer, e.g. one carrying custom
/// metrics.
pub fn run_with(config: &Config, analyzer: &Analyzer) -> Result<Statistics> {
    let total_start = Instant::now();
    info!(
        action = "start",
        component = "pipeline",
        days = config.days,
        "Starting history analysis"
    );

    let history_path = match &config.history_path {
        Some(path) => path.clone(),
        None => store::default_history_path()?,
    };

    let window = TimeWindow::last_days(config.now, config.days);
    let (visits, skipped) = {
        // Copy scope: the scratch file is removed when `copy` drops, on
        // success and on error alike.
        let copy = store::ScopedCopy::create(&history_path, config.temp_path.as_deref())?;
        let conn = copy.open()?;
        store::extract_visits(&conn, &window)?
    };

    let stats = analyzer.analyze(&visits, skipped);
    write_reports(&stats, &config.output_dir, &config.formats)?;

    info!(
        action = "complete",
        component = "pipeline",
        total_visits = stats.total_visits,
        duration_ms = total_start.elapsed().as_millis(),
        "Analysis completed"
    );
    Ok(stats)
}
