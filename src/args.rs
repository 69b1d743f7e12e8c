use clap::Parser;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::report::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "circada",
    about = "Analyze browser history for daily rhythms: hourly activity, top domains, and an estimated sleep window",
    version,
    long_about = None
)]
pub struct Args {
    /// Number of days of history to analyze
    #[arg(short, long, default_value_t = 30)]
    pub days: u32,

    /// Report format to produce; omit to produce all of them
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Path to the history store, overriding the default Chrome location
    #[arg(long)]
    pub history_path: Option<PathBuf>,

    /// Directory for output artifacts
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Custom path for the temporary store copy
    #[arg(long)]
    pub temp_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Validate parameters before anything touches the store.
    pub fn validate(&self) -> Result<()> {
        if self.days == 0 {
            return Err(Error::InvalidParameter(
                "--days must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// The formats to produce: the selected one, or all of them.
    pub fn formats(&self) -> Vec<OutputFormat> {
        match self.format {
            Some(format) => vec![format],
            None => OutputFormat::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_days_is_rejected() {
        let args = Args::parse_from(["circada", "--days", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn default_is_thirty_days_all_formats() {
        let args = Args::parse_from(["circada"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.days, 30);
        assert_eq!(args.formats(), OutputFormat::ALL.to_vec());
    }

    #[test]
    fn format_selector_narrows_output() {
        let args = Args::parse_from(["circada", "--format", "json"]);
        assert_eq!(args.formats(), vec![OutputFormat::Json]);
    }
}
