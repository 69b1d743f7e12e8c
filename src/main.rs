use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::error;

use circada::{pipeline, utils, Args, Config};

fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);

    if let Err(e) = args.validate() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let config = Config {
        now: Utc::now(),
        days: args.days,
        history_path: args.history_path.clone(),
        temp_path: args.temp_path.clone(),
        output_dir: args.output_dir.clone(),
        formats: args.formats(),
    };

    match pipeline::run(&config) {
        Ok(stats) => {
            println!(
                "Analyzed {} visits over the past {} days.",
                utils::format_number(stats.total_visits),
                args.days
            );
            if stats.skipped_rows > 0 {
                println!(
                    "Skipped {} malformed rows.",
                    utils::format_number(stats.skipped_rows)
                );
            }
            println!("Reports written to {:?}.", config.output_dir);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Analysis failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
