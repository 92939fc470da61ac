//! streamstats - stream analytics from the command line

use std::io;

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use streamstats_cli::{App, Args};
use streamstats_common::init_logging;
use streamstats_config::ConfigLoader;
use tracing::{debug, info};

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }

    // Keep the guard alive so file logging flushes on exit
    let _log_guard = init_logging(&config.logging.to_logging_config())?;
    debug!(?config, "Configuration loaded");

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let app = App::new(config, today);

    if let Some(path) = &args.data {
        let report = app.load_dataset(path)?;
        for rejection in &report.rejected {
            eprintln!("skipped {}: {}", rejection.location, rejection.reason);
        }
        info!(
            streams = report.streams,
            hourly_records = report.hourly_records,
            "Dataset loaded"
        );
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    app.run(&args.command, &mut out)
}
