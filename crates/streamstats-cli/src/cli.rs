//! Command line arguments

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use streamstats_common::StreamId;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Dataset file (YAML or JSON) of streams and their hourly records
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Log level, overrides the configuration
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Date used as "today" when selecting a period (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// What to produce
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List streams, newest first
    Streams,

    /// Print one stream's summary as JSON
    Summary {
        /// Stream id
        #[arg(long)]
        stream: StreamId,
    },

    /// Print a period summary as JSON
    Period {
        /// day, week, month or year; anything else means day
        #[arg(long, default_value = "day")]
        kind: String,
    },

    /// Write a viewer chart as PNG
    #[command(group(ArgGroup::new("source").required(true).args(["stream", "kind"])))]
    Chart {
        /// Chart one stream
        #[arg(long)]
        stream: Option<StreamId>,

        /// Chart every stream of a period
        #[arg(long)]
        kind: Option<String>,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Write a single-stream PDF report
    StreamReport {
        /// Stream id
        #[arg(long)]
        stream: StreamId,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,

        /// Leave the chart out
        #[arg(long)]
        no_chart: bool,
    },

    /// Write a period PDF report
    PeriodReport {
        /// day, week, month or year; anything else means day
        #[arg(long, default_value = "day")]
        kind: String,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,

        /// Leave the chart out
        #[arg(long)]
        no_chart: bool,
    },
}
