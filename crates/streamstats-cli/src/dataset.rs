//! Dataset files fed through the ingestion path

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use streamstats_store::{submit_hourly, submit_stream, HourlySubmission, RecordIngest, StreamSubmission};
use tracing::{info, warn};

/// A stream submission with the hourly submissions recorded for it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEntry {
    /// The stream itself
    #[serde(flatten)]
    pub stream: StreamSubmission,
    /// Hourly records in chronological order
    #[serde(default)]
    pub hours: Vec<HourlySubmission>,
}

/// Top level of a dataset file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Streams in file order
    #[serde(default)]
    pub streams: Vec<StreamEntry>,
}

/// A submission that was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Where in the file, e.g. `streams[2].hours[0]`
    pub location: String,
    /// Why it was rejected
    pub reason: String,
}

/// Outcome of ingesting a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Streams stored
    pub streams: usize,
    /// Hourly records stored
    pub hourly_records: usize,
    /// Events stored with those records
    pub events: usize,
    /// Skipped submissions
    pub rejected: Vec<Rejection>,
}

impl Dataset {
    /// Parse dataset text; `.json` files are JSON, everything else YAML
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(content)
                .with_context(|| format!("Invalid JSON dataset {}", path.display()))
        } else if content.trim().is_empty() {
            Ok(Self::default())
        } else {
            serde_yaml::from_str(content)
                .with_context(|| format!("Invalid YAML dataset {}", path.display()))
        }
    }

    /// Read and parse a dataset file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        Self::parse(&content, path)
    }

    /// Store every valid submission.
    ///
    /// A rejected stream skips its hours too; a rejected hour skips only
    /// itself. Each hour is stored atomically with its events.
    pub fn ingest<S>(&self, store: &S, default_streamer: &str) -> IngestReport
    where
        S: RecordIngest + ?Sized,
    {
        let mut report = IngestReport::default();

        for (i, entry) in self.streams.iter().enumerate() {
            let stream = match submit_stream(store, &entry.stream, default_streamer) {
                Ok(stream) => stream,
                Err(e) => {
                    report.reject(format!("streams[{i}]"), &e);
                    continue;
                }
            };
            report.streams += 1;

            for (j, hour) in entry.hours.iter().enumerate() {
                match submit_hourly(store, stream.id, hour) {
                    Ok((_, events)) => {
                        report.hourly_records += 1;
                        report.events += events.len();
                    }
                    Err(e) => report.reject(format!("streams[{i}].hours[{j}]"), &e),
                }
            }
        }

        info!(
            streams = report.streams,
            hourly_records = report.hourly_records,
            events = report.events,
            rejected = report.rejected.len(),
            "Ingested dataset"
        );
        report
    }
}

impl IngestReport {
    fn reject(&mut self, location: String, error: &dyn std::fmt::Display) {
        warn!(location = %location, error = %error, "Skipped submission");
        self.rejected.push(Rejection {
            location,
            reason: error.to_string(),
        });
    }
}
