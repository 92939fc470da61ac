//! Command execution against an in-memory store

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use streamstats_analytics::{PeriodAggregator, StreamSummarizer};
use streamstats_common::{PeriodSummary, StreamId};
use streamstats_config::Config;
use streamstats_graphs::{viewer_points, ViewerChartRenderer};
use streamstats_reports::ReportFormatter;
use streamstats_store::{MemoryStore, RecordStore};
use tracing::{info, warn};

use crate::cli::Command;
use crate::dataset::{Dataset, IngestReport};

const STREAM_CHART_TITLE: &str = "Viewers Over Time";
const PERIOD_CHART_TITLE: &str = "Viewers Per Hour";

/// Loaded configuration, the record store and the reference date
#[derive(Debug)]
pub struct App {
    config: Config,
    store: MemoryStore,
    today: NaiveDate,
}

impl App {
    /// Empty store; `today` anchors period selection
    pub fn new(config: Config, today: NaiveDate) -> Self {
        Self {
            config,
            store: MemoryStore::new(),
            today,
        }
    }

    /// The record store
    pub const fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Ingest a dataset file
    pub fn load_dataset(&self, path: &Path) -> Result<IngestReport> {
        let dataset = Dataset::load(path)?;
        Ok(dataset.ingest(&self.store, &self.config.ingest.default_streamer))
    }

    /// Run one command; JSON results go to `out`
    pub fn run(&self, command: &Command, out: &mut dyn Write) -> Result<()> {
        match command {
            Command::Streams => write_json(out, &self.store.list_streams()?),
            Command::Summary { stream } => {
                write_json(out, &StreamSummarizer::new(&self.store).summarize(*stream)?)
            }
            Command::Period { kind } => write_json(out, &self.period(kind)?),
            Command::Chart { stream, kind, out: path } => {
                let chart = match (stream, kind) {
                    (Some(id), _) => self.stream_chart(*id)?,
                    (None, Some(kind)) => self.period_chart(&self.period(kind)?)?,
                    (None, None) => anyhow::bail!("Either --stream or --kind is required"),
                };
                match chart {
                    Some(png) => write_file(path, &png),
                    None => {
                        warn!("No viewer data to chart, nothing written");
                        Ok(())
                    }
                }
            }
            Command::StreamReport {
                stream,
                out: path,
                no_chart,
            } => {
                let summary = StreamSummarizer::new(&self.store).summarize(*stream)?;
                let records = self.store.hourly_records(*stream)?;
                let chart = if *no_chart {
                    None
                } else {
                    self.stream_chart(*stream)?
                };

                let pdf = ReportFormatter::new(self.config.report.clone()).stream_report(
                    &summary,
                    &records,
                    chart.as_deref(),
                )?;
                write_file(path, &pdf)
            }
            Command::PeriodReport {
                kind,
                out: path,
                no_chart,
            } => {
                let summary = self.period(kind)?;
                let chart = if *no_chart {
                    None
                } else {
                    self.period_chart(&summary)?
                };

                let pdf = ReportFormatter::new(self.config.report.clone())
                    .period_report(&summary, chart.as_deref())?;
                write_file(path, &pdf)
            }
        }
    }

    fn period(&self, kind: &str) -> Result<PeriodSummary> {
        Ok(PeriodAggregator::new(&self.store).summarize_named_at(kind, self.today)?)
    }

    fn renderer(&self) -> ViewerChartRenderer {
        ViewerChartRenderer::new(self.config.chart.clone())
    }

    fn stream_chart(&self, id: StreamId) -> Result<Option<Vec<u8>>> {
        let records = self.store.hourly_records(id)?;
        Ok(degrade_chart(
            self.renderer().render(&viewer_points(&records), STREAM_CHART_TITLE),
        ))
    }

    fn period_chart(&self, summary: &PeriodSummary) -> Result<Option<Vec<u8>>> {
        let points = viewer_points(&summary.hourly_records);
        Ok(degrade_chart(self.renderer().render(&points, PERIOD_CHART_TITLE)))
    }
}

/// A chart that fails to render is left out instead of failing the command
fn degrade_chart(rendered: streamstats_common::Result<Option<Vec<u8>>>) -> Option<Vec<u8>> {
    rendered.unwrap_or_else(|e| {
        warn!(error = %e, "Chart rendering failed, continuing without chart");
        None
    })
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("Failed to serialize output")?;
    writeln!(out)?;
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "Wrote output");
    Ok(())
}
