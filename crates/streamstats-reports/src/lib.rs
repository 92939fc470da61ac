//! # streamstats reports
//!
//! Paginated PDF reports for a single stream or a whole period. A report is
//! first built as a [`ReportDocument`], laid out into pages and then written
//! as PDF. A chart that cannot be embedded is replaced by a notice; the rest
//! of the document is still produced.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod document;
pub mod layout;
pub mod pdf;
pub mod period_report;
pub mod stream_report;

pub use document::{Column, ReportDocument, Section, Table};
pub use layout::{decode_chart, DrawOp, LayoutEngine, PageLayout, Tint};
pub use period_report::period_report_document;
pub use stream_report::stream_report_document;

use streamstats_common::{HourlyRecord, PeriodSummary, Result, StreamSummary};
use streamstats_config::ReportConfig;
use tracing::{info, instrument};

/// Formats summaries into PDF documents with one layout configuration
#[derive(Debug, Clone, Default)]
pub struct ReportFormatter {
    config: ReportConfig,
}

impl ReportFormatter {
    /// Formatter for the given layout
    pub const fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Layout in use
    pub const fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Lay out a document without serializing it
    pub fn paginate(&self, document: &ReportDocument) -> Vec<PageLayout> {
        LayoutEngine::new(&self.config).layout(document)
    }

    /// Lay out and serialize a document
    pub fn render(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        let pages = self.paginate(document);
        let bytes = pdf::write_pdf(&document.title, &pages, &self.config)?;
        info!(title = %document.title, pages = pages.len(), bytes = bytes.len(), "Formatted report");
        Ok(bytes)
    }

    /// PDF report for one stream and its hourly records
    #[instrument(skip_all, fields(stream_id = %summary.stream.id))]
    pub fn stream_report(
        &self,
        summary: &StreamSummary,
        records: &[HourlyRecord],
        chart: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        self.render(&stream_report_document(summary, records, chart, &self.config))
    }

    /// PDF report for a period summary
    #[instrument(skip_all, fields(period = %summary.period, start_date = %summary.start_date))]
    pub fn period_report(&self, summary: &PeriodSummary, chart: Option<&[u8]>) -> Result<Vec<u8>> {
        self.render(&period_report_document(summary, chart, &self.config))
    }
}

/// PDF report for one stream with `config`
pub fn format_stream_report(
    summary: &StreamSummary,
    records: &[HourlyRecord],
    chart: Option<&[u8]>,
    config: &ReportConfig,
) -> Result<Vec<u8>> {
    ReportFormatter::new(config.clone()).stream_report(summary, records, chart)
}

/// PDF report for a period with `config`
pub fn format_period_report(
    summary: &PeriodSummary,
    chart: Option<&[u8]>,
    config: &ReportConfig,
) -> Result<Vec<u8>> {
    ReportFormatter::new(config.clone()).period_report(summary, chart)
}
