//! Period report

use streamstats_common::{display_or, format_currency, format_date, PeriodSummary};
use streamstats_config::ReportConfig;

use crate::document::{Column, ReportDocument, Section, Table};

/// Structure of a period report.
///
/// `chart` is omitted from the document when `None`.
pub fn period_report_document(
    summary: &PeriodSummary,
    chart: Option<&[u8]>,
    config: &ReportConfig,
) -> ReportDocument {
    let mut doc = ReportDocument::new(format!(
        "{} Analytics Report (Starting {})",
        summary.period.capitalized(),
        format_date(summary.start_date)
    ));

    doc.push(Section::Heading("Aggregated Performance".to_string()))
        .push(Section::KeyValues(vec![
            ("Number of Streams".to_string(), summary.stream_count.to_string()),
            (
                "Overall Average Viewers (per stream)".to_string(),
                format!("{:.2}", summary.overall_average_viewers),
            ),
            (
                "Highest Peak Viewers".to_string(),
                summary.overall_peak_viewers.to_string(),
            ),
            (
                "Total Subscriptions in Period".to_string(),
                summary.totals.subscriptions.to_string(),
            ),
            (
                "Total Donation Amount in Period".to_string(),
                format_currency(&config.currency_symbol, summary.totals.donation_amount),
            ),
            (
                "Total Bits Amount in Period".to_string(),
                summary.totals.bits_amount.to_string(),
            ),
        ]));

    if let Some(chart) = chart {
        doc.push(Section::Heading("Viewership Trends (Aggregated)".to_string()))
            .push(Section::Chart {
                image: chart.to_vec(),
                description: "aggregated chart".to_string(),
            });
    }

    let unavailable = config.unavailable_placeholder.as_str();
    let mut table = Table::new(vec![
        Column::new("Date", 0.17),
        Column::new("Title", 0.38),
        Column::new("Avg. Viewers", 0.17),
        Column::new("Peak Viewers", 0.17),
        Column::new("Subs", 0.11),
    ]);
    for row in &summary.streams {
        table.push_row(vec![
            format_date(row.stream.date),
            display_or(row.stream.title.as_deref(), &config.untitled_row_placeholder).to_string(),
            row.average_viewers
                .map_or_else(|| unavailable.to_string(), |avg| format!("{avg:.1}")),
            row.peak_viewers
                .map_or_else(|| unavailable.to_string(), |peak| peak.to_string()),
            row.subscriptions.to_string(),
        ]);
    }

    doc.push(Section::Heading("Stream Details".to_string()))
        .push_table_or_notice(table, "No streams found for this period.");
    doc
}
