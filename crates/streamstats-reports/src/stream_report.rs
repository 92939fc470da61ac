//! Single-stream report

use streamstats_common::{display_or, format_currency, format_date, HourlyRecord, StreamSummary};
use streamstats_config::ReportConfig;

use crate::document::{Column, ReportDocument, Section, Table};

/// Structure of a single-stream report.
///
/// `chart` is omitted from the document when `None`.
pub fn stream_report_document(
    summary: &StreamSummary,
    records: &[HourlyRecord],
    chart: Option<&[u8]>,
    config: &ReportConfig,
) -> ReportDocument {
    let stream = &summary.stream;
    let title = display_or(stream.title.as_deref(), &config.untitled_placeholder);
    let mut doc = ReportDocument::new(format!("Stream Report: {title}"));

    doc.push(Section::KeyValues(vec![
        ("Stream Date".to_string(), format_date(stream.date)),
        (
            "Streamer".to_string(),
            display_or(Some(stream.streamer.as_str()), &config.unavailable_placeholder).to_string(),
        ),
    ]))
    .push(Section::Heading("Overall Performance".to_string()))
    .push(Section::KeyValues(vec![
        ("Average Viewers".to_string(), format!("{:.2}", summary.average_viewers)),
        ("Peak Viewers".to_string(), summary.peak_viewers.to_string()),
        ("Total Viewers".to_string(), summary.total_viewers.to_string()),
        ("Hourly Data Points".to_string(), summary.hourly_data_points.to_string()),
        ("Total Subscriptions".to_string(), summary.total_subscriptions.to_string()),
        (
            "Total Donation Amount".to_string(),
            format_currency(&config.currency_symbol, summary.total_donation_amount),
        ),
        ("Total Bits Amount".to_string(), summary.total_bits_amount.to_string()),
        (
            "Followers Gained (Approx.)".to_string(),
            summary.followers_gained_approx.to_string(),
        ),
    ]));

    if let Some(chart) = chart {
        doc.push(Section::Heading("Viewers Over Time".to_string()))
            .push(Section::Chart {
                image: chart.to_vec(),
                description: "chart".to_string(),
            });
    }

    let mut table = Table::new(vec![
        Column::new("Hour", 0.4),
        Column::new("Viewers", 0.3),
        Column::new("Followers", 0.3),
    ]);
    for record in records {
        table.push_row(vec![
            display_or(Some(record.hour.as_str()), &config.unavailable_placeholder).to_string(),
            record.viewers.to_string(),
            record.followers.to_string(),
        ]);
    }

    doc.push(Section::Heading("Hourly Breakdown".to_string()))
        .push_table_or_notice(table, "No hourly data available for this stream.");
    doc
}
