//! Report generation end to end

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, RgbImage};
use streamstats_common::test_utils::{date, fixtures, init_test_logging};
use streamstats_common::{PeriodKind, PeriodSummary, StreamSummary};
use streamstats_config::ReportConfig;
use streamstats_reports::{
    format_period_report, format_stream_report, stream_report_document, ReportFormatter,
};

fn small_png() -> Vec<u8> {
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 20, image::Rgb([10, 20, 30])))
        .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
        .unwrap();
    png
}

#[test]
fn test_stream_report_is_pdf() {
    init_test_logging();
    let stream = fixtures::stream(1, date(2024, 6, 1));
    let records = fixtures::hourly_records(1, &[(10, 1), (20, 2), (15, 3)]);
    let summary = StreamSummary::empty(stream);

    let bytes =
        format_stream_report(&summary, &records, Some(small_png().as_slice()), &ReportConfig::default())
            .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_period_report_without_streams_is_pdf() {
    let summary = PeriodSummary::empty(PeriodKind::Year, date(2024, 1, 1));
    let bytes = format_period_report(&summary, None, &ReportConfig::default()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_valid_chart_is_embedded() {
    let formatter = ReportFormatter::default();
    let summary = StreamSummary::empty(fixtures::stream(1, date(2024, 6, 1)));
    let doc = stream_report_document(&summary, &[], Some(small_png().as_slice()), formatter.config());

    let pages = formatter.paginate(&doc);
    assert_eq!(pages.iter().map(|p| p.image_count()).sum::<usize>(), 1);
}

#[test]
fn test_chart_report_serializes_to_pdf() {
    let summary = StreamSummary::empty(fixtures::stream(1, date(2024, 6, 1)));
    let records = fixtures::hourly_records(1, &[(10, 1), (20, 2)]);
    let pdf = format_stream_report(
        &summary,
        &records,
        Some(small_png().as_slice()),
        &ReportConfig::default(),
    )
    .unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[test]
fn test_broken_chart_degrades_to_notice() {
    let formatter = ReportFormatter::default();
    let summary = StreamSummary::empty(fixtures::stream(1, date(2024, 6, 1)));
    let doc = stream_report_document(&summary, &[], Some(&b"\x89PNG broken"[..]), formatter.config());

    let pages = formatter.paginate(&doc);
    let texts: Vec<&str> = pages.iter().flat_map(|p| p.texts()).collect();
    assert!(texts.iter().any(|t| t.starts_with("Error embedding chart:")));
    assert!(texts.contains(&"No hourly data available for this stream."));

    // The document is still produced
    assert!(formatter.render(&doc).unwrap().starts_with(b"%PDF"));
}

#[test]
fn test_many_hours_span_pages() {
    let stream = fixtures::stream(9, date(2024, 6, 1));
    let values: Vec<(u32, u32)> = (0..150).map(|i| (i, i * 2)).collect();
    let records = fixtures::hourly_records(9, &values);
    let formatter = ReportFormatter::default();

    let doc = stream_report_document(&StreamSummary::empty(stream), &records, None, formatter.config());
    let pages = formatter.paginate(&doc);
    assert!(pages.len() >= 2);
    assert_eq!(pages.last().unwrap().texts().last(), Some(&format!("Page {}", pages.len()).as_str()));
}
