//! Commands run against a dataset file

use std::fs;
use std::path::Path;

use streamstats_cli::{App, Command};
use streamstats_common::test_utils::{date, init_test_logging};
use streamstats_common::{PeriodSummary, StatsError, Stream, StreamId, StreamSummary};
use streamstats_config::Config;
use tempfile::TempDir;

const DATASET: &str = r#"
streams:
  - date: "2024-05-13"
    title: Monday stream
    streamer: alice
    hours:
      - hour: "20:00"
        viewers: 100
        followers: 500
        subscriptions: [bob, carol]
      - hour: "21:00"
        viewers: 200
        followers: 520
        donations:
          - username: dan
            amount: "4.50"
  - date: "2024-05-15"
    hours:
      - hour: "19:00"
        viewers: 50
        followers: 521
        bits:
          - username: erin
            amount: 300
  - date: "2024-05-06"
    title: Last week
    hours:
      - hour: "20:00"
        viewers: 999
        followers: 400
"#;

fn app_with_data(dir: &TempDir) -> App {
    init_test_logging();
    let path = dir.path().join("streams.yaml");
    fs::write(&path, DATASET).unwrap();

    let app = App::new(Config::default(), date(2024, 5, 15));
    let report = app.load_dataset(&path).unwrap();
    assert!(report.rejected.is_empty(), "{:?}", report.rejected);
    app
}

fn run_json(app: &App, command: &Command) -> serde_json::Value {
    let mut out = Vec::new();
    app.run(command, &mut out).unwrap();
    serde_json::from_slice(&out).unwrap()
}

fn stream_id_by_date(app: &App, day: u32) -> StreamId {
    let streams: Vec<Stream> = serde_json::from_value(run_json(app, &Command::Streams)).unwrap();
    streams
        .iter()
        .find(|s| s.date == date(2024, 5, day))
        .map(|s| s.id)
        .unwrap()
}

#[test]
fn test_streams_are_listed_newest_first() {
    let dir = TempDir::new().unwrap();
    let app = app_with_data(&dir);

    let streams: Vec<Stream> = serde_json::from_value(run_json(&app, &Command::Streams)).unwrap();
    let dates: Vec<_> = streams.iter().map(|s| s.date).collect();
    assert_eq!(dates, vec![date(2024, 5, 15), date(2024, 5, 13), date(2024, 5, 6)]);
    assert_eq!(streams[0].streamer, Config::default().ingest.default_streamer);
}

#[test]
fn test_summary_command() {
    let dir = TempDir::new().unwrap();
    let app = app_with_data(&dir);
    let id = stream_id_by_date(&app, 13);

    let summary: StreamSummary =
        serde_json::from_value(run_json(&app, &Command::Summary { stream: id })).unwrap();
    assert_eq!(summary.total_viewers, 300);
    assert_eq!(summary.average_viewers, 150.0);
    assert_eq!(summary.peak_viewers, 200);
    assert_eq!(summary.total_subscriptions, 2);
    assert_eq!(summary.total_donation_amount, 4.5);
    assert_eq!(summary.followers_gained_approx, 20);
}

#[test]
fn test_missing_stream_fails() {
    let dir = TempDir::new().unwrap();
    let app = app_with_data(&dir);

    let err = app
        .run(&Command::Summary { stream: StreamId(404) }, &mut Vec::new())
        .unwrap_err();
    let stats_error = err.downcast_ref::<StatsError>().unwrap();
    assert!(stats_error.is_not_found());
    assert_eq!(err.to_string(), "stream 404 not found");
}

#[test]
fn test_week_period_uses_today() {
    let dir = TempDir::new().unwrap();
    let app = app_with_data(&dir);

    let summary: PeriodSummary = serde_json::from_value(run_json(
        &app,
        &Command::Period {
            kind: "week".to_string(),
        },
    ))
    .unwrap();

    assert_eq!(summary.start_date, date(2024, 5, 13));
    assert_eq!(summary.stream_count, 2);
    // Mean of the two stream means: (150 + 50) / 2
    assert_eq!(summary.overall_average_viewers, 100.0);
    assert_eq!(summary.overall_peak_viewers, 200);
    assert_eq!(summary.totals.bits_amount, 300);
    assert_eq!(summary.hourly_records.len(), 3);
}

#[test]
fn test_reports_are_written() {
    let dir = TempDir::new().unwrap();
    let app = app_with_data(&dir);
    let stream_pdf = dir.path().join("stream.pdf");
    let period_pdf = dir.path().join("period.pdf");

    app.run(
        &Command::StreamReport {
            stream: stream_id_by_date(&app, 13),
            out: stream_pdf.clone(),
            no_chart: false,
        },
        &mut Vec::new(),
    )
    .unwrap();
    app.run(
        &Command::PeriodReport {
            kind: "month".to_string(),
            out: period_pdf.clone(),
            no_chart: true,
        },
        &mut Vec::new(),
    )
    .unwrap();

    for path in [&stream_pdf, &period_pdf] {
        assert!(fs::read(path).unwrap().starts_with(b"%PDF"), "{}", path.display());
    }
}

#[test]
fn test_chart_for_empty_period_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let app = App::new(Config::default(), date(2024, 5, 15));
    let out = dir.path().join("chart.png");

    app.run(
        &Command::Chart {
            stream: None,
            kind: Some("year".to_string()),
            out: out.clone(),
        },
        &mut Vec::new(),
    )
    .unwrap();
    assert!(!Path::new(&out).exists());
}
