//! Chart preparation over summarized data

use streamstats_common::test_utils::{assert_approx_eq, fixtures, init_test_logging};
use streamstats_common::StatsError;
use streamstats_config::ChartConfig;
use streamstats_graphs::{render_viewers_chart, viewer_points, ChartPoint, PreparedChart};

#[test]
fn test_all_zero_records_chart_nothing() {
    init_test_logging();
    let records = fixtures::hourly_records(1, &[(0, 10), (0, 12)]);
    let result = render_viewers_chart(&viewer_points(&records), "Viewers Over Time", &ChartConfig::default());
    assert_eq!(result.unwrap(), None);
}

#[test]
fn test_series_values_are_plotted_by_position() {
    let records = fixtures::hourly_records(7, &[(120, 0), (80, 0), (200, 0)]);
    let mut points = viewer_points(&records);
    // Labels out of chronological order do not move the points
    points[0].label = "23:00".to_string();

    let chart = PreparedChart::from_points(&points, "Viewers Over Time").unwrap();
    assert_eq!(chart.values, vec![120.0, 80.0, 200.0]);
    assert_eq!(chart.labels[0], "23:00");

    // Three points get an exact quadratic through them
    let trend = chart.trend.unwrap();
    assert_approx_eq(trend[0], 120.0, 1e-6);
    assert_approx_eq(trend[1], 80.0, 1e-6);
    assert_approx_eq(trend[2], 200.0, 1e-6);
}

#[test]
fn test_render_without_trend_or_grid() {
    init_test_logging();
    let config = ChartConfig {
        width: 200,
        height: 150,
        show_grid: false,
        show_trend: false,
        ..ChartConfig::default()
    };
    let points = vec![ChartPoint::new("a", Some(1)), ChartPoint::new("b", None)];

    match render_viewers_chart(&points, "Sparse", &config) {
        Ok(Some(png)) => assert!(png.starts_with(b"\x89PNG")),
        Ok(None) => panic!("one non-zero value is chartable"),
        Err(e) => assert!(matches!(e, StatsError::Graph { .. }), "{e}"),
    }
}
