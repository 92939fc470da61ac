//! Viewers-over-time line chart with a fitted trend line

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, RgbImage};
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use streamstats_common::{HourlyRecord, Result, StatsError};
use streamstats_config::ChartConfig;
use tracing::{debug, info, instrument};

use crate::color::parse_color;
use crate::trend::fit_trend;

/// Most x-axis tick labels drawn before labels are thinned out
const MAX_X_LABELS: usize = 24;

/// One labelled value of the viewer series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Tick text, never parsed
    pub label: String,
    /// Viewer count, `None` when unknown
    pub value: Option<u32>,
}

impl ChartPoint {
    /// Create a point
    pub fn new(label: impl Into<String>, value: Option<u32>) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Chart points for hourly records, labelled by hour
pub fn viewer_points(records: &[HourlyRecord]) -> Vec<ChartPoint> {
    records
        .iter()
        .map(|record| ChartPoint::new(record.hour.clone(), Some(record.viewers)))
        .collect()
}

/// Plot-ready series values. Position `i` of every vector is x = `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedChart {
    /// Chart title
    pub title: String,
    /// Tick labels
    pub labels: Vec<String>,
    /// Plotted values, unknown counts as zero
    pub values: Vec<f64>,
    /// Trend value at every position, when a fit was possible
    pub trend: Option<Vec<f64>>,
}

impl PreparedChart {
    /// Prepare `points` for plotting.
    ///
    /// Returns `None` when there is nothing to show: no points, or every
    /// value zero or unknown.
    pub fn from_points(points: &[ChartPoint], title: &str) -> Option<Self> {
        if !points.iter().any(|p| p.value.is_some_and(|v| v > 0)) {
            return None;
        }

        let values: Vec<f64> = points
            .iter()
            .map(|p| p.value.map_or(0.0, f64::from))
            .collect();
        let positions: Vec<f64> = (0..values.len()).map(position).collect();

        Some(Self {
            title: title.to_string(),
            labels: points.iter().map(|p| p.label.clone()).collect(),
            trend: fit_trend(&positions, &values, &positions),
            values,
        })
    }

    /// The series as `(x, y)` coordinates
    pub fn series(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (position(i), *v))
            .collect()
    }

    /// Vertical range covering the values and the trend, padded by 10%
    pub fn y_range(&self, include_trend: bool) -> (f64, f64) {
        let trend = self
            .trend
            .iter()
            .filter(|_| include_trend)
            .flatten()
            .copied();
        let (low, high) = self
            .values
            .iter()
            .copied()
            .chain(trend)
            .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));

        let high = if high > 0.0 { high * 1.1 } else { 1.0 };
        let low = if low < 0.0 { low * 1.1 } else { 0.0 };
        (low, high)
    }

    /// Tick text for an x coordinate, empty between positions
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn label_at(&self, x: f64) -> String {
        let nearest = x.round();
        if (x - nearest).abs() > 0.01 || nearest < 0.0 {
            return String::new();
        }
        self.labels
            .get(nearest as usize)
            .cloned()
            .unwrap_or_default()
    }
}

#[allow(clippy::cast_precision_loss)]
fn position(index: usize) -> f64 {
    index as f64
}

/// Draws viewer charts with an explicit style
#[derive(Debug, Clone)]
pub struct ViewerChartRenderer {
    config: ChartConfig,
}

impl ViewerChartRenderer {
    /// Renderer using `config` for size, colors and fonts
    pub const fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    /// Chart style in use
    pub const fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Render `points` to PNG bytes, `None` when there is no data to chart
    #[instrument(skip(self, points), fields(points = points.len()))]
    pub fn render(&self, points: &[ChartPoint], title: &str) -> Result<Option<Vec<u8>>> {
        let Some(chart) = PreparedChart::from_points(points, title) else {
            debug!("No chartable values");
            return Ok(None);
        };
        self.render_prepared(&chart).map(Some)
    }

    /// Rasterize a prepared chart to PNG bytes
    pub fn render_prepared(&self, chart: &PreparedChart) -> Result<Vec<u8>> {
        let (width, height) = (self.config.width, self.config.height);
        let mut buffer = vec![0_u8; width as usize * height as usize * 3];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            self.draw(&root, chart)?;
            root.present()?;
        }

        let png = encode_png(buffer, width, height)?;
        info!(
            title = %chart.title,
            bytes = png.len(),
            trend = chart.trend.is_some(),
            "Rendered viewer chart"
        );
        Ok(png)
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, plotters::coord::Shift>, chart: &PreparedChart) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: std::error::Error + Send + Sync + 'static,
    {
        let config = &self.config;
        let background = parse_color(&config.background_color);
        let series_color = parse_color(&config.series_color);
        let trend_color = parse_color(&config.trend_color);
        let text_color = parse_color(&config.text_color);
        let font = config.font_family.as_str();

        root.fill(&background)?;

        let show_trend = config.show_trend && chart.trend.is_some();
        let (y_min, y_max) = chart.y_range(show_trend);
        let x_max = position(chart.values.len()) - 0.5;

        let mut plot = ChartBuilder::on(root)
            .caption(
                &chart.title,
                (font, config.title_font_size).into_font().color(&text_color),
            )
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5_f64..x_max, y_min..y_max)?;

        let format_x = |x: &f64| chart.label_at(*x);
        let format_y = |y: &f64| format!("{y:.0}");
        let label_style = (font, config.label_font_size).into_font().color(&text_color);

        let mut mesh = plot.configure_mesh();
        mesh.x_desc(config.x_label.as_str())
            .y_desc(config.y_label.as_str())
            .x_labels(chart.labels.len().min(MAX_X_LABELS))
            .x_label_formatter(&format_x)
            .y_label_formatter(&format_y)
            .label_style(label_style.clone())
            .axis_desc_style(label_style);
        if !config.show_grid {
            mesh.disable_mesh();
        }
        mesh.draw()?;

        let series = chart.series();
        plot.draw_series(LineSeries::new(series.iter().copied(), series_color.stroke_width(2)))?;

        let markers = series
            .into_iter()
            .map(|point| Circle::new(point, 3, series_color.filled()));
        plot.draw_series(markers)?
            .label("Viewers")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], series_color));

        if let Some(trend) = chart.trend.as_ref().filter(|_| config.show_trend) {
            let line = trend.iter().enumerate().map(|(i, v)| (position(i), *v));
            plot.draw_series(LineSeries::new(line, trend_color.stroke_width(2)))?
                .label("Trend")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], trend_color));
        }

        plot.configure_series_labels()
            .background_style(background.mix(0.8))
            .border_style(text_color)
            .label_font((font, config.label_font_size).into_font().color(&text_color))
            .draw()?;

        Ok(())
    }
}

fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>> {
    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| StatsError::graph("Chart buffer does not match the chart size"))?;

    let mut png = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
        .map_err(|e| StatsError::graph_with_source("Failed to encode chart as PNG", e))?;
    Ok(png)
}

/// Render a viewer chart with `config`.
///
/// `Ok(None)` means there was nothing to chart; callers omit the chart.
pub fn render_viewers_chart(
    points: &[ChartPoint],
    title: &str,
    config: &ChartConfig,
) -> Result<Option<Vec<u8>>> {
    ViewerChartRenderer::new(config.clone()).render(points, title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamstats_common::test_utils::{assert_approx_eq, fixtures};

    fn points(values: &[Option<u32>]) -> Vec<ChartPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| ChartPoint::new(format!("{:02}:00", 10 + i), *v))
            .collect()
    }

    #[test]
    fn test_no_data_gives_no_chart() {
        assert_eq!(PreparedChart::from_points(&[], "x"), None);
        assert_eq!(PreparedChart::from_points(&points(&[Some(0), None]), "x"), None);

        let config = ChartConfig::default();
        assert_eq!(render_viewers_chart(&[], "x", &config).unwrap(), None);
        assert_eq!(
            render_viewers_chart(&points(&[Some(0), None]), "x", &config).unwrap(),
            None
        );
    }

    #[test]
    fn test_single_point_has_no_trend() {
        let chart = PreparedChart::from_points(&points(&[Some(50)]), "One").unwrap();
        assert_eq!(chart.values, vec![50.0]);
        assert_eq!(chart.trend, None);
        let (low, high) = chart.y_range(true);
        assert_eq!(low, 0.0);
        assert_approx_eq(high, 55.0, 1e-9);
    }

    #[test]
    fn test_trend_follows_quadratic_values() {
        let chart =
            PreparedChart::from_points(&points(&[Some(1), Some(4), Some(9), Some(16)]), "Q").unwrap();
        let trend = chart.trend.unwrap();
        for (fitted, expected) in trend.iter().zip([1.0, 4.0, 9.0, 16.0]) {
            assert_approx_eq(*fitted, expected, 1e-6);
        }
    }

    #[test]
    fn test_two_points_use_a_line() {
        let chart = PreparedChart::from_points(&points(&[Some(10), Some(20)]), "L").unwrap();
        let trend = chart.trend.unwrap();
        assert_approx_eq(trend[0], 10.0, 1e-9);
        assert_approx_eq(trend[1], 20.0, 1e-9);
    }

    #[test]
    fn test_unknown_values_plot_as_zero() {
        let chart = PreparedChart::from_points(&points(&[Some(10), None, Some(30)]), "Z").unwrap();
        assert_eq!(chart.values, vec![10.0, 0.0, 30.0]);
        assert_eq!(chart.series(), vec![(0.0, 10.0), (1.0, 0.0), (2.0, 30.0)]);

        // Quadratic through all three positions, the unknown one included
        let trend = chart.trend.unwrap();
        assert_eq!(trend.len(), 3);
        assert_approx_eq(trend[0], 10.0, 1e-6);
        assert_approx_eq(trend[1], 0.0, 1e-6);
        assert_approx_eq(trend[2], 30.0, 1e-6);
    }

    #[test]
    fn test_unknown_values_count_toward_trend_degree() {
        // One known value still gets a line through the zero-filled position
        let chart = PreparedChart::from_points(&points(&[None, Some(8)]), "D").unwrap();
        assert_eq!(chart.values, vec![0.0, 8.0]);
        let trend = chart.trend.unwrap();
        assert_approx_eq(trend[0], 0.0, 1e-9);
        assert_approx_eq(trend[1], 8.0, 1e-9);
    }

    #[test]
    fn test_labels_are_tick_text_only() {
        let records = fixtures::hourly_records(1, &[(10, 0), (20, 0)]);
        let chart = PreparedChart::from_points(&viewer_points(&records), "T").unwrap();
        assert_eq!(chart.label_at(0.0), "10:00");
        assert_eq!(chart.label_at(1.0), "11:00");
        assert_eq!(chart.label_at(0.5), "");
        assert_eq!(chart.label_at(-1.0), "");
        assert_eq!(chart.label_at(5.0), "");
    }

    #[test]
    fn test_render_produces_png_or_graph_error() {
        let config = ChartConfig {
            width: 320,
            height: 200,
            ..ChartConfig::default()
        };
        // Text rendering depends on system fonts
        match render_viewers_chart(&points(&[Some(3), Some(8), Some(5)]), "Render", &config) {
            Ok(Some(png)) => assert!(png.starts_with(b"\x89PNG")),
            Ok(None) => panic!("expected a chart"),
            Err(e) => assert!(matches!(e, StatsError::Graph { .. }), "{e}"),
        }
    }

    #[test]
    fn test_encode_png_checks_buffer_size() {
        assert!(encode_png(vec![0; 10], 4, 4).is_err());
        let png = encode_png(vec![255; 4 * 4 * 3], 4, 4).unwrap();
        assert!(png.starts_with(b"\x89PNG"));
    }
}
