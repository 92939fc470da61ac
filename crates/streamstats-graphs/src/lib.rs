//! Viewer chart generation for streamstats

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod color;
pub mod trend;
pub mod viewer_chart;

pub use color::{parse_color, try_parse_color};
pub use trend::{fit_trend, trend_degree, Polynomial, MAX_TREND_DEGREE};
pub use viewer_chart::{
    render_viewers_chart, viewer_points, ChartPoint, PreparedChart, ViewerChartRenderer,
};
