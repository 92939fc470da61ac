//! Application configuration structures

use serde::{Deserialize, Serialize};
use streamstats_common::{LogFormat, LoggingConfig};
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Chart rendering style
    #[validate]
    pub chart: ChartConfig,

    /// Report document layout
    #[validate]
    pub report: ReportConfig,

    /// Ingestion defaults
    #[validate]
    pub ingest: IngestConfig,

    /// Logging configuration
    #[validate]
    pub logging: LoggingSettings,
}

/// Chart rendering configuration, passed explicitly to every render call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ChartConfig {
    /// Chart width in pixels
    #[validate(range(min = 100, max = 4000, message = "Width must be between 100 and 4000 pixels"))]
    pub width: u32,

    /// Chart height in pixels
    #[validate(range(min = 100, max = 4000, message = "Height must be between 100 and 4000 pixels"))]
    pub height: u32,

    /// Background color (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Background color must be valid hex color"))]
    pub background_color: String,

    /// Color of the viewer series (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Series color must be valid hex color"))]
    pub series_color: String,

    /// Color of the fitted trend curve (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Trend color must be valid hex color"))]
    pub trend_color: String,

    /// Color of axis text and title (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Text color must be valid hex color"))]
    pub text_color: String,

    /// Font family for text rendering
    #[validate(length(min = 1, message = "Font family cannot be empty"))]
    pub font_family: String,

    /// Font size of the chart title
    #[validate(range(min = 8, max = 72, message = "Title font size must be between 8 and 72"))]
    pub title_font_size: u32,

    /// Font size of axis labels
    #[validate(range(min = 8, max = 72, message = "Label font size must be between 8 and 72"))]
    pub label_font_size: u32,

    /// Whether to draw grid lines
    pub show_grid: bool,

    /// Whether to overlay the fitted trend curve
    pub show_trend: bool,

    /// X axis description
    pub x_label: String,

    /// Y axis description
    pub y_label: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
            background_color: "#FFFFFF".to_string(),
            series_color: "#1F77B4".to_string(),
            trend_color: "#D62728".to_string(),
            text_color: "#000000".to_string(),
            font_family: "sans-serif".to_string(),
            title_font_size: 24,
            label_font_size: 14,
            show_grid: true,
            show_trend: true,
            x_label: "position label".to_string(),
            y_label: "count".to_string(),
        }
    }
}

/// Report document layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReportConfig {
    /// Text printed at the top of every page
    #[validate(length(max = 120, message = "Header text cannot exceed 120 characters"))]
    pub header_text: String,

    /// Page width in millimetres
    #[validate(range(min = 100.0, max = 1000.0, message = "Page width must be between 100 and 1000 mm"))]
    pub page_width_mm: f64,

    /// Page height in millimetres
    #[validate(range(min = 100.0, max = 1000.0, message = "Page height must be between 100 and 1000 mm"))]
    pub page_height_mm: f64,

    /// Margin on every side in millimetres
    #[validate(range(min = 0.0, max = 100.0, message = "Margin must be between 0 and 100 mm"))]
    pub margin_mm: f64,

    /// Currency symbol prefixed to donation amounts
    #[validate(length(min = 1, max = 8, message = "Currency symbol must be 1 to 8 characters"))]
    pub currency_symbol: String,

    /// Title shown for streams without one
    #[validate(length(min = 1, message = "Untitled placeholder cannot be empty"))]
    pub untitled_placeholder: String,

    /// Title cell for untitled streams in period tables
    #[validate(length(min = 1, message = "Untitled row placeholder cannot be empty"))]
    pub untitled_row_placeholder: String,

    /// Cell text for values that cannot be computed
    #[validate(length(min = 1, message = "Not-available placeholder cannot be empty"))]
    pub unavailable_placeholder: String,

    /// Body font size in points
    #[validate(range(min = 6.0, max = 36.0, message = "Body font size must be between 6 and 36"))]
    pub body_font_size: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            header_text: "Stream Analytics Report".to_string(),
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 10.0,
            currency_symbol: "$".to_string(),
            untitled_placeholder: "Untitled Stream".to_string(),
            untitled_row_placeholder: "Untitled".to_string(),
            unavailable_placeholder: "N/A".to_string(),
            body_font_size: 12.0,
        }
    }
}

/// Ingestion defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct IngestConfig {
    /// Streamer recorded when a new-stream submission leaves it blank
    #[validate(length(min = 1, message = "Default streamer cannot be empty"))]
    pub default_streamer: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            default_streamer: "streamer".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[validate(custom(function = "crate::validation::validate_log_level", message = "Log level must be one of: trace, debug, info, warn, error"))]
    pub level: String,

    /// Optional log file path
    #[validate(custom(function = "crate::validation::validate_file_path", message = "Log file path contains invalid characters"))]
    pub file: Option<String>,

    /// Line format: compact, pretty or json
    pub format: LogFormat,

    /// Log span open and close events
    pub spans: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            format: LogFormat::Compact,
            spans: false,
        }
    }
}

impl LoggingSettings {
    /// Runtime logging configuration for `streamstats_common::init_logging`
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            format: self.format,
            include_spans: self.spans,
            file_path: self.file.clone(),
            ..LoggingConfig::default()
        }
    }
}

impl Config {
    /// Field validation plus checks spanning several fields
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        self.report.validate_layout()?;
        Ok(())
    }
}

impl ReportConfig {
    /// Margins must leave printable area on the page
    pub fn validate_layout(&self) -> Result<(), validator::ValidationErrors> {
        let mut errors = validator::ValidationErrors::new();

        if self.margin_mm * 2.0 >= self.page_width_mm {
            errors.add(
                "margin_mm",
                validator::ValidationError::new("margins_exceed_page_width"),
            );
        }
        if self.margin_mm * 2.0 >= self.page_height_mm {
            errors.add(
                "margin_mm",
                validator::ValidationError::new("margins_exceed_page_height"),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Printable width between the margins
    pub fn content_width_mm(&self) -> f64 {
        self.page_width_mm - 2.0 * self.margin_mm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.validate_all().is_ok());
        assert_eq!(config.chart.x_label, "position label");
        assert_eq!(config.chart.y_label, "count");
        assert_eq!(config.report.currency_symbol, "$");
        assert_eq!(config.report.untitled_placeholder, "Untitled Stream");
        assert_eq!(config.report.untitled_row_placeholder, "Untitled");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();

        let yaml = serde_yaml::to_string(&config).expect("Failed to serialize to YAML");
        assert!(yaml.contains("chart:"));
        assert!(yaml.contains("report:"));
        assert!(yaml.contains("ingest:"));

        let deserialized: Config =
            serde_yaml::from_str(&yaml).expect("Failed to deserialize from YAML");
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "chart:\n  width: 640\n";
        let config: Config = serde_yaml::from_str(yaml).expect("Failed to parse partial config");
        assert_eq!(config.chart.width, 640);
        assert_eq!(config.chart.height, 500);
        assert_eq!(config.report, ReportConfig::default());
    }

    #[test]
    fn test_chart_config_validation() {
        let mut config = ChartConfig::default();
        assert!(config.validate().is_ok());

        config.width = 50;
        assert!(config.validate().is_err());

        config.width = 1000;
        config.height = 5000;
        assert!(config.validate().is_err());

        config.height = 500;
        config.background_color = "#GGGGGG".to_string();
        assert!(config.validate().is_err());

        config.background_color = "#FFFFFF".to_string();
        config.trend_color = "#FFF".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_report_layout_validation() {
        let mut config = ReportConfig::default();
        assert!(config.validate_layout().is_ok());
        assert!((config.content_width_mm() - 190.0).abs() < f64::EPSILON);

        config.page_width_mm = 150.0;
        config.margin_mm = 80.0;
        assert!(config.validate().is_ok());
        assert!(config.validate_layout().is_err());
    }

    #[test]
    fn test_logging_settings_validation() {
        let mut settings = LoggingSettings::default();
        assert!(settings.validate().is_ok());

        settings.level = "loud".to_string();
        assert!(settings.validate().is_err());

        for level in &["trace", "debug", "info", "warn", "error"] {
            settings.level = (*level).to_string();
            assert!(settings.validate().is_ok(), "Level {level} should be valid");
        }

        settings.file = Some("bad|name.log".to_string());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_logging_settings_conversion() {
        let settings = LoggingSettings {
            level: "debug".to_string(),
            file: Some("streamstats.log".to_string()),
            format: LogFormat::Json,
            spans: true,
        };
        let runtime = settings.to_logging_config();
        assert_eq!(runtime.level, "debug");
        assert_eq!(runtime.format, LogFormat::Json);
        assert!(runtime.include_spans);
        assert_eq!(runtime.file_path.as_deref(), Some("streamstats.log"));
    }
}
