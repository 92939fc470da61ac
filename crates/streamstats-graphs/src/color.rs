//! Hex color parsing for chart styles

use plotters::style::RGBColor;
use tracing::warn;

/// Parse `#RRGGBB`, `None` for anything else
pub fn try_parse_color(color_str: &str) -> Option<RGBColor> {
    let hex = color_str.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(RGBColor(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Parse `#RRGGBB`, defaulting to black
pub fn parse_color(color_str: &str) -> RGBColor {
    try_parse_color(color_str).unwrap_or_else(|| {
        warn!(color = color_str, "Invalid color, using black");
        RGBColor(0, 0, 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#1F77B4"), RGBColor(0x1F, 0x77, 0xB4));
        assert_eq!(parse_color("#ffffff"), RGBColor(255, 255, 255));
    }

    #[test]
    fn test_invalid_colors_fall_back_to_black() {
        for input in ["", "#FFF", "FFFFFF", "#GGGGGG", "#FFFFFFF", "#ÿÿÿ"] {
            assert_eq!(try_parse_color(input), None, "{input}");
            assert_eq!(parse_color(input), RGBColor(0, 0, 0));
        }
    }
}
