//! Formatting helpers shared by the report and CLI crates

use chrono::NaiveDate;

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format an amount with two decimals behind a currency symbol (`$12.50`)
pub fn format_currency(symbol: &str, amount: f64) -> String {
    format!("{symbol}{amount:.2}")
}

/// Truncate a string to at most `max_chars` characters, appending `...` when cut
pub fn truncate_string(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut truncated: String = value.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

/// The trimmed value, or the placeholder when it is missing or blank
pub fn display_or<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => placeholder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_date(date), "2024-01-05");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency("$", 12.5), "$12.50");
        assert_eq!(format_currency("EUR ", 0.0), "EUR 0.00");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("a very long title", 9), "a very...");
        assert_eq!(truncate_string("ééééé", 4), "é...");
    }

    #[test]
    fn test_display_or() {
        assert_eq!(display_or(Some("Speedrun"), "Untitled"), "Speedrun");
        assert_eq!(display_or(Some("   "), "Untitled"), "Untitled");
        assert_eq!(display_or(None, "Untitled"), "Untitled");
    }
}
