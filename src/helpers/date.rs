//! Date helper functions
//!
//! Post dates come from free-form front-matter text, so everything here
//! tolerates input that never parses and falls back to the raw string.

use chrono::{NaiveDate, NaiveDateTime};

/// Parse a date string in the formats posts commonly use
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d",
        "%Y/%m/%d",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    None
}

/// Format a metadata date for display (like "January 15, 2024")
///
/// Unparseable input is shown as-is rather than dropped.
pub fn display_date(s: &str) -> String {
    match parse_date(s) {
        Some(d) => d.format("%B %-d, %Y").to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date("2024/01/15 10:30:00"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(parse_date("soon(ish)"), None);
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2024-01-15"), "January 15, 2024");
    }

    #[test]
    fn test_display_date_falls_back_to_raw() {
        assert_eq!(display_date("soon(ish)"), "soon(ish)");
    }
}
