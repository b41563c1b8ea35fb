use crate::models::Category;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

const FALLBACK_COLOR: &str = "#6c757d";

/// Human readable duration for a number of minutes.
///
/// Under an hour this keeps one decimal place ("45.0 分钟"). From 60 minutes
/// up it splits into whole hours and the rounded remainder.
pub fn format_duration(minutes: f64) -> String {
    if minutes < 60.0 {
        format!("{:.1} 分钟", minutes)
    } else {
        let hours = (minutes / 60.0).floor();
        let remaining = minutes % 60.0;
        format!("{} 小时 {} 分钟", hours as u64, remaining.round() as u64)
    }
}

/// Formats an ISO-8601 timestamp as `YYYY/MM/DD HH:MM` in local time.
///
/// Accepts the naive timestamps the server writes (`2024-01-05T14:30:00.123456`),
/// RFC 3339 timestamps with an offset, and bare dates.
pub fn format_date(value: &str) -> Option<String> {
    let value = value.trim();

    let local = if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        dt.with_timezone(&Local).naive_local()
    } else if let Ok(dt) = value.parse::<NaiveDateTime>() {
        dt
    } else {
        value.parse::<NaiveDate>().ok()?.and_hms_opt(0, 0, 0)?
    };

    Some(local.format("%Y/%m/%d %H:%M").to_string())
}

/// Share of `value` in `total` as a whole percentage, 0 when `total` is 0.
pub fn calculate_percentage(value: f64, total: f64) -> i64 {
    if total == 0.0 {
        return 0;
    }
    // Half-up, matching the numbers the web dashboard shows
    (value / total * 100.0 + 0.5).floor() as i64
}

/// Display label for a raw category string; unknown values pass through.
pub fn category_display(raw: &str) -> String {
    raw.parse::<Category>()
        .map(|c| c.label().to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn category_color(raw: &str) -> &'static str {
    raw.parse::<Category>()
        .map(|c| c.color())
        .unwrap_or(FALLBACK_COLOR)
}
