//! Text formatting helpers for the monitor screen

use chrono::{DateTime, NaiveDateTime, Utc};
use colored::Color;

/// Human-readable size with one decimal place, e.g. `1.5 KB`
pub fn format_bytes(bytes: i64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.1} {}", size, UNITS[unit_index])
}

/// Time left until an ISO-8601 timestamp, relative to `now`
///
/// Only the first 19 characters are read, as UTC. Fractional seconds and any
/// zone suffix are ignored. Unparseable input is returned unchanged.
pub fn format_countdown_at(expires_at: &str, now: DateTime<Utc>) -> String {
    if expires_at.is_empty() {
        return "N/A".to_string();
    }

    let Some(expires) = expires_at
        .get(..19)
        .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
    else {
        return expires_at.to_string();
    };

    let remaining = expires.and_utc().timestamp() - now.timestamp();
    if remaining <= 0 {
        return "Expired".to_string();
    }

    let (minutes, seconds) = (remaining / 60, remaining % 60);
    if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Shorten to at most `max` characters, marking the cut with `...`
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Clamp a percentage into [0, 100]; NaN becomes 0
pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

/// Number of filled cells for a percentage on a gauge of `width` cells
pub fn gauge_fill(percent: f64, width: usize) -> usize {
    let fill = (percent / 100.0 * width as f64).round();
    if fill.is_nan() || fill <= 0.0 {
        0
    } else {
        (fill as usize).min(width)
    }
}

/// `[|||||     ]` style gauge
pub fn gauge(percent: f64, width: usize) -> String {
    let fill = gauge_fill(percent, width);
    format!("[{}{}]", "|".repeat(fill), " ".repeat(width - fill))
}

pub fn vram_color(percent: f64) -> Color {
    if percent > 90.0 {
        Color::Red
    } else if percent > 70.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

pub fn util_color(percent: f64) -> Color {
    if percent > 90.0 {
        Color::Red
    } else if percent > 50.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

pub fn temp_color(celsius: i32) -> Color {
    if celsius > 80 {
        Color::Red
    } else if celsius > 60 {
        Color::Yellow
    } else {
        Color::Green
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, s).unwrap()
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.0 B");
        assert_eq!(format_bytes(512), "512.0 B");
        assert_eq!(format_bytes(1023), "1023.0 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_048_576), "1.0 MB");
        assert_eq!(format_bytes(1_073_741_824), "1.0 GB");
        assert_eq!(format_bytes(4_661_224_676), "4.3 GB");
        assert_eq!(format_bytes(5 * 1024_i64.pow(5)), "5120.0 TB");
    }

    #[test]
    fn test_countdown() {
        let now = at(10, 28, 30);
        assert_eq!(format_countdown_at("2024-01-15T10:30:00", now), "1m 30s");
        assert_eq!(format_countdown_at("2024-01-15T10:28:45.123456Z", now), "15s");
        assert_eq!(format_countdown_at("2024-01-15T12:28:30-07:00", now), "120m 0s");
    }

    #[test]
    fn test_countdown_expired() {
        let now = at(10, 28, 30);
        assert_eq!(format_countdown_at("2024-01-15T10:28:30Z", now), "Expired");
        assert_eq!(format_countdown_at("2023-12-31T23:59:59Z", now), "Expired");
    }

    #[test]
    fn test_countdown_edge_cases() {
        let now = at(10, 28, 30);
        assert_eq!(format_countdown_at("", now), "N/A");
        assert_eq!(format_countdown_at("soon", now), "soon");
        assert_eq!(format_countdown_at("2024-13-45T99:00:00Z", now), "2024-13-45T99:00:00Z");
        assert_eq!(format_countdown_at("0001-01-01T00:00:00Z", now), "Expired");
    }

    #[test]
    fn test_truncate() {
        let name = "a".repeat(40);
        let short = truncate(&name, 29);
        assert_eq!(short.chars().count(), 29);
        assert!(short.ends_with("..."));
        assert_eq!(&short[..26], &name[..26]);

        assert_eq!(truncate("llama3:8b", 29), "llama3:8b");
        assert_eq!(truncate("exactly", 7), "exactly");
        assert_eq!(truncate("modèle-très-long", 8), "modèl...");
        assert_eq!(truncate("abcdef", 2), "...");
    }

    #[test]
    fn test_gauge_fill() {
        assert_eq!(gauge_fill(150.0, 20), 20);
        assert_eq!(gauge_fill(-5.0, 20), 0);
        assert_eq!(gauge_fill(50.0, 20), 10);
        assert_eq!(gauge_fill(52.5, 20), 11);
        assert_eq!(gauge_fill(47.4, 20), 9);
        assert_eq!(gauge_fill(f64::NAN, 20), 0);
        assert_eq!(gauge_fill(100.0, 30), 30);
    }

    #[test]
    fn test_gauge() {
        assert_eq!(gauge(0.0, 4), "[    ]");
        assert_eq!(gauge(50.0, 4), "[||  ]");
        assert_eq!(gauge(200.0, 4), "[||||]");
        assert_eq!(gauge(25.0, 20).len(), 22);
    }

    #[test]
    fn test_clamp_percent() {
        assert_eq!(clamp_percent(-1.0), 0.0);
        assert_eq!(clamp_percent(101.0), 100.0);
        assert_eq!(clamp_percent(f64::NAN), 0.0);
        assert_eq!(clamp_percent(42.5), 42.5);
    }

    #[test]
    fn test_colors() {
        assert_eq!(vram_color(95.0), Color::Red);
        assert_eq!(vram_color(90.0), Color::Yellow);
        assert_eq!(vram_color(71.0), Color::Yellow);
        assert_eq!(vram_color(70.0), Color::Green);

        assert_eq!(util_color(91.0), Color::Red);
        assert_eq!(util_color(51.0), Color::Yellow);
        assert_eq!(util_color(50.0), Color::Green);

        assert_eq!(temp_color(81), Color::Red);
        assert_eq!(temp_color(80), Color::Yellow);
        assert_eq!(temp_color(61), Color::Yellow);
        assert_eq!(temp_color(60), Color::Green);
    }
}
