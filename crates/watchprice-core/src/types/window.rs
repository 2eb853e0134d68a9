//! Daily trading windows and the runtime watch configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::WatchedInstrument;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Half-open `[start, end)` interval of local wall-clock minutes, recurring daily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingWindow {
    pub label: String,
    pub start_minute: u32,
    pub end_minute: u32,
}

impl TradingWindow {
    pub fn new(label: impl Into<String>, start_minute: u32, end_minute: u32) -> Self {
        Self {
            label: label.into(),
            start_minute,
            end_minute,
        }
    }

    /// Build from `"HH:MM"` strings; `None` if either bound does not parse.
    pub fn parse(label: impl Into<String>, start: &str, end: &str) -> Option<Self> {
        Some(Self::new(
            label,
            parse_minute_of_day(start)?,
            parse_minute_of_day(end)?,
        ))
    }

    /// Whether `minute` (minute of day) falls inside this window.
    #[inline]
    pub fn contains(&self, minute: u32) -> bool {
        minute >= self.start_minute && minute < self.end_minute
    }
}

/// Parse `"HH:MM"` into minutes since midnight.
pub fn parse_minute_of_day(value: &str) -> Option<u32> {
    let (hour, minute) = value.trim().split_once(':')?;
    let hour: u32 = hour.trim().parse().ok()?;
    let minute: u32 = minute.trim().parse().ok()?;
    if hour > 24 || minute > 59 {
        return None;
    }
    // 24:00 is the only valid end-of-day spelling
    Some(hour * 60 + minute).filter(|&total| total <= MINUTES_PER_DAY)
}

/// Render minutes since midnight as `"HH:MM"`.
pub fn format_minute_of_day(minute: u32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Runtime configuration handed to the scheduler on start and on every reload.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
    pub instruments: Vec<WatchedInstrument>,
    pub update_interval: Duration,
    pub alert_threshold_percent: f64,
    pub trading_windows: Vec<TradingWindow>,
}

impl WatchConfig {
    pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(5_000);
    pub const DEFAULT_ALERT_THRESHOLD_PERCENT: f64 = 1.0;

    /// The two standard mainland sessions, 09:30-11:30 and 13:00-15:00.
    pub fn default_windows() -> Vec<TradingWindow> {
        vec![
            TradingWindow::new("morning", 9 * 60 + 30, 11 * 60 + 30),
            TradingWindow::new("afternoon", 13 * 60, 15 * 60),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minute_of_day() {
        assert_eq!(parse_minute_of_day("09:30"), Some(570));
        assert_eq!(parse_minute_of_day("9:05"), Some(545));
        assert_eq!(parse_minute_of_day("24:00"), Some(1440));
        assert_eq!(parse_minute_of_day("24:59"), None);
        assert_eq!(parse_minute_of_day("25:00"), None);
        assert_eq!(parse_minute_of_day("0930"), None);
        assert_eq!(parse_minute_of_day("ab:cd"), None);
        assert_eq!(parse_minute_of_day("12:75"), None);
    }

    #[test]
    fn test_window_is_half_open() {
        let window = TradingWindow::parse("morning", "09:30", "11:30").unwrap();
        assert!(!window.contains(569));
        assert!(window.contains(570));
        assert!(window.contains(689));
        assert!(!window.contains(690));
    }

    #[test]
    fn test_format_minute_of_day() {
        assert_eq!(format_minute_of_day(570), "09:30");
        assert_eq!(format_minute_of_day(0), "00:00");
    }
}
