//! Trading-window arithmetic on local wall-clock time.

use chrono::{NaiveTime, Timelike};
use std::time::Duration;
use watchprice_core::types::{TradingWindow, MINUTES_PER_DAY};

/// Wait used when no trading window is configured at all.
pub const NO_WINDOW_RETRY: Duration = Duration::from_secs(5 * 60);

const MILLIS_PER_MINUTE: u64 = 60_000;

/// Minutes since local midnight.
#[inline]
pub fn minute_of_day(now: NaiveTime) -> u32 {
    now.hour() * 60 + now.minute()
}

/// Whether `now` falls inside any window (start inclusive, end exclusive).
pub fn is_trading_open(windows: &[TradingWindow], now: NaiveTime) -> bool {
    let minute = minute_of_day(now);
    windows.iter().any(|w| w.contains(minute))
}

/// Time until the next window opens.
///
/// Picks the earliest start strictly after the current minute; when every
/// start today has passed, waits through midnight to the earliest start
/// tomorrow. Seconds and milliseconds already elapsed in the current minute
/// are subtracted. Always positive.
pub fn millis_until_next_window(windows: &[TradingWindow], now: NaiveTime) -> Duration {
    let Some(first_start) = windows.iter().map(|w| w.start_minute).min() else {
        return NO_WINDOW_RETRY;
    };

    let minute = minute_of_day(now);
    let minutes_ahead = windows
        .iter()
        .map(|w| w.start_minute)
        .filter(|&start| start > minute)
        .min()
        .map(|start| start - minute)
        .unwrap_or(MINUTES_PER_DAY - minute + first_start);

    // leap-second nanos can exceed one second
    let into_minute = u64::from(now.second()) * 1_000 + u64::from(now.nanosecond() / 1_000_000).min(999);
    let millis = (u64::from(minutes_ahead) * MILLIS_PER_MINUTE).saturating_sub(into_minute);
    Duration::from_millis(millis.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchprice_core::types::WatchConfig;

    fn at(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_window_bounds() {
        let windows = WatchConfig::default_windows();
        assert!(!is_trading_open(&windows, at(9, 29, 59)));
        assert!(is_trading_open(&windows, at(9, 30, 0)));
        assert!(is_trading_open(&windows, at(11, 29, 59)));
        assert!(!is_trading_open(&windows, at(11, 30, 0)));
        assert!(!is_trading_open(&windows, at(12, 0, 0)));
        assert!(is_trading_open(&windows, at(14, 59, 0)));
        assert!(!is_trading_open(&windows, at(15, 0, 0)));
    }

    #[test]
    fn test_next_window_same_day() {
        let windows = WatchConfig::default_windows();
        assert_eq!(
            millis_until_next_window(&windows, at(12, 0, 0)),
            Duration::from_secs(60 * 60)
        );
        assert_eq!(
            millis_until_next_window(&windows, at(9, 29, 30)),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_next_window_wraps_midnight() {
        let windows = WatchConfig::default_windows();
        // 15:00 -> 24:00 is 9h, then 9h30m into tomorrow
        assert_eq!(
            millis_until_next_window(&windows, at(15, 0, 0)),
            Duration::from_secs((18 * 60 + 30) * 60)
        );
    }

    #[test]
    fn test_next_window_unsorted() {
        let windows = vec![
            TradingWindow::new("late", 21 * 60, 23 * 60),
            TradingWindow::new("early", 8 * 60, 9 * 60),
        ];
        assert_eq!(
            millis_until_next_window(&windows, at(7, 0, 0)),
            Duration::from_secs(60 * 60)
        );
        assert_eq!(
            millis_until_next_window(&windows, at(23, 30, 0)),
            Duration::from_secs(8 * 60 * 60 + 30 * 60)
        );
    }

    #[test]
    fn test_no_windows() {
        assert_eq!(millis_until_next_window(&[], at(10, 0, 0)), NO_WINDOW_RETRY);
        assert!(!is_trading_open(&[], at(10, 0, 0)));
    }

    #[test]
    fn test_subtracts_milliseconds() {
        let windows = vec![TradingWindow::new("w", 10 * 60, 11 * 60)];
        let now = NaiveTime::from_hms_milli_opt(9, 59, 59, 250).unwrap();
        assert_eq!(millis_until_next_window(&windows, now), Duration::from_millis(750));
    }
}
