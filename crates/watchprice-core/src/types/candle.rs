//! OHLCV candle and raw tick types.

use serde::{Deserialize, Serialize};

/// OHLCV candle.
/// Uses f64 for fast indicator calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Unix timestamp in milliseconds
    pub time: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Candle {
    /// Create a new candle.
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Whether close, high and low are all usable for indicator math.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.close.is_finite() && self.high.is_finite() && self.low.is_finite()
    }
}

/// Raw point sample read back from the record journal.
///
/// Unlike a [`Candle`], a tick is a single observation; `volume` is the
/// cumulative session volume reported by the upstream at that instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    pub price: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
}

impl Tick {
    pub fn new(timestamp: i64, price: f64, volume: f64) -> Self {
        Self {
            timestamp,
            price: Some(price),
            high: None,
            low: None,
            volume: Some(volume),
        }
    }
}

/// Close, high and low columns of the complete candles in a series.
pub fn hlc_columns(candles: &[Candle]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let complete = candles.iter().filter(|c| c.is_complete());
    let mut highs = Vec::with_capacity(candles.len());
    let mut lows = Vec::with_capacity(candles.len());
    let mut closes = Vec::with_capacity(candles.len());
    for candle in complete {
        highs.push(candle.high);
        lows.push(candle.low);
        closes.push(candle.close);
    }
    (highs, lows, closes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_completeness() {
        let candle = Candle::new(1000, 100.0, 110.0, 95.0, 105.0, 1000000.0);
        assert!(candle.is_complete());
        assert!(!Candle::new(1000, 100.0, 110.0, f64::INFINITY, 105.0, 0.0).is_complete());
    }

    #[test]
    fn test_incomplete_candles_are_skipped() {
        let candles = vec![
            Candle::new(1, 100.0, 101.0, 99.0, 100.5, 1000.0),
            Candle::new(2, 100.5, f64::NAN, 100.0, 101.5, 1000.0),
            Candle::new(3, 101.5, 103.0, 101.0, 102.5, 1000.0),
        ];

        let (highs, lows, closes) = hlc_columns(&candles);
        assert_eq!(closes, vec![100.5, 102.5]);
        assert_eq!(highs, vec![101.0, 103.0]);
        assert_eq!(lows, vec![99.0, 101.0]);
    }
}
