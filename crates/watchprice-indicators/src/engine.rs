//! Indicator engine: derives the quote's [`IndicatorSet`] from daily candles.

use tracing::{debug, warn};
use watchprice_core::error::IndicatorError;
use watchprice_core::traits::{HlcIndicator, Indicator, MultiOutputIndicator};
use watchprice_core::types::{
    hlc_columns, Candle, IndicatorSet, KdjReading, MacdReading, RsiReading, TrendBias,
    TrendReading, Zone,
};

use crate::momentum::{Kdj, Macd, Rsi};
use crate::trend::TrendDeviation;

/// Computes MACD, RSI, KDJ and trend bias over a candle series.
///
/// Each reading is derived independently; a failed derivation is logged and
/// leaves only that part of the set empty.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    macd: Macd,
    rsi: Rsi,
    kdj: Kdj,
    trend: TrendDeviation,
    min_candles: usize,
}

impl IndicatorEngine {
    /// Fewest complete candles the engine will look at.
    pub const MIN_CANDLES: usize = 30;

    pub const RSI_OVERBOUGHT: f64 = 70.0;
    pub const RSI_OVERSOLD: f64 = 30.0;
    pub const KDJ_OVERBOUGHT: f64 = 80.0;
    pub const KDJ_OVERSOLD: f64 = 20.0;
    pub const TREND_BAND_PERCENT: f64 = 2.0;

    pub fn new() -> Self {
        Self {
            macd: Macd::new(),
            rsi: Rsi::default(),
            kdj: Kdj::new(),
            trend: TrendDeviation::default(),
            min_candles: Self::MIN_CANDLES,
        }
    }

    /// Compute the indicator set, or `None` when history is too short or
    /// every derivation failed.
    pub fn compute(&self, candles: &[Candle]) -> Option<IndicatorSet> {
        let (highs, lows, closes) = hlc_columns(candles);
        if closes.len() < self.min_candles {
            debug!(
                available = closes.len(),
                required = self.min_candles,
                "Not enough history for indicators"
            );
            return None;
        }

        let set = IndicatorSet {
            macd: keep("MACD", self.macd_reading(&closes)),
            rsi: keep("RSI", self.rsi_reading(&closes)),
            kdj: keep("KDJ", self.kdj_reading(&highs, &lows, &closes)),
            trend: keep("trend", self.trend_reading(&closes)),
        };

        if set.is_empty() {
            None
        } else {
            Some(set)
        }
    }

    /// MACD from 26 closes; signal, histogram and bias from 34.
    pub fn macd_reading(&self, closes: &[f64]) -> Result<MacdReading, IndicatorError> {
        let latest = self.macd.latest(closes)?;
        let bias = latest.signal.map(|signal| {
            if latest.macd > signal {
                TrendBias::Bullish
            } else {
                TrendBias::Bearish
            }
        });
        Ok(MacdReading {
            macd: latest.macd,
            signal: latest.signal,
            histogram: latest.histogram,
            bias,
        })
    }

    pub fn rsi_reading(&self, closes: &[f64]) -> Result<RsiReading, IndicatorError> {
        let value = self.rsi.latest(closes)?;
        Ok(RsiReading {
            value,
            zone: Zone::classify(value, Self::RSI_OVERBOUGHT, Self::RSI_OVERSOLD),
        })
    }

    pub fn kdj_reading(
        &self,
        highs: &[f64],
        lows: &[f64],
        closes: &[f64],
    ) -> Result<KdjReading, IndicatorError> {
        let latest = self.kdj.latest(highs, lows, closes)?;
        Ok(KdjReading {
            k: latest.k,
            d: latest.d,
            j: latest.j,
            zone: Zone::classify(latest.k, Self::KDJ_OVERBOUGHT, Self::KDJ_OVERSOLD),
        })
    }

    pub fn trend_reading(&self, closes: &[f64]) -> Result<TrendReading, IndicatorError> {
        let value = self.trend.latest(closes)?;
        let bias = if value > Self::TREND_BAND_PERCENT {
            TrendBias::Bullish
        } else if value < -Self::TREND_BAND_PERCENT {
            TrendBias::Bearish
        } else {
            TrendBias::Ranging
        };
        Ok(TrendReading { value, bias })
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn keep<T>(indicator: &str, result: Result<T, IndicatorError>) -> Option<T> {
    match result {
        Ok(reading) => Some(reading),
        Err(e) => {
            warn!(indicator, error = %e, "Indicator calculation failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let close = 100.0 + i as f64;
                Candle::new(i as i64 * 86_400_000, close - 0.5, close + 1.0, close - 1.0, close, 1e6)
            })
            .collect()
    }

    #[test]
    fn test_short_history_is_absent() {
        let engine = IndicatorEngine::new();
        for n in [0, 1, 10, 29] {
            assert!(engine.compute(&rising(n)).is_none(), "n = {n}");
        }
    }

    #[test]
    fn test_incomplete_candles_do_not_count() {
        let engine = IndicatorEngine::new();
        let mut candles = rising(30);
        candles[3].close = f64::NAN;
        assert!(engine.compute(&candles).is_none());
    }

    #[test]
    fn test_thirty_candles_partial_set() {
        // 30 bars give a MACD line but no signal line yet
        let set = IndicatorEngine::new().compute(&rising(30)).unwrap();
        let macd = set.macd.unwrap();
        assert!(macd.macd > 0.0);
        assert_eq!(macd.signal, None);
        assert_eq!(macd.histogram, None);
        assert_eq!(macd.bias, None);
        assert!(set.rsi.is_some());
        assert!(set.kdj.is_some());
        assert!(set.trend.is_some());
    }

    #[test]
    fn test_uptrend_readings() {
        let set = IndicatorEngine::new().compute(&rising(60)).unwrap();

        let macd = set.macd.unwrap();
        assert!(macd.macd > 0.0);
        assert!(macd.signal.is_some());
        assert!(macd.bias.is_some());

        let rsi = set.rsi.unwrap();
        assert_eq!(rsi.value, 100.0);
        assert_eq!(rsi.zone, Zone::Overbought);

        let kdj = set.kdj.unwrap();
        assert_eq!(kdj.zone, Zone::Overbought);
        assert!((kdj.j - (3.0 * kdj.k - 2.0 * kdj.d)).abs() < 1e-10);

        // latest 159 vs mean 157 => 1.27%
        let trend = set.trend.unwrap();
        assert_eq!(trend.value, 1.27);
        assert_eq!(trend.bias, TrendBias::Ranging);
        assert_eq!(set.headline().as_deref(), Some("RSI overbought"));
    }

    #[test]
    fn test_trend_bias_bands() {
        let engine = IndicatorEngine::new();
        let up = engine.trend_reading(&[10.0, 10.0, 10.0, 10.0, 11.0]).unwrap();
        assert_eq!(up.bias, TrendBias::Bullish);
        let down = engine.trend_reading(&[10.0, 10.0, 10.0, 10.0, 9.0]).unwrap();
        assert_eq!(down.bias, TrendBias::Bearish);
    }
}
