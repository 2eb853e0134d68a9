//! Momentum indicators: RSI, MACD and the KDJ stochastic.

use serde::{Deserialize, Serialize};
use watchprice_core::traits::{HlcIndicator, Indicator, MultiOutputIndicator};

use crate::moving_average::{Ema, Sma};

/// Wilder RSI over `period` price changes.
///
/// The first reading needs `period + 1` closes; a window without losses reads
/// 100.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub const DEFAULT_PERIOD: usize = 14;

    /// A zero period is treated as 1.
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    fn index(gain: f64, loss: f64) -> f64 {
        if loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + gain / loss)
        }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD)
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() <= self.period {
            return Vec::new();
        }
        let n = self.period as f64;
        let moves: Vec<(f64, f64)> = data
            .windows(2)
            .map(|pair| {
                let delta = pair[1] - pair[0];
                (delta.max(0.0), (-delta).max(0.0))
            })
            .collect();

        let (seed, rest) = moves.split_at(self.period);
        let (mut gain, mut loss) = seed
            .iter()
            .fold((0.0, 0.0), |(g, l), &(up, down)| (g + up / n, l + down / n));

        let mut out = Vec::with_capacity(rest.len() + 1);
        out.push(Self::index(gain, loss));
        for &(up, down) in rest {
            // Wilder smoothing
            gain += (up - gain) / n;
            loss += (down - loss) / n;
            out.push(Self::index(gain, loss));
        }
        out
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// One MACD sample. The signal line starts `signal - 1` samples after the
/// MACD line, so early samples carry only the MACD value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// Fast EMA minus slow EMA
    pub macd: f64,
    /// EMA of the MACD line
    pub signal: Option<f64>,
    /// MACD minus signal
    pub histogram: Option<f64>,
}

/// Moving Average Convergence Divergence.
#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

impl Macd {
    /// MACD with the standard (12, 26, 9) periods.
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast < slow, "Fast period must be less than slow period");
        Self {
            fast: Ema::new(fast),
            slow: Ema::new(slow),
            signal: Ema::new(signal),
        }
    }

    /// Closes needed for the first sample with a signal line.
    pub fn signal_period(&self) -> usize {
        self.slow.period() + self.signal.period() - 1
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiOutputIndicator for Macd {
    type Outputs = MacdOutput;

    fn calculate(&self, data: &[f64]) -> Vec<MacdOutput> {
        if data.len() < self.period() {
            return vec![];
        }

        let fast_ema = self.fast.calculate(data);
        let slow_ema = self.slow.calculate(data);

        // Fast EMA starts earlier; align both on the slow EMA's first value.
        let offset = self.slow.period() - self.fast.period();
        let macd_line: Vec<f64> = fast_ema[offset..]
            .iter()
            .zip(&slow_ema)
            .map(|(f, s)| f - s)
            .collect();

        let signal_line = self.signal.calculate(&macd_line);
        let lag = self.signal.period() - 1;

        macd_line
            .iter()
            .enumerate()
            .map(|(i, &macd)| {
                let signal = i.checked_sub(lag).and_then(|j| signal_line.get(j)).copied();
                MacdOutput {
                    macd,
                    signal,
                    histogram: signal.map(|signal| macd - signal),
                }
            })
            .collect()
    }

    /// Closes needed for the first MACD value; the signal line needs
    /// [`Macd::signal_period`] closes.
    fn period(&self) -> usize {
        self.slow.period()
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

/// One KDJ sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KdjOutput {
    /// Raw stochastic %K
    pub k: f64,
    /// SMA of %K
    pub d: f64,
    /// `3K - 2D`
    pub j: f64,
}

/// KDJ: stochastic %K over `k_period` bars, %D as the SMA of %K, and J.
#[derive(Debug, Clone)]
pub struct Kdj {
    k_period: usize,
    d: Sma,
}

impl Kdj {
    /// KDJ with %K period 9 and %D period 3.
    pub fn new() -> Self {
        Self::with_periods(9, 3)
    }

    pub fn with_periods(k_period: usize, d_period: usize) -> Self {
        Self {
            k_period: k_period.max(1),
            d: Sma::new(d_period),
        }
    }

    fn raw_k(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
        let len = high.len().min(low.len()).min(close.len());
        if len < self.k_period {
            return vec![];
        }

        ((self.k_period - 1)..len)
            .map(|i| {
                let start = i + 1 - self.k_period;
                let highest = high[start..=i].iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let lowest = low[start..=i].iter().copied().fold(f64::INFINITY, f64::min);
                let range = highest - lowest;
                if range == 0.0 {
                    50.0 // flat window, use midpoint
                } else {
                    (close[i] - lowest) / range * 100.0
                }
            })
            .collect()
    }
}

impl Default for Kdj {
    fn default() -> Self {
        Self::new()
    }
}

impl HlcIndicator for Kdj {
    type Output = KdjOutput;

    fn calculate(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<KdjOutput> {
        let k_values = self.raw_k(high, low, close);
        let d_values = self.d.calculate(&k_values);
        let offset = self.d.period() - 1;

        if k_values.len() < offset {
            return vec![];
        }

        k_values[offset..]
            .iter()
            .zip(&d_values)
            .map(|(&k, &d)| KdjOutput { k, d, j: 3.0 * k - 2.0 * d })
            .collect()
    }

    fn period(&self) -> usize {
        self.k_period + self.d.period() - 1
    }

    fn name(&self) -> &str {
        "KDJ"
    }
}
