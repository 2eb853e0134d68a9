//! Indicator readings attached to a quote.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional bias of a trend-following reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendBias {
    Bullish,
    Bearish,
    Ranging,
}

impl fmt::Display for TrendBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendBias::Bullish => "bullish",
            TrendBias::Bearish => "bearish",
            TrendBias::Ranging => "ranging",
        };
        f.write_str(s)
    }
}

/// Oscillator zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Overbought,
    Oversold,
    Neutral,
}

impl Zone {
    /// Classify `value` against an upper and lower bound (both exclusive).
    pub fn classify(value: f64, upper: f64, lower: f64) -> Self {
        if value > upper {
            Zone::Overbought
        } else if value < lower {
            Zone::Oversold
        } else {
            Zone::Neutral
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Zone::Overbought => "overbought",
            Zone::Oversold => "oversold",
            Zone::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// MACD line plus, once enough history exists, its signal line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub macd: f64,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
    /// Absent until the signal line exists
    pub bias: Option<TrendBias>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiReading {
    pub value: f64,
    pub zone: Zone,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KdjReading {
    pub k: f64,
    pub d: f64,
    pub j: f64,
    pub zone: Zone,
}

/// Latest close relative to the short-term mean, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReading {
    pub value: f64,
    pub bias: TrendBias,
}

/// Indicator readings derived from a candle series. Each part is optional:
/// one failed derivation never hides the others.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdReading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<RsiReading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kdj: Option<KdjReading>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendReading>,
}

impl IndicatorSet {
    pub fn is_empty(&self) -> bool {
        self.macd.is_none() && self.rsi.is_none() && self.kdj.is_none() && self.trend.is_none()
    }

    /// Short signal label used in alerts: RSI zone first, MACD bias second.
    pub fn headline(&self) -> Option<String> {
        self.rsi
            .map(|rsi| format!("RSI {}", rsi.zone))
            .or_else(|| {
                self.macd
                    .and_then(|macd| macd.bias)
                    .map(|bias| format!("MACD {bias}"))
            })
    }
}
