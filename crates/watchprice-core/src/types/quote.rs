//! Canonical quote produced by the resolver each tick.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{IndicatorSet, SourceId, Symbol};

/// A resolved quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    /// Name reported by the upstream
    pub name: String,
    /// Adapter that produced this quote
    pub source: SourceId,
    pub current_price: f64,
    pub previous_close: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    /// `current_price - previous_close`
    pub change: f64,
    /// Percent change rounded to 2 dp; absent when it cannot be computed
    pub change_percent: Option<Decimal>,
    pub as_of: DateTime<Utc>,
    pub indicators: Option<IndicatorSet>,
}

/// Price fields parsed out of an upstream payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteFields {
    pub name: String,
    pub current_price: f64,
    pub previous_close: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
}

impl Quote {
    /// Build a quote from parsed fields, deriving change and percent change.
    pub fn from_fields(
        symbol: Symbol,
        source: SourceId,
        fields: QuoteFields,
        as_of: DateTime<Utc>,
    ) -> Self {
        let change = fields.current_price - fields.previous_close;
        let change_percent = percent_change(fields.current_price, fields.previous_close);
        Self {
            symbol,
            name: fields.name,
            source,
            current_price: fields.current_price,
            previous_close: fields.previous_close,
            open: fields.open,
            high: fields.high,
            low: fields.low,
            volume: fields.volume,
            change,
            change_percent,
            as_of,
            indicators: None,
        }
    }

    /// Percent change as f64 for threshold comparisons.
    pub fn change_percent_f64(&self) -> Option<f64> {
        self.change_percent.and_then(|p| p.to_f64())
    }

    pub fn is_up(&self) -> bool {
        self.change >= 0.0
    }
}

/// `(current - previous) / previous * 100` rounded to 2 dp.
///
/// Returns `None` for a non-positive previous close or a non-finite result.
pub fn percent_change(current: f64, previous: f64) -> Option<Decimal> {
    if previous.is_nan() || previous <= 0.0 || !current.is_finite() {
        return None;
    }
    round2((current - previous) / previous * 100.0)
}

/// Round a finite f64 to 2 dp.
pub fn round2(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value).map(|d| d.round_dp(2))
}
