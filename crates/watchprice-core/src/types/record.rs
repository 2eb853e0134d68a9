//! Journal row written for every resolved quote.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Quote, Tick, WatchedInstrument};

/// Flat record persisted by a [`RecordSink`](crate::traits::RecordSink).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// RFC 3339 instant
    pub timestamp: String,
    pub symbol: String,
    pub display_name: String,
    /// Configured source preference (`auto`, `sina`, ...)
    pub source: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: Option<f64>,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub indicators_json: Option<String>,
}

impl PriceRecord {
    /// Build the journal row for a resolved quote.
    pub fn from_quote(instrument: &WatchedInstrument, quote: &Quote) -> Self {
        let display_name = if quote.name.is_empty() {
            instrument.label().to_string()
        } else {
            quote.name.clone()
        };
        let indicators_json = quote
            .indicators
            .as_ref()
            .and_then(|set| serde_json::to_string(set).ok());

        Self {
            timestamp: quote.as_of.to_rfc3339(),
            symbol: instrument.symbol.to_string(),
            display_name,
            source: instrument.preferred_source.to_string(),
            price: quote.current_price,
            change: quote.change,
            change_percent: quote.change_percent_f64(),
            high: quote.high,
            low: quote.low,
            volume: quote.volume,
            indicators_json,
        }
    }

    /// The record as a raw tick, `None` when its timestamp is unreadable.
    pub fn to_tick(&self) -> Option<Tick> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()?
            .with_timezone(&Utc)
            .timestamp_millis();
        Some(Tick {
            timestamp,
            price: Some(self.price).filter(|p| p.is_finite()),
            high: Some(self.high).filter(|p| p.is_finite()),
            low: Some(self.low).filter(|p| p.is_finite()),
            volume: Some(self.volume).filter(|v| v.is_finite()),
        })
    }
}
