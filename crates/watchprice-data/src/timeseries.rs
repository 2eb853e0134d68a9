//! Aggregation of raw ticks into fixed-width OHLC buckets.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use watchprice_core::types::Tick;

/// One aggregated time bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    /// Bucket start
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub avg_price: f64,
    /// Session volume traded inside the bucket
    pub volume: Option<f64>,
    /// `(high - low) / low` in percent
    pub amplitude: Option<f64>,
    /// Close relative to the previous emitted bucket's close, in percent
    pub change_percent: Option<f64>,
}

#[derive(Debug, Default)]
struct Accumulator {
    open: Option<f64>,
    high: f64,
    low: f64,
    close: f64,
    sum_price: f64,
    count: usize,
    first_volume: Option<f64>,
    last_volume: Option<f64>,
}

impl Accumulator {
    fn push(&mut self, tick: &Tick) {
        if let Some(price) = tick.price.filter(|p| p.is_finite()) {
            if self.open.is_none() {
                self.open = Some(price);
                self.high = price;
                self.low = price;
            }
            self.high = self.high.max(price);
            self.low = self.low.min(price);
            self.close = price;
            self.sum_price += price;
            self.count += 1;
        }
        if let Some(volume) = tick.volume.filter(|v| v.is_finite()) {
            self.first_volume.get_or_insert(volume);
            self.last_volume = Some(volume);
        }
    }
}

/// Buckets ticks into `interval_minutes`-wide candles, keeping the most recent `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeseriesAggregator {
    interval_minutes: u32,
    limit: usize,
}

impl TimeseriesAggregator {
    pub const DEFAULT_LIMIT: usize = 240;

    /// Both arguments are clamped to at least 1.
    pub fn new(interval_minutes: u32, limit: usize) -> Self {
        Self {
            interval_minutes: interval_minutes.max(1),
            limit: limit.max(1),
        }
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn aggregate(&self, ticks: &[Tick]) -> Vec<Bucket> {
        let bucket_ms = i64::from(self.interval_minutes) * 60_000;

        let mut sorted: Vec<&Tick> = ticks.iter().collect();
        sorted.sort_by_key(|t| t.timestamp);

        let mut buckets: BTreeMap<i64, Accumulator> = BTreeMap::new();
        for tick in sorted {
            let start = tick.timestamp.div_euclid(bucket_ms) * bucket_ms;
            buckets.entry(start).or_default().push(tick);
        }

        let priced: Vec<(i64, Accumulator)> = buckets
            .into_iter()
            .filter(|(_, acc)| acc.open.is_some())
            .collect();
        let skip = priced.len().saturating_sub(self.limit);

        let mut prev_close: Option<f64> = None;
        priced
            .into_iter()
            .skip(skip)
            .filter_map(|(start, acc)| {
                let open = acc.open?;
                let volume = acc
                    .first_volume
                    .zip(acc.last_volume)
                    .map(|(first, last)| (last - first).max(0.0));
                let amplitude = (acc.low != 0.0).then(|| round2((acc.high - acc.low) / acc.low * 100.0));
                let change_percent = prev_close
                    .filter(|prev| *prev != 0.0)
                    .map(|prev| round2((acc.close - prev) / prev * 100.0));
                prev_close = Some(acc.close);

                Some(Bucket {
                    timestamp: DateTime::from_timestamp_millis(start)?,
                    open,
                    high: acc.high,
                    low: acc.low,
                    close: acc.close,
                    avg_price: round2(acc.sum_price / acc.count as f64),
                    volume,
                    amplitude,
                    change_percent,
                })
            })
            .collect()
    }
}

impl Default for TimeseriesAggregator {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
