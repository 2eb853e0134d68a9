//! Core data types for the watchprice pipeline.

mod candle;
mod indicators;
mod instrument;
mod quote;
mod record;
mod timestamp;
mod window;

pub use candle::{hlc_columns, Candle, Tick};
pub use indicators::{IndicatorSet, KdjReading, MacdReading, RsiReading, TrendBias, TrendReading, Zone};
pub use instrument::{MarketClass, SourceId, SourcePreference, Symbol, WatchedInstrument};
pub use quote::{percent_change, round2, Quote, QuoteFields};
pub use record::PriceRecord;
pub use timestamp::{normalize_timestamp, parse_timestamp};
pub use window::{format_minute_of_day, parse_minute_of_day, TradingWindow, WatchConfig, MINUTES_PER_DAY};
