//! Technical indicators for the watchprice quote pipeline.
//!
//! - Moving averages (SMA, EMA)
//! - Momentum indicators (RSI, MACD, KDJ)
//! - Short-term trend deviation
//! - [`IndicatorEngine`], which turns a daily candle series into the
//!   [`IndicatorSet`](watchprice_core::types::IndicatorSet) attached to quotes

pub mod engine;
pub mod momentum;
pub mod moving_average;
pub mod trend;

pub use engine::IndicatorEngine;
pub use momentum::{Kdj, KdjOutput, Macd, MacdOutput, Rsi};
pub use moving_average::{Ema, Sma};
pub use trend::TrendDeviation;
