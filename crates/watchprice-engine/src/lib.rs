//! Quote resolution and the trading-hours scheduler.
//!
//! - [`QuoteResolver`] routes each watched instrument to its quote sources,
//!   falls back in order and attaches indicators from cached history
//! - [`calendar`] answers whether a trading window is open and how long
//!   until the next one
//! - [`TradingScheduler`] runs update cycles while a window is open and
//!   follows configuration reloads

pub mod calendar;
mod resolver;
mod scheduler;

pub use calendar::{is_trading_open, millis_until_next_window};
pub use resolver::{source_chain, QuoteResolver};
pub use scheduler::{Clock, MarketState, SystemClock, TickReport, TradingScheduler};
