//! Core types and traits for the watchprice pipeline.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Quote, Candle, Tick)
//! - Watchlist and runtime configuration types
//! - Indicator readings attached to quotes
//! - Core traits for quote/history sources, indicators and output sinks

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
