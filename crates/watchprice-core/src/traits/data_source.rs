//! Upstream source trait definitions.

use crate::error::DataError;
use crate::types::{Candle, Quote, SourceId, Symbol};
use async_trait::async_trait;

/// Trait for real-time quote upstreams.
///
/// Each implementation owns exactly one upstream protocol. Implementations
/// never retry and never panic on malformed payloads: every failure is
/// reported as a [`DataError`] so the resolver can fall back.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current quote for a symbol.
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, DataError>;

    /// Get the source identifier.
    fn id(&self) -> SourceId;
}

/// Trait for daily OHLC history upstreams.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch recent daily candles.
    ///
    /// # Returns
    /// A vector of candles ordered from oldest to newest
    async fn fetch_history(&self, symbol: &Symbol) -> Result<Vec<Candle>, DataError>;

    /// Get the source identifier.
    fn id(&self) -> SourceId;
}
