//! TTL-bounded cache of daily history, fronting the history adapters.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use watchprice_core::error::DataError;
use watchprice_core::traits::HistorySource;
use watchprice_core::types::{Candle, Symbol};

#[derive(Debug, Clone)]
struct CacheEntry {
    candles: Arc<Vec<Candle>>,
    fetched_at: Instant,
}

/// Per-symbol memo of daily candles.
///
/// Domestic symbols (`sh`/`sz`/`hk`) try the domestic source first and fall
/// back to the global one; everything else goes straight to the global source.
/// Failures and empty series are never cached. Concurrent misses for the same
/// symbol each fetch.
#[derive(Clone)]
pub struct HistoryCache {
    entries: Arc<RwLock<HashMap<Symbol, CacheEntry>>>,
    ttl: Duration,
    domestic: Option<Arc<dyn HistorySource>>,
    global: Arc<dyn HistorySource>,
}

impl HistoryCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

    pub fn new(global: Arc<dyn HistorySource>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: Self::DEFAULT_TTL,
            domestic: None,
            global,
        }
    }

    pub fn with_domestic(mut self, source: Arc<dyn HistorySource>) -> Self {
        self.domestic = Some(source);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Cached candles when fresh, otherwise fetch and store them.
    pub async fn get_or_fetch(&self, symbol: &Symbol) -> Result<Arc<Vec<Candle>>, DataError> {
        if let Some(candles) = self.lookup(symbol).await {
            debug!(symbol = %symbol, "History cache hit");
            return Ok(candles);
        }

        let candles = Arc::new(self.fetch(symbol).await?);
        self.entries.write().await.insert(
            symbol.clone(),
            CacheEntry {
                candles: candles.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(candles)
    }

    /// Fresh entry for `symbol`; an expired one is evicted.
    async fn lookup(&self, symbol: &Symbol) -> Option<Arc<Vec<Candle>>> {
        {
            let entries = self.entries.read().await;
            match entries.get(symbol) {
                None => return None,
                Some(entry) if entry.fetched_at.elapsed() <= self.ttl => {
                    return Some(entry.candles.clone())
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(symbol)
            .is_some_and(|entry| entry.fetched_at.elapsed() > self.ttl)
        {
            entries.remove(symbol);
        }
        None
    }

    async fn fetch(&self, symbol: &Symbol) -> Result<Vec<Candle>, DataError> {
        if let Some(domestic) = self.domestic.as_ref().filter(|_| symbol.market().is_domestic()) {
            match domestic.fetch_history(symbol).await {
                Ok(candles) if !candles.is_empty() => return Ok(candles),
                Ok(_) => debug!(symbol = %symbol, source = %domestic.id(), "Empty history, falling back"),
                Err(e) => warn!(symbol = %symbol, error = %e, "History fetch failed, falling back"),
            }
        }

        let candles = self.global.fetch_history(symbol).await?;
        if candles.is_empty() {
            return Err(DataError::no_data(self.global.id(), symbol.as_str()));
        }
        Ok(candles)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use watchprice_core::types::SourceId;

    struct FakeHistory {
        id: SourceId,
        candles: Result<Vec<Candle>, DataError>,
        calls: AtomicUsize,
    }

    impl FakeHistory {
        fn returning(id: SourceId, n: usize) -> Arc<Self> {
            let candles = (0..n)
                .map(|i| Candle::new(i as i64, 1.0, 1.0, 1.0, 1.0, 0.0))
                .collect();
            Arc::new(Self {
                id,
                candles: Ok(candles),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(id: SourceId) -> Arc<Self> {
            Arc::new(Self {
                id,
                candles: Err(DataError::no_data(id, "x")),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HistorySource for FakeHistory {
        async fn fetch_history(&self, _symbol: &Symbol) -> Result<Vec<Candle>, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.candles.clone()
        }

        fn id(&self) -> SourceId {
            self.id
        }
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let yahoo = FakeHistory::returning(SourceId::Yahoo, 40);
        let cache = HistoryCache::new(yahoo.clone());
        let symbol = Symbol::new("AAPL");

        assert_eq!(cache.get_or_fetch(&symbol).await.unwrap().len(), 40);
        assert_eq!(cache.get_or_fetch(&symbol).await.unwrap().len(), 40);
        assert_eq!(yahoo.calls(), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let yahoo = FakeHistory::returning(SourceId::Yahoo, 5);
        let cache = HistoryCache::new(yahoo.clone()).with_ttl(Duration::from_millis(20));
        let symbol = Symbol::new("AAPL");

        cache.get_or_fetch(&symbol).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        cache.get_or_fetch(&symbol).await.unwrap();
        assert_eq!(yahoo.calls(), 2);
    }

    #[tokio::test]
    async fn test_domestic_routing_and_fallback() {
        let eastmoney = FakeHistory::failing(SourceId::Eastmoney);
        let yahoo = FakeHistory::returning(SourceId::Yahoo, 3);
        let cache = HistoryCache::new(yahoo.clone()).with_domestic(eastmoney.clone());

        cache.get_or_fetch(&Symbol::new("sh600000")).await.unwrap();
        assert_eq!(eastmoney.calls(), 1);
        assert_eq!(yahoo.calls(), 1);

        // US symbols skip the domestic source entirely.
        cache.get_or_fetch(&Symbol::new("AAPL")).await.unwrap();
        assert_eq!(eastmoney.calls(), 1);
        assert_eq!(yahoo.calls(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let yahoo = FakeHistory::returning(SourceId::Yahoo, 0);
        let cache = HistoryCache::new(yahoo.clone());
        let symbol = Symbol::new("AAPL");

        assert!(cache.get_or_fetch(&symbol).await.is_err());
        assert!(cache.get_or_fetch(&symbol).await.is_err());
        assert_eq!(yahoo.calls(), 2);
        assert!(cache.is_empty().await);
    }
}
