//! Multi-source quote resolution with fallback and indicator enrichment.

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use watchprice_core::error::DataError;
use watchprice_core::traits::QuoteSource;
use watchprice_core::types::{MarketClass, Quote, SourceId, SourcePreference, Symbol, WatchedInstrument};
use watchprice_data::{
    EastmoneySource, HistoryCache, HttpClient, SinaSource, TencentSource, YahooSource,
};
use watchprice_indicators::IndicatorEngine;

/// Ordered adapters to try for `symbol`; the first success wins.
///
/// `auto` routes mainland listings to Tencent then Sina, bare uppercase
/// tickers to Yahoo and everything else to Tencent. An explicit preference
/// pins a single adapter; an unsupported one yields no route at all.
pub fn source_chain(symbol: &Symbol, preference: SourcePreference) -> Vec<SourceId> {
    match preference {
        SourcePreference::Auto => match symbol.market() {
            MarketClass::Shanghai | MarketClass::Shenzhen => vec![SourceId::Tencent, SourceId::Sina],
            MarketClass::Us => vec![SourceId::Yahoo],
            MarketClass::HongKong | MarketClass::Other => vec![SourceId::Tencent],
        },
        pinned => pinned.pinned().into_iter().collect(),
    }
}

/// Resolves watched instruments to quotes.
pub struct QuoteResolver {
    sources: HashMap<SourceId, Arc<dyn QuoteSource>>,
    history: Option<HistoryCache>,
    indicators: IndicatorEngine,
    timeout: Duration,
}

impl QuoteResolver {
    /// Upper bound on a single adapter call.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);

    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            history: None,
            indicators: IndicatorEngine::new(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sina, Tencent and Yahoo quotes; Eastmoney then Yahoo history.
    pub fn standard(http: Arc<dyn HttpClient>) -> Self {
        let yahoo = Arc::new(YahooSource::new(http.clone()));
        let history = HistoryCache::new(yahoo.clone())
            .with_domestic(Arc::new(EastmoneySource::new(http.clone())));

        Self::new()
            .with_source(Arc::new(SinaSource::new(http.clone())))
            .with_source(Arc::new(TencentSource::new(http)))
            .with_source(yahoo)
            .with_history(history)
    }

    /// Register an adapter under its own id, replacing any previous one.
    pub fn with_source(mut self, source: Arc<dyn QuoteSource>) -> Self {
        self.sources.insert(source.id(), source);
        self
    }

    pub fn with_history(mut self, history: HistoryCache) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve one instrument through its source chain.
    pub async fn resolve(&self, instrument: &WatchedInstrument) -> Result<Quote, DataError> {
        let symbol = &instrument.symbol;
        let chain = source_chain(symbol, instrument.preferred_source);
        debug!(symbol = %symbol, ?chain, "Resolving quote");

        let mut last_error = None;
        for source_id in chain {
            let Some(source) = self.sources.get(&source_id) else {
                debug!(symbol = %symbol, source = %source_id, "Source not registered");
                continue;
            };

            match self.fetch(source.as_ref(), symbol).await {
                Ok(mut quote) => {
                    self.attach_indicators(&mut quote).await;
                    return Ok(quote);
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Quote source unavailable");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::NoRoute(symbol.to_string())))
    }

    /// Resolve a batch concurrently; results keep the input order.
    pub async fn resolve_all(
        &self,
        instruments: &[WatchedInstrument],
    ) -> Vec<Result<Quote, DataError>> {
        join_all(instruments.iter().map(|instrument| self.resolve(instrument))).await
    }

    async fn fetch(&self, source: &dyn QuoteSource, symbol: &Symbol) -> Result<Quote, DataError> {
        match tokio::time::timeout(self.timeout, source.fetch_quote(symbol)).await {
            Ok(result) => result,
            Err(_) => Err(DataError::Timeout {
                source_id: source.id(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    /// Best effort: any failure leaves `quote.indicators` empty.
    async fn attach_indicators(&self, quote: &mut Quote) {
        let Some(history) = &self.history else {
            return;
        };
        match history.get_or_fetch(&quote.symbol).await {
            Ok(candles) => quote.indicators = self.indicators.compute(&candles),
            Err(e) => debug!(symbol = %quote.symbol, error = %e, "No history for indicators"),
        }
    }
}

impl Default for QuoteResolver {
    fn default() -> Self {
        Self::new()
    }
}
