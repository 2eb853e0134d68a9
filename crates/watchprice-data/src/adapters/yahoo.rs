//! Yahoo Finance chart API: intraday quotes and daily history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use watchprice_core::error::DataError;
use watchprice_core::traits::{HistorySource, QuoteSource};
use watchprice_core::types::{Candle, Quote, QuoteFields, SourceId, Symbol};

use crate::http::{fetch_text, HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart/";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Option<ChartIndicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    regular_market_open: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<f64>,
    regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Zero, missing and non-finite values all count as absent.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

fn first_result(symbol: &Symbol, payload: &str) -> Result<ChartResult, DataError> {
    let envelope: ChartEnvelope = serde_json::from_str(payload)
        .map_err(|e| DataError::parse(SourceId::Yahoo, e.to_string()))?;
    envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| DataError::no_data(SourceId::Yahoo, symbol.as_str()))
}

/// Quote from `chart.result[0].meta`.
pub(crate) fn parse_quote(
    symbol: &Symbol,
    payload: &str,
    now: DateTime<Utc>,
) -> Result<Quote, DataError> {
    let meta = first_result(symbol, payload)?.meta;

    let previous_close = meta
        .previous_close
        .or(meta.chart_previous_close)
        .filter(|v| v.is_finite())
        .ok_or_else(|| DataError::parse(SourceId::Yahoo, "missing previous close"))?;
    let current_price = present(meta.regular_market_price).unwrap_or(previous_close);
    let as_of = meta
        .regular_market_time
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(now);

    Ok(Quote::from_fields(
        symbol.clone(),
        SourceId::Yahoo,
        QuoteFields {
            name: meta.short_name.unwrap_or_else(|| symbol.to_string()),
            current_price,
            previous_close,
            open: present(meta.regular_market_open).unwrap_or(previous_close),
            high: present(meta.regular_market_day_high).unwrap_or(current_price),
            low: present(meta.regular_market_day_low).unwrap_or(current_price),
            volume: present(meta.regular_market_volume).unwrap_or(0.0),
        },
        as_of,
    ))
}

/// Daily candles from the timestamp and `indicators.quote[0]` columns.
/// Rows without a usable close are dropped.
pub(crate) fn parse_history(symbol: &Symbol, payload: &str) -> Result<Vec<Candle>, DataError> {
    let result = first_result(symbol, payload)?;
    let columns = result
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .unwrap_or_default();
    let at = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten().unwrap_or(f64::NAN);

    let candles: Vec<Candle> = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &secs)| {
            let close = present(columns.close.get(i).copied().flatten())?;
            Some(Candle::new(
                secs * 1000,
                at(&columns.open, i),
                at(&columns.high, i),
                at(&columns.low, i),
                close,
                columns.volume.get(i).copied().flatten().unwrap_or(0.0),
            ))
        })
        .collect();

    if candles.is_empty() {
        return Err(DataError::no_data(SourceId::Yahoo, symbol.as_str()));
    }
    Ok(candles)
}

/// Serves both US quotes and the fallback daily history for every market.
#[derive(Clone)]
pub struct YahooSource {
    http: Arc<dyn HttpClient>,
    timeout_ms: u64,
    history_range: String,
}

impl YahooSource {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            history_range: "3mo".to_string(),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn chart(&self, symbol: &Symbol, interval: &str, range: &str) -> HttpRequest {
        HttpRequest::get(format!(
            "{CHART_URL}{symbol}?interval={interval}&range={range}"
        ))
        .with_timeout_ms(self.timeout_ms)
    }
}

#[async_trait]
impl QuoteSource for YahooSource {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, DataError> {
        let request = self.chart(symbol, "1m", "1d");
        let payload = fetch_text(self.http.as_ref(), SourceId::Yahoo, request).await?;
        let quote = parse_quote(symbol, &payload, Utc::now())?;
        debug!(symbol = %symbol, price = quote.current_price, "Yahoo quote parsed");
        Ok(quote)
    }

    fn id(&self) -> SourceId {
        SourceId::Yahoo
    }
}

#[async_trait]
impl HistorySource for YahooSource {
    async fn fetch_history(&self, symbol: &Symbol) -> Result<Vec<Candle>, DataError> {
        let request = self.chart(symbol, "1d", &self.history_range);
        let payload = fetch_text(self.http.as_ref(), SourceId::Yahoo, request).await?;
        parse_history(symbol, &payload)
    }

    fn id(&self) -> SourceId {
        SourceId::Yahoo
    }
}
