//! Eastmoney daily klines for Shanghai, Shenzhen and Hong Kong listings.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use watchprice_core::error::DataError;
use watchprice_core::traits::HistorySource;
use watchprice_core::types::{parse_timestamp, Candle, MarketClass, SourceId, Symbol};

use super::number;
use crate::http::{fetch_text, HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};

const KLINE_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";

/// Daily bars requested per fetch.
pub const KLINE_LIMIT: usize = 120;

#[derive(Debug, Deserialize)]
struct KlineEnvelope {
    data: Option<KlineData>,
}

#[derive(Debug, Deserialize)]
struct KlineData {
    #[serde(default)]
    klines: Vec<String>,
}

/// `secid` market prefix: `1.` Shanghai, `0.` Shenzhen, `2.` Hong Kong.
fn secid(symbol: &Symbol) -> Option<String> {
    let market = match symbol.market() {
        MarketClass::Shanghai => 1,
        MarketClass::Shenzhen => 0,
        MarketClass::HongKong => 2,
        MarketClass::Us | MarketClass::Other => return None,
    };
    Some(format!("{market}.{}", symbol.local_code()))
}

/// Rows are `date,open,close,high,low,volume`; dates are local midnights.
pub(crate) fn parse_history(symbol: &Symbol, payload: &str) -> Result<Vec<Candle>, DataError> {
    let envelope: KlineEnvelope = serde_json::from_str(payload)
        .map_err(|e| DataError::parse(SourceId::Eastmoney, e.to_string()))?;
    let rows = envelope.data.map(|d| d.klines).unwrap_or_default();

    let candles: Vec<Candle> = rows
        .iter()
        .filter_map(|row| {
            let cols: Vec<&str> = row.split(',').collect();
            let time = parse_timestamp(cols.first()?)?.timestamp_millis();
            let close: f64 = cols.get(2)?.trim().parse().ok()?;
            let price = |i: usize| {
                cols.get(i)
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .unwrap_or(f64::NAN)
            };
            Some(Candle::new(
                time,
                price(1),
                price(3),
                price(4),
                close,
                number(cols.get(5).copied()),
            ))
        })
        .filter(|c| c.close.is_finite())
        .collect();

    if candles.is_empty() {
        return Err(DataError::no_data(SourceId::Eastmoney, symbol.as_str()));
    }
    Ok(candles)
}

#[derive(Clone)]
pub struct EastmoneySource {
    http: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl EastmoneySource {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

#[async_trait]
impl HistorySource for EastmoneySource {
    async fn fetch_history(&self, symbol: &Symbol) -> Result<Vec<Candle>, DataError> {
        let secid = secid(symbol).ok_or_else(|| DataError::Unsupported {
            source_id: SourceId::Eastmoney,
            symbol: symbol.to_string(),
        })?;
        let url = format!(
            "{KLINE_URL}?secid={secid}&fields1=f1&fields2=f51,f52,f53,f54,f55,f56\
             &klt=101&fqt=1&beg=0&end=20500000&lmt={KLINE_LIMIT}"
        );
        let request = HttpRequest::get(url).with_timeout_ms(self.timeout_ms);
        let payload = fetch_text(self.http.as_ref(), SourceId::Eastmoney, request).await?;
        parse_history(symbol, &payload)
    }

    fn id(&self) -> SourceId {
        SourceId::Eastmoney
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeHttpClient;

    const PAYLOAD: &str = r#"{"rc":0,"data":{"code":"600000","klines":[
        "2024-01-02,7.01,7.05,7.08,6.98,412345",
        "2024-01-03,7.05,abc,7.10,7.00,300000",
        "2024-01-04,7.06,7.12,7.15,7.04,398765"]}}"#;

    #[test]
    fn test_secid() {
        assert_eq!(secid(&Symbol::new("sh600000")).as_deref(), Some("1.600000"));
        assert_eq!(secid(&Symbol::new("sz000001")).as_deref(), Some("0.000001"));
        assert_eq!(secid(&Symbol::new("hk00700")).as_deref(), Some("2.00700"));
        assert_eq!(secid(&Symbol::new("AAPL")), None);
    }

    #[test]
    fn test_parse_rows() {
        let candles = parse_history(&Symbol::new("sh600000"), PAYLOAD).unwrap();

        assert_eq!(candles.len(), 2);
        let first = candles[0];
        assert_eq!(first.open, 7.01);
        assert_eq!(first.close, 7.05);
        assert_eq!(first.high, 7.08);
        assert_eq!(first.low, 6.98);
        assert_eq!(first.volume, 412_345.0);
        assert!(candles[1].time > first.time);
    }

    #[test]
    fn test_null_data_is_no_data() {
        let result = parse_history(&Symbol::new("sh600000"), r#"{"rc":0,"data":null}"#);
        assert!(matches!(result, Err(DataError::NoData { .. })));
    }

    #[tokio::test]
    async fn test_us_symbol_is_unsupported() {
        let http = Arc::new(FakeHttpClient::new());
        let source = EastmoneySource::new(http.clone());

        let result = source.fetch_history(&Symbol::new("AAPL")).await;
        assert!(matches!(result, Err(DataError::Unsupported { .. })));
        assert!(http.seen().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_builds_kline_query() {
        let http = Arc::new(FakeHttpClient::new().respond("secid=1.600000", PAYLOAD));
        let source = EastmoneySource::new(http.clone());

        let candles = source.fetch_history(&Symbol::new("sh600000")).await.unwrap();
        assert_eq!(candles.len(), 2);
        let url = &http.seen()[0].url;
        assert!(url.contains("klt=101"));
        assert!(url.contains("lmt=120"));
    }
}
