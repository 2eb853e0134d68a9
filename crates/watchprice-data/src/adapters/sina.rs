//! Sina Finance real-time quotes (`hq.sinajs.cn`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;
use watchprice_core::error::DataError;
use watchprice_core::traits::QuoteSource;
use watchprice_core::types::{normalize_timestamp, Quote, QuoteFields, SourceId, Symbol};

use super::{number, quoted_payload};
use crate::http::{fetch_text, HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};

const BASE_URL: &str = "http://hq.sinajs.cn/list=";
const REFERER: &str = "http://finance.sina.com.cn";
const MIN_FIELDS: usize = 3;

/// Comma-delimited GBK feed:
/// `var hq_str_sh600000="name,open,prevClose,price,high,low,...,volume,...,date,time,..."`.
#[derive(Clone)]
pub struct SinaSource {
    http: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl SinaSource {
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

    fn request(&self, symbol: &Symbol) -> HttpRequest {
        HttpRequest::get(format!("{BASE_URL}{symbol}"))
            .with_header("Referer", REFERER)
            .with_charset("gbk")
            .with_timeout_ms(self.timeout_ms)
    }
}

/// Parse a decoded Sina payload.
pub(crate) fn parse_quote(
    symbol: &Symbol,
    payload: &str,
    now: DateTime<Utc>,
) -> Result<Quote, DataError> {
    let body = quoted_payload(payload)
        .ok_or_else(|| DataError::no_data(SourceId::Sina, symbol.as_str()))?;

    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() < MIN_FIELDS {
        return Err(DataError::parse(
            SourceId::Sina,
            format!("expected at least {MIN_FIELDS} fields, got {}", fields.len()),
        ));
    }
    let field = |i: usize| fields.get(i).copied();

    let as_of = match (field(30), field(31)) {
        (Some(date), Some(time)) => normalize_timestamp(Some(&format!("{date} {time}")), now),
        _ => now,
    };

    Ok(Quote::from_fields(
        symbol.clone(),
        SourceId::Sina,
        QuoteFields {
            name: fields[0].trim().to_string(),
            current_price: number(field(3)),
            previous_close: number(field(2)),
            open: number(field(1)),
            high: number(field(4)),
            low: number(field(5)),
            volume: number(field(8)),
        },
        as_of,
    ))
}

#[async_trait]
impl QuoteSource for SinaSource {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, DataError> {
        let payload = fetch_text(self.http.as_ref(), SourceId::Sina, self.request(symbol)).await?;
        let quote = parse_quote(symbol, &payload, Utc::now())?;
        debug!(symbol = %symbol, price = quote.current_price, "Sina quote parsed");
        Ok(quote)
    }

    fn id(&self) -> SourceId {
        SourceId::Sina
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::FakeHttpClient;
    use chrono::{Local, TimeZone};
    use rust_decimal_macros::dec;

    const PAYLOAD: &str = "var hq_str_sh600000=\"浦发银行,12.36,12.35,12.40,12.45,12.30,12.40,12.41,12345678,152345678,100,12.40,200,12.39,300,12.38,400,12.37,500,12.36,100,12.41,200,12.42,300,12.43,400,12.44,500,12.45,2024-01-02,15:00:00,00\";\n";

    #[test]
    fn test_parse_full_payload() {
        let quote = parse_quote(&Symbol::new("sh600000"), PAYLOAD, Utc::now()).unwrap();

        assert_eq!(quote.name, "浦发银行");
        assert_eq!(quote.current_price, 12.40);
        assert_eq!(quote.previous_close, 12.35);
        assert_eq!(quote.open, 12.36);
        assert_eq!(quote.high, 12.45);
        assert_eq!(quote.low, 12.30);
        assert_eq!(quote.volume, 12_345_678.0);
        assert_eq!(quote.change_percent, Some(dec!(0.40)));

        let expected = Local
            .with_ymd_and_hms(2024, 1, 2, 15, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(quote.as_of, expected);
    }

    #[test]
    fn test_short_payload_defaults_missing_fields() {
        let now = Utc::now();
        let quote = parse_quote(&Symbol::new("sh600000"), "x=\"PF,1.00,2.00,x\"", now).unwrap();
        assert_eq!(quote.current_price, 0.0);
        assert_eq!(quote.volume, 0.0);
        assert_eq!(quote.as_of, now);
    }

    #[test]
    fn test_malformed_payloads() {
        let symbol = Symbol::new("sh600000");
        assert!(matches!(
            parse_quote(&symbol, "var hq_str_sh600000=\"\";", Utc::now()),
            Err(DataError::NoData { .. })
        ));
        assert!(matches!(
            parse_quote(&symbol, "FAILED", Utc::now()),
            Err(DataError::NoData { .. })
        ));
        assert!(matches!(
            parse_quote(&symbol, "x=\"PF,1.0\"", Utc::now()),
            Err(DataError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_sends_referer_and_gbk() {
        let http = Arc::new(FakeHttpClient::new().respond("list=sh600000", PAYLOAD));
        let source = SinaSource::new(http.clone());

        let quote = source.fetch_quote(&Symbol::new("sh600000")).await.unwrap();
        assert_eq!(quote.source, SourceId::Sina);

        let seen = http.seen();
        assert_eq!(seen[0].url, "http://hq.sinajs.cn/list=sh600000");
        assert_eq!(seen[0].headers.get("referer").map(String::as_str), Some(REFERER));
        assert_eq!(seen[0].charset, Some("gbk"));
    }
}
