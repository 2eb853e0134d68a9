//! Tencent Finance real-time quotes (`qt.gtimg.cn`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;
use watchprice_core::error::DataError;
use watchprice_core::traits::QuoteSource;
use watchprice_core::types::{normalize_timestamp, Quote, QuoteFields, SourceId, Symbol};

use super::{number, quoted_payload};
use crate::http::{fetch_text, HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};

const BASE_URL: &str = "https://qt.gtimg.cn/q=";
const MIN_FIELDS: usize = 4;

/// Tilde-delimited GBK feed:
/// `v_sh600000="1~name~code~price~prevClose~open~volume~...~time(30)~...~high(33)~low(34)..."`.
#[derive(Clone)]
pub struct TencentSource {
    http: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl TencentSource {
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

pub(crate) fn parse_quote(
    symbol: &Symbol,
    payload: &str,
    now: DateTime<Utc>,
) -> Result<Quote, DataError> {
    let body = quoted_payload(payload)
        .ok_or_else(|| DataError::no_data(SourceId::Tencent, symbol.as_str()))?;

    let fields: Vec<&str> = body.split('~').collect();
    if fields.len() < MIN_FIELDS {
        return Err(DataError::parse(
            SourceId::Tencent,
            format!("expected at least {MIN_FIELDS} fields, got {}", fields.len()),
        ));
    }
    let field = |i: usize| fields.get(i).copied();

    Ok(Quote::from_fields(
        symbol.clone(),
        SourceId::Tencent,
        QuoteFields {
            name: fields[1].trim().to_string(),
            current_price: number(field(3)),
            previous_close: number(field(4)),
            open: number(field(5)),
            high: number(field(33)),
            low: number(field(34)),
            volume: number(field(6)),
        },
        normalize_timestamp(field(30), now),
    ))
}

#[async_trait]
impl QuoteSource for TencentSource {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, DataError> {
        let request = HttpRequest::get(format!("{BASE_URL}{symbol}"))
            .with_charset("gbk")
            .with_timeout_ms(self.timeout_ms);
        let payload = fetch_text(self.http.as_ref(), SourceId::Tencent, request).await?;
        let quote = parse_quote(symbol, &payload, Utc::now())?;
        debug!(symbol = %symbol, price = quote.current_price, "Tencent quote parsed");
        Ok(quote)
    }

    fn id(&self) -> SourceId {
        SourceId::Tencent
    }
}
