//! HTTP transport shared by the quote and history adapters.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use watchprice_core::error::DataError;
use watchprice_core::types::SourceId;

/// Per-request timeout applied when an adapter does not set one.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// A GET request issued by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
    /// Fallback body charset, used when the response's `Content-Type` names none.
    pub charset: Option<&'static str>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            charset: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Decode the body as `charset` (e.g. `"gbk"`) unless the response
    /// declares its own.
    pub fn with_charset(mut self, charset: &'static str) -> Self {
        self.charset = Some(charset);
        self
    }
}

/// Decoded response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

impl HttpError {
    /// Attribute the failure to an upstream.
    pub fn into_data_error(self, source_id: SourceId) -> DataError {
        match self {
            HttpError::Timeout(timeout_ms) => DataError::Timeout {
                source_id,
                timeout_ms,
            },
            HttpError::Body(message) => DataError::Parse { source_id, message },
            other => DataError::Connection {
                source_id,
                message: other.to_string(),
            },
        }
    }
}

/// Transport contract used by every adapter; faked in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Issue `request` on behalf of `source_id` and return the body of a 2xx response.
pub async fn fetch_text(
    client: &dyn HttpClient,
    source_id: SourceId,
    request: HttpRequest,
) -> Result<String, DataError> {
    let response = client
        .execute(request)
        .await
        .map_err(|e| e.into_data_error(source_id))?;
    if !response.is_success() {
        return Err(DataError::Status {
            source_id,
            status: response.status,
        });
    }
    Ok(response.body)
}

/// Production transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(concat!("watchprice/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self
            .client
            .get(&request.url)
            .timeout(Duration::from_millis(request.timeout_ms));
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(request.timeout_ms)
            } else if e.is_connect() {
                HttpError::Connect(e.to_string())
            } else {
                HttpError::Request(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = match request.charset {
            Some(charset) => response.text_with_charset(charset).await,
            None => response.text().await,
        }
        .map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(request.timeout_ms)
            } else {
                HttpError::Body(e.to_string())
            }
        })?;

        Ok(HttpResponse { status, body })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeHttpClient;
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::get("http://hq.sinajs.cn/list=sh600000")
            .with_header("Referer", "http://finance.sina.com.cn")
            .with_charset("gbk");

        assert_eq!(request.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(
            request.headers.get("referer").map(String::as_str),
            Some("http://finance.sina.com.cn")
        );
        assert_eq!(request.charset, Some("gbk"));
    }

    #[tokio::test]
    async fn test_fetch_text_maps_failures() {
        let client = FakeHttpClient::new()
            .respond("/ok", "payload")
            .respond_status("/missing", 404)
            .fail("/slow", HttpError::Timeout(5_000));

        let body = fetch_text(&client, SourceId::Sina, HttpRequest::get("http://x/ok")).await;
        assert_eq!(body.unwrap(), "payload");

        let status = fetch_text(&client, SourceId::Sina, HttpRequest::get("http://x/missing")).await;
        assert_eq!(
            status,
            Err(DataError::Status {
                source_id: SourceId::Sina,
                status: 404
            })
        );

        let timeout = fetch_text(&client, SourceId::Yahoo, HttpRequest::get("http://x/slow")).await;
        assert_eq!(
            timeout,
            Err(DataError::Timeout {
                source_id: SourceId::Yahoo,
                timeout_ms: 5_000
            })
        );
    }
}
