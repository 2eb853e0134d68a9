//! Watchlist instruments, market classes and source identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// hq.sinajs.cn, GBK comma-delimited quotes
    Sina,
    /// qt.gtimg.cn, GBK tilde-delimited quotes
    Tencent,
    /// Yahoo Finance chart API (quotes and daily history)
    Yahoo,
    /// Eastmoney daily klines (history only)
    Eastmoney,
}

impl SourceId {
    pub const fn as_str(self) -> &'static str {
        match self {
            SourceId::Sina => "sina",
            SourceId::Tencent => "tencent",
            SourceId::Yahoo => "yahoo",
            SourceId::Eastmoney => "eastmoney",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source preference of a watched instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourcePreference {
    /// Route by symbol shape, with fallback.
    #[default]
    Auto,
    Sina,
    Tencent,
    Yahoo,
    /// Anything the config names that no adapter implements.
    #[serde(other)]
    Unsupported,
}

impl SourcePreference {
    /// The single adapter pinned by this preference, if any.
    pub fn pinned(self) -> Option<SourceId> {
        match self {
            SourcePreference::Sina => Some(SourceId::Sina),
            SourcePreference::Tencent => Some(SourceId::Tencent),
            SourcePreference::Yahoo => Some(SourceId::Yahoo),
            SourcePreference::Auto | SourcePreference::Unsupported => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SourcePreference::Auto => "auto",
            SourcePreference::Sina => "sina",
            SourcePreference::Tencent => "tencent",
            SourcePreference::Yahoo => "yahoo",
            SourcePreference::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for SourcePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Market class implied by a symbol's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketClass {
    Shanghai,
    Shenzhen,
    HongKong,
    /// Bare uppercase ticker such as `AAPL`.
    Us,
    Other,
}

impl MarketClass {
    /// Classify a raw market code.
    pub fn of(code: &str) -> Self {
        let prefix = code.get(..2).map(str::to_ascii_lowercase);
        match prefix.as_deref() {
            Some("sh") => return MarketClass::Shanghai,
            Some("sz") => return MarketClass::Shenzhen,
            Some("hk") => return MarketClass::HongKong,
            _ => {}
        }
        if !code.is_empty() && code.bytes().all(|b| b.is_ascii_uppercase()) {
            MarketClass::Us
        } else {
            MarketClass::Other
        }
    }

    /// Shanghai, Shenzhen and Hong Kong listings.
    pub fn is_domestic(self) -> bool {
        matches!(
            self,
            MarketClass::Shanghai | MarketClass::Shenzhen | MarketClass::HongKong
        )
    }
}

/// Opaque market identifier such as `sh600000` or `AAPL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn market(&self) -> MarketClass {
        MarketClass::of(&self.0)
    }

    /// Exchange code without the market prefix (`sh600000` -> `600000`).
    pub fn local_code(&self) -> &str {
        if self.market().is_domestic() {
            &self.0[2..]
        } else {
            &self.0
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// One watchlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedInstrument {
    pub symbol: Symbol,
    pub display_name: String,
    pub preferred_source: SourcePreference,
}

impl WatchedInstrument {
    pub fn new(
        symbol: impl Into<String>,
        display_name: impl Into<String>,
        preferred_source: SourcePreference,
    ) -> Self {
        Self {
            symbol: Symbol::new(symbol),
            display_name: display_name.into(),
            preferred_source,
        }
    }

    /// Display name, falling back to the symbol when none was configured.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            self.symbol.as_str()
        } else {
            &self.display_name
        }
    }
}
