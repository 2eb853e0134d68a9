//! Configuration file schema.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;
use watchprice_core::types::{SourcePreference, TradingWindow, WatchConfig, WatchedInstrument};

/// On-disk configuration (`config.json` or `config.toml`).
///
/// Keys are camelCase; the all-lowercase spellings produced by the loader
/// and by `WATCHPRICE__` environment overrides are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(default)]
    pub stocks: Vec<StockEntry>,

    /// Milliseconds between update cycles while a market window is open.
    #[serde(default = "default_update_interval", alias = "updateinterval")]
    pub update_interval: u64,

    #[serde(default = "default_alert_threshold", alias = "alertthresholdpercent")]
    pub alert_threshold_percent: f64,

    #[serde(default = "default_market_windows", alias = "marketwindows")]
    pub market_windows: Vec<WindowEntry>,
}

/// One watched instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEntry {
    #[serde(default)]
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub source: SourcePreference,
}

/// One daily trading window, `"HH:MM"` local time, end exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowEntry {
    #[serde(default)]
    pub label: String,
    pub start: String,
    pub end: String,
}

fn default_update_interval() -> u64 {
    WatchConfig::DEFAULT_UPDATE_INTERVAL.as_millis() as u64
}

fn default_alert_threshold() -> f64 {
    WatchConfig::DEFAULT_ALERT_THRESHOLD_PERCENT
}

fn default_market_windows() -> Vec<WindowEntry> {
    vec![
        WindowEntry {
            label: "morning".to_string(),
            start: "09:30".to_string(),
            end: "11:30".to_string(),
        },
        WindowEntry {
            label: "afternoon".to_string(),
            start: "13:00".to_string(),
            end: "15:00".to_string(),
        },
    ]
}

impl Default for ConfigFile {
    /// The file written on first start.
    fn default() -> Self {
        Self {
            stocks: vec![
                StockEntry {
                    name: "浦发银行".to_string(),
                    code: "sh600000".to_string(),
                    source: SourcePreference::Auto,
                },
                StockEntry {
                    name: "平安银行".to_string(),
                    code: "sz000001".to_string(),
                    source: SourcePreference::Auto,
                },
            ],
            update_interval: default_update_interval(),
            alert_threshold_percent: default_alert_threshold(),
            market_windows: default_market_windows(),
        }
    }
}

impl ConfigFile {
    /// Runtime configuration. Windows whose bounds do not parse are dropped;
    /// a zero update interval means the default.
    pub fn to_watch_config(&self) -> WatchConfig {
        let instruments = self
            .stocks
            .iter()
            .filter(|s| !s.code.trim().is_empty())
            .map(|s| WatchedInstrument::new(s.code.trim(), s.name.clone(), s.source))
            .collect();

        let trading_windows = self
            .market_windows
            .iter()
            .filter_map(|w| {
                let window = TradingWindow::parse(w.label.clone(), &w.start, &w.end);
                if window.is_none() {
                    warn!(label = %w.label, start = %w.start, end = %w.end, "Ignoring unparseable market window");
                }
                window
            })
            .collect();

        let update_interval = if self.update_interval == 0 {
            WatchConfig::DEFAULT_UPDATE_INTERVAL
        } else {
            Duration::from_millis(self.update_interval)
        };

        WatchConfig {
            instruments,
            update_interval,
            alert_threshold_percent: self.alert_threshold_percent,
            trading_windows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let file: ConfigFile =
            serde_json::from_str(r#"{"stocks":[{"code":"AAPL","source":"yahoo"}]}"#).unwrap();

        assert_eq!(file.update_interval, 5_000);
        assert_eq!(file.alert_threshold_percent, 1.0);
        assert_eq!(file.market_windows.len(), 2);
        assert_eq!(file.stocks[0].source, SourcePreference::Yahoo);
        assert_eq!(file.stocks[0].name, "");
    }

    #[test]
    fn test_lowercase_keys_are_accepted() {
        let file: ConfigFile = serde_json::from_str(
            r#"{"updateinterval":2000,"alertthresholdpercent":0.5,"marketwindows":[]}"#,
        )
        .unwrap();
        assert_eq!(file.update_interval, 2_000);
        assert_eq!(file.alert_threshold_percent, 0.5);
        assert!(file.market_windows.is_empty());
    }

    #[test]
    fn test_unknown_source_is_unsupported() {
        let entry: StockEntry =
            serde_json::from_str(r#"{"name":"X","code":"sh600000","source":"bloomberg"}"#).unwrap();
        assert_eq!(entry.source, SourcePreference::Unsupported);
    }

    #[test]
    fn test_to_watch_config() {
        let mut file = ConfigFile::default();
        file.market_windows.push(WindowEntry {
            label: "broken".to_string(),
            start: "9am".to_string(),
            end: "10:00".to_string(),
        });
        file.update_interval = 0;

        let config = file.to_watch_config();
        assert_eq!(config.instruments.len(), 2);
        assert_eq!(config.instruments[0].symbol.as_str(), "sh600000");
        assert_eq!(config.update_interval, WatchConfig::DEFAULT_UPDATE_INTERVAL);
        assert_eq!(config.trading_windows, WatchConfig::default_windows());
    }

    #[test]
    fn test_default_serializes_camel_case() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(json.contains("\"updateInterval\":5000"));
        assert!(json.contains("\"alertThresholdPercent\":1.0"));
        assert!(json.contains("\"source\":\"auto\""));
    }
}
