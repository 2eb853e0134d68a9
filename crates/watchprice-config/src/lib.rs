//! Configuration management.

mod settings;
mod watcher;

pub use settings::{ConfigFile, StockEntry, WindowEntry};
pub use watcher::ConfigWatcher;

use config::{Config, Environment, File};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Prefix of environment overrides, e.g. `WATCHPRICE__UPDATEINTERVAL=10000`.
pub const ENV_PREFIX: &str = "WATCHPRICE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to write configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode configuration: {0}")]
    Encode(String),
}

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}

/// Load configuration, creating a default file when none exists.
///
/// An existing but unreadable file is left untouched and the defaults are
/// used in its place. Only failing to write a missing file is an error.
pub fn load_or_init(path: &Path) -> Result<ConfigFile, ConfigError> {
    if !path.exists() {
        let defaults = ConfigFile::default();
        write_config(path, &defaults)?;
        info!(path = %path.display(), "Created default configuration");
        return Ok(defaults);
    }

    match load_config(path) {
        Ok(file) => Ok(file),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Configuration unreadable, using defaults");
            Ok(ConfigFile::default())
        }
    }
}

/// Write `file` as TOML when the path ends in `.toml`, JSON otherwise.
pub fn write_config(path: &Path, file: &ConfigFile) -> Result<(), ConfigError> {
    let text = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::to_string_pretty(file).map_err(|e| ConfigError::Encode(e.to_string()))?,
        _ => serde_json::to_string_pretty(file).map_err(|e| ConfigError::Encode(e.to_string()))?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use watchprice_core::types::SourcePreference;

    #[test]
    fn test_load_json_camel_case() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "stocks": [{"name": "Apple", "code": "AAPL", "source": "yahoo"}],
                "updateInterval": 3000,
                "alertThresholdPercent": 2,
                "marketWindows": [{"label": "us", "start": "21:30", "end": "24:00"}]
            }"#,
        )
        .unwrap();

        let file = load_config(&path).unwrap();
        assert_eq!(file.stocks[0].code, "AAPL");
        assert_eq!(file.stocks[0].source, SourcePreference::Yahoo);
        assert_eq!(file.update_interval, 3_000);
        assert_eq!(file.alert_threshold_percent, 2.0);
        assert_eq!(file.market_windows[0].start, "21:30");
    }

    #[test]
    fn test_load_or_init_writes_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let file = load_or_init(&path).unwrap();
        assert_eq!(file, ConfigFile::default());
        assert!(path.exists());

        let reloaded = load_config(&path).unwrap();
        assert_eq!(reloaded.stocks.len(), 2);
        assert_eq!(reloaded.stocks[0].name, "浦发银行");
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        write_config(&path, &ConfigFile::default()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("updateInterval = 5000"));
        assert_eq!(load_config(&path).unwrap().market_windows.len(), 2);
    }

    #[test]
    fn test_broken_file_falls_back_without_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let file = load_or_init(&path).unwrap();
        assert_eq!(file, ConfigFile::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_unwritable_default_is_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        assert!(load_or_init(&blocker.join("config.json")).is_err());
    }
}
