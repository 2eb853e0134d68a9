//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use watchprice_config::load_config;
use watchprice_core::types::format_minute_of_day;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let file = match load_config(config_path) {
        Ok(file) => file,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    let config = file.to_watch_config();
    println!("Configuration is valid!");
    println!();
    println!("Update interval: {} ms", config.update_interval.as_millis());
    println!("Alert threshold: {}%", config.alert_threshold_percent);
    println!("Stocks ({}):", config.instruments.len());
    for instrument in &config.instruments {
        println!(
            "  {:<12} {:<16} source={}",
            instrument.symbol.as_str(),
            instrument.label(),
            instrument.preferred_source.as_str()
        );
    }
    println!("Market windows ({}):", config.trading_windows.len());
    for window in &config.trading_windows {
        println!(
            "  {:<12} {} - {}",
            window.label,
            format_minute_of_day(window.start_minute),
            format_minute_of_day(window.end_minute)
        );
    }

    let dropped = file.market_windows.len() - config.trading_windows.len();
    if dropped > 0 {
        println!("Warning: {} market window(s) could not be parsed and were ignored", dropped);
    }
    Ok(())
}
