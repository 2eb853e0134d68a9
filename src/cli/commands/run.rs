//! Service loop: watch the configuration and monitor quotes until Ctrl-C.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use watchprice_config::{load_or_init, ConfigWatcher};
use watchprice_core::traits::NotificationSink;
use watchprice_data::{CsvJournal, ReqwestHttpClient};
use watchprice_engine::{QuoteResolver, TradingScheduler};
use watchprice_monitor::{DesktopNotifier, LogNotifier};

use crate::cli::{NotifierKind, RunArgs};

pub async fn run(args: RunArgs, config_path: &Path, journal_path: &Path) -> Result<()> {
    let file = load_or_init(config_path)
        .with_context(|| format!("Failed to initialise configuration at {}", config_path.display()))?;
    let config = file.to_watch_config();
    if config.instruments.is_empty() {
        warn!(path = %config_path.display(), "Watchlist is empty, edit the configuration to add stocks");
    }
    info!(
        instruments = config.instruments.len(),
        windows = config.trading_windows.len(),
        interval_ms = config.update_interval.as_millis() as u64,
        journal = %journal_path.display(),
        "Starting watchprice"
    );

    let notifier: Arc<dyn NotificationSink> = match args.notifier {
        NotifierKind::Desktop => Arc::new(DesktopNotifier::for_platform()),
        NotifierKind::Log => Arc::new(LogNotifier),
    };
    let resolver = QuoteResolver::standard(Arc::new(ReqwestHttpClient::new()));
    let scheduler = TradingScheduler::new(resolver, Arc::new(CsvJournal::new(journal_path)), notifier);

    let (watcher, config_rx) = ConfigWatcher::new(config_path, config);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let watcher_task = tokio::spawn(watcher.run(shutdown_rx.clone()));
    let scheduler_task = tokio::spawn(scheduler.run(config_rx, shutdown_rx));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Shutting down");
    let _ = shutdown_tx.send(true);

    scheduler_task.await.context("Scheduler task panicked")?;
    watcher_task.await.context("Config watcher task panicked")?;
    Ok(())
}
