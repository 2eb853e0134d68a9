//! Tick loop: gate on trading windows, run update cycles, follow reloads.

use chrono::{Local, NaiveTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use watchprice_core::traits::{NotificationSink, RecordSink};
use watchprice_core::types::{PriceRecord, WatchConfig};
use watchprice_monitor::{build_notification, render_quote, render_unavailable, NotificationGate};

use crate::calendar::{is_trading_open, millis_until_next_window};
use crate::resolver::QuoteResolver;

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn local_time(&self) -> NaiveTime;
}

/// The machine's local clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_time(&self) -> NaiveTime {
        Local::now().time()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketState {
    Open,
    Closed,
}

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub state: MarketState,
    /// Delay until the next tick, already floored.
    pub next_delay: Duration,
    pub resolved: usize,
    pub unavailable: usize,
    pub alerts: usize,
}

/// Drives update cycles for the watchlist.
pub struct TradingScheduler {
    resolver: QuoteResolver,
    journal: Arc<dyn RecordSink>,
    notifier: Arc<dyn NotificationSink>,
    gate: NotificationGate,
    clock: Arc<dyn Clock>,
    sink_timeout: Duration,
}

impl TradingScheduler {
    /// Floor applied to every re-arm delay.
    pub const MIN_DELAY: Duration = Duration::from_secs(1);

    /// Upper bound on one journal write or notification.
    pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(
        resolver: QuoteResolver,
        journal: Arc<dyn RecordSink>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            resolver,
            journal,
            notifier,
            gate: NotificationGate::new(),
            clock: Arc::new(SystemClock),
            sink_timeout: Self::DEFAULT_SINK_TIMEOUT,
        }
    }

    pub fn with_sink_timeout(mut self, timeout: Duration) -> Self {
        self.sink_timeout = timeout;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Market state at `now` and the delay before the following tick.
    pub fn plan(config: &WatchConfig, now: NaiveTime) -> (MarketState, Duration) {
        if is_trading_open(&config.trading_windows, now) {
            (MarketState::Open, floor_delay(config.update_interval))
        } else {
            (
                MarketState::Closed,
                floor_delay(millis_until_next_window(&config.trading_windows, now)),
            )
        }
    }

    /// One tick: an update cycle when a window is open, nothing otherwise.
    pub async fn tick(&mut self, config: &WatchConfig) -> TickReport {
        let (state, next_delay) = Self::plan(config, self.clock.local_time());
        let mut report = TickReport {
            state,
            next_delay,
            resolved: 0,
            unavailable: 0,
            alerts: 0,
        };

        match state {
            MarketState::Open => self.update_cycle(config, &mut report).await,
            MarketState::Closed => {
                info!(next_in_secs = next_delay.as_secs(), "Market closed, waiting for next window");
            }
        }
        report
    }

    async fn update_cycle(&mut self, config: &WatchConfig, report: &mut TickReport) {
        debug!(instruments = config.instruments.len(), "Update cycle");
        let results = self.resolver.resolve_all(&config.instruments).await;

        for (instrument, result) in config.instruments.iter().zip(results) {
            let quote = match result {
                Ok(quote) => quote,
                Err(e) => {
                    report.unavailable += 1;
                    warn!(symbol = %instrument.symbol, error = %e, "{}", render_unavailable(instrument));
                    continue;
                }
            };
            report.resolved += 1;
            info!("{}", render_quote(instrument, &quote));

            let record = PriceRecord::from_quote(instrument, &quote);
            match timeout(self.sink_timeout, self.journal.insert(&record)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(symbol = %instrument.symbol, error = %e, "Failed to journal quote"),
                Err(_) => warn!(
                    symbol = %instrument.symbol,
                    timeout_ms = self.sink_timeout.as_millis() as u64,
                    "Journal write timed out"
                ),
            }

            let Some(percent) = quote.change_percent_f64() else {
                continue;
            };
            if self
                .gate
                .should_alert(instrument.symbol.as_str(), percent, config.alert_threshold_percent)
            {
                report.alerts += 1;
                let notification = build_notification(instrument, &quote, config.alert_threshold_percent);
                match timeout(self.sink_timeout, self.notifier.notify(&notification)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(
                        symbol = %instrument.symbol,
                        notifier = self.notifier.name(),
                        error = %e,
                        "Failed to deliver alert"
                    ),
                    Err(_) => warn!(
                        symbol = %instrument.symbol,
                        notifier = self.notifier.name(),
                        timeout_ms = self.sink_timeout.as_millis() as u64,
                        "Alert delivery timed out"
                    ),
                }
            }
        }
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    ///
    /// A configuration change re-arms the next tick at [`Self::MIN_DELAY`],
    /// replacing any pending wakeup. A cycle already running finishes first.
    pub async fn run(
        mut self,
        mut config_rx: watch::Receiver<Arc<WatchConfig>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut config = config_rx.borrow_and_update().clone();
        let mut delay = Self::MIN_DELAY;
        let mut watching = true;
        info!(instruments = config.instruments.len(), "Scheduler started");

        loop {
            let sleep = tokio::time::sleep(delay);
            tokio::pin!(sleep);

            tokio::select! {
                _ = &mut sleep => {
                    delay = self.tick(&config).await.next_delay;
                }
                changed = config_rx.changed(), if watching => {
                    match changed {
                        Ok(()) => {
                            config = config_rx.borrow_and_update().clone();
                            info!(instruments = config.instruments.len(), "Applying new configuration");
                            delay = Self::MIN_DELAY;
                        }
                        Err(_) => {
                            debug!("Configuration channel closed, keeping current configuration");
                            watching = false;
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Scheduler stopped");
    }
}

fn floor_delay(delay: Duration) -> Duration {
    delay.max(TradingScheduler::MIN_DELAY)
}
