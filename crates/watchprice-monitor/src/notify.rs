//! Notification sinks and alert text.

use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};
use watchprice_core::error::SinkError;
use watchprice_core::traits::{Notification, NotificationSink};
use watchprice_core::types::{MarketClass, Quote, WatchedInstrument};

/// Currency sign shown next to prices.
pub fn currency_sign(instrument: &WatchedInstrument) -> &'static str {
    if instrument.symbol.market() == MarketClass::Us {
        "$"
    } else {
        "¥"
    }
}

/// Alert text for a quote that passed the gate.
pub fn build_notification(
    instrument: &WatchedInstrument,
    quote: &Quote,
    threshold_percent: f64,
) -> Notification {
    let name = if quote.name.is_empty() {
        instrument.label()
    } else {
        quote.name.as_str()
    };
    let sign = if quote.is_up() { "+" } else { "" };
    let direction = if quote.is_up() { "up" } else { "down" };
    let percent = quote.change_percent.unwrap_or_default();
    let signal = quote
        .indicators
        .as_ref()
        .and_then(|set| set.headline())
        .unwrap_or_default();

    Notification {
        title: format!("Price alert: {name}"),
        body: format!(
            "{}{:.2} {sign}{percent:.2}% ({direction})",
            currency_sign(instrument),
            quote.current_price
        ),
        subtitle: format!("threshold {threshold_percent}% {signal}")
            .trim_end()
            .to_string(),
    }
}

/// Writes alerts to the log only.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), SinkError> {
        info!(
            title = %notification.title,
            subtitle = %notification.subtitle,
            "{}",
            notification.body
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopBackend {
    /// `osascript -e 'display notification ...'`
    Osascript,
    /// freedesktop `notify-send`
    NotifySend,
}

/// Desktop notification through the platform's command-line notifier.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    backend: DesktopBackend,
    timeout: Duration,
}

impl DesktopNotifier {
    /// How long the notifier process may run before it is killed.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(backend: DesktopBackend) -> Self {
        Self {
            backend,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// osascript on macOS, notify-send elsewhere.
    pub fn for_platform() -> Self {
        if cfg!(target_os = "macos") {
            Self::new(DesktopBackend::Osascript)
        } else {
            Self::new(DesktopBackend::NotifySend)
        }
    }

    /// Program and arguments that display `notification`.
    pub fn command_line(&self, notification: &Notification) -> (&'static str, Vec<String>) {
        match self.backend {
            DesktopBackend::Osascript => {
                let script = format!(
                    "display notification {} with title {} subtitle {} sound name \"Glass\"",
                    applescript_string(&notification.body),
                    applescript_string(&notification.title),
                    applescript_string(&notification.subtitle),
                );
                ("osascript", vec!["-e".to_string(), script])
            }
            DesktopBackend::NotifySend => (
                "notify-send",
                vec![
                    "--app-name=watchprice".to_string(),
                    notification.title.clone(),
                    format!("{}\n{}", notification.body, notification.subtitle),
                ],
            ),
        }
    }
}

/// Run `program` to completion, killing it once `timeout` elapses.
async fn run_bounded(program: &str, args: &[String], timeout: Duration) -> Result<(), SinkError> {
    // dropping the pending output kills the child
    let pending = Command::new(program).args(args).kill_on_drop(true).output();
    let output = tokio::time::timeout(timeout, pending)
        .await
        .map_err(|_| {
            SinkError::Notification(format!(
                "{program} did not exit within {} ms",
                timeout.as_millis()
            ))
        })?
        .map_err(|e| SinkError::Notification(format!("{program}: {e}")))?;

    if !output.status.success() {
        return Err(SinkError::Notification(format!(
            "{program} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

/// Double-quoted AppleScript literal.
fn applescript_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

#[async_trait]
impl NotificationSink for DesktopNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), SinkError> {
        let (program, args) = self.command_line(notification);
        debug!(program, "Sending desktop notification");

        run_bounded(program, &args, self.timeout).await
    }

    fn name(&self) -> &str {
        match self.backend {
            DesktopBackend::Osascript => "osascript",
            DesktopBackend::NotifySend => "notify-send",
        }
    }
}
