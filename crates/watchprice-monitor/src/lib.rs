//! Logging, alert gating, notification delivery and console rendering.

mod gate;
mod logging;
mod notify;
mod render;

pub use gate::NotificationGate;
pub use logging::setup_logging;
pub use notify::{build_notification, currency_sign, DesktopBackend, DesktopNotifier, LogNotifier};
pub use render::{render_quote, render_unavailable};
