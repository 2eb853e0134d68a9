//! Threshold and de-duplication filter in front of notifications.

use std::collections::HashMap;

/// Remembers the percent change last alerted per symbol.
///
/// A move alerts when it is at least `threshold` away from zero and, once a
/// symbol has alerted, at least `threshold` away from the last alerted value.
#[derive(Debug, Default, Clone)]
pub struct NotificationGate {
    last_alerted: HashMap<String, f64>,
}

impl NotificationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `change_percent` warrants an alert, recording it if so.
    pub fn should_alert(&mut self, symbol: &str, change_percent: f64, threshold: f64) -> bool {
        if threshold <= 0.0 || threshold.is_nan() || !change_percent.is_finite() {
            return false;
        }
        if change_percent.abs() < threshold {
            return false;
        }
        if let Some(last) = self.last_alerted.get(symbol) {
            if (change_percent - last).abs() < threshold {
                return false;
            }
        }
        self.last_alerted.insert(symbol.to_string(), change_percent);
        true
    }

    pub fn last_alerted(&self, symbol: &str) -> Option<f64> {
        self.last_alerted.get(symbol).copied()
    }

    /// Forget every symbol's alert history.
    pub fn reset(&mut self) {
        self.last_alerted.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_sequence() {
        let mut gate = NotificationGate::new();

        assert!(gate.should_alert("sh600000", 2.0, 1.0));
        assert!(!gate.should_alert("sh600000", 2.3, 1.0));
        assert!(gate.should_alert("sh600000", 3.5, 1.0));
        assert_eq!(gate.last_alerted("sh600000"), Some(3.5));
    }

    #[test]
    fn test_below_threshold_never_alerts() {
        let mut gate = NotificationGate::new();
        assert!(!gate.should_alert("AAPL", 0.99, 1.0));
        assert!(!gate.should_alert("AAPL", -0.5, 1.0));
        assert_eq!(gate.last_alerted("AAPL"), None);
    }

    #[test]
    fn test_reversal_alerts() {
        let mut gate = NotificationGate::new();
        assert!(gate.should_alert("AAPL", 1.5, 1.0));
        assert!(gate.should_alert("AAPL", -1.2, 1.0));
        assert_eq!(gate.last_alerted("AAPL"), Some(-1.2));
    }

    #[test]
    fn test_invalid_inputs() {
        let mut gate = NotificationGate::new();
        assert!(!gate.should_alert("AAPL", 5.0, 0.0));
        assert!(!gate.should_alert("AAPL", 5.0, -1.0));
        assert!(!gate.should_alert("AAPL", f64::NAN, 1.0));
        assert!(!gate.should_alert("AAPL", f64::INFINITY, 1.0));
    }

    #[test]
    fn test_symbols_are_independent() {
        let mut gate = NotificationGate::new();
        assert!(gate.should_alert("sh600000", 2.0, 1.0));
        assert!(gate.should_alert("sz000001", 2.0, 1.0));
        gate.reset();
        assert!(gate.should_alert("sh600000", 2.0, 1.0));
    }
}
