//! Output collaborators: the record journal and notification delivery.

use crate::error::SinkError;
use crate::types::PriceRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Append-only store for resolved quotes.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn insert(&self, record: &PriceRecord) -> Result<(), SinkError>;
}

/// A user-visible alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub subtitle: String,
}

/// Delivery mechanism for alerts.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), SinkError>;

    /// Get the sink name.
    fn name(&self) -> &str;
}
