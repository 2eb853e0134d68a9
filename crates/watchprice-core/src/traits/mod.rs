//! Core traits for the watchprice pipeline.

mod data_source;
mod indicator;
mod sink;

pub use data_source::{HistorySource, QuoteSource};
pub use indicator::{require_samples, HlcIndicator, Indicator, MultiOutputIndicator};
pub use sink::{Notification, NotificationSink, RecordSink};
