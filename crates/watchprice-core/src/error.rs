//! Error types for the watchprice pipeline.

use thiserror::Error;

use crate::types::SourceId;

/// Upstream data errors.
///
/// Every variant means "this source is unavailable for this request"; callers
/// recover by trying the next source or by surfacing the instrument as
/// unavailable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("{source_id}: connection error: {message}")]
    Connection { source_id: SourceId, message: String },

    #[error("{source_id}: request timed out after {timeout_ms} ms")]
    Timeout { source_id: SourceId, timeout_ms: u64 },

    #[error("{source_id}: upstream returned HTTP {status}")]
    Status { source_id: SourceId, status: u16 },

    #[error("{source_id}: parse error: {message}")]
    Parse { source_id: SourceId, message: String },

    #[error("{source_id}: no data for {symbol}")]
    NoData { source_id: SourceId, symbol: String },

    #[error("{source_id} does not cover {symbol}")]
    Unsupported { source_id: SourceId, symbol: String },

    #[error("no source configured for {0}")]
    NoRoute(String),
}

impl DataError {
    pub fn parse(source_id: SourceId, message: impl Into<String>) -> Self {
        Self::Parse {
            source_id,
            message: message.into(),
        }
    }

    pub fn no_data(source_id: SourceId, symbol: impl Into<String>) -> Self {
        Self::NoData {
            source_id,
            symbol: symbol.into(),
        }
    }
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Failures of the output collaborators (record journal, notifications).
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
