//! Market data for the watchprice pipeline.
//!
//! Quote and history adapters over a pluggable HTTP transport, the history
//! cache feeding the indicator engine, tick aggregation and the CSV journal.

pub mod adapters;
mod cache;
pub mod http;
mod journal;
mod timeseries;

pub use adapters::{EastmoneySource, SinaSource, TencentSource, YahooSource};
pub use cache::HistoryCache;
pub use http::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use journal::CsvJournal;
pub use timeseries::{Bucket, TimeseriesAggregator};
