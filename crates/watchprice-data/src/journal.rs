//! Append-only CSV journal of resolved quotes.

use async_trait::async_trait;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tokio::task;
use tracing::warn;
use watchprice_core::error::SinkError;
use watchprice_core::traits::RecordSink;
use watchprice_core::types::{PriceRecord, Tick};

/// One [`PriceRecord`] per line, header written when the file is created.
#[derive(Debug)]
pub struct CsvJournal {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every readable record, in file order. Unreadable rows are skipped.
    pub fn load_records(&self) -> Result<Vec<PriceRecord>, SinkError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| SinkError::Persistence(e.to_string()))?;

        let mut records = Vec::new();
        for (line, result) in reader.deserialize::<PriceRecord>().enumerate() {
            match result {
                Ok(record) => records.push(record),
                Err(e) => warn!(line = line + 2, error = %e, "Skipping unreadable journal row"),
            }
        }
        Ok(records)
    }

    /// Raw ticks recorded for `symbol`, in file order.
    pub fn load_ticks(&self, symbol: &str) -> Result<Vec<Tick>, SinkError> {
        Ok(self
            .load_records()?
            .iter()
            .filter(|r| r.symbol == symbol)
            .filter_map(PriceRecord::to_tick)
            .collect())
    }
}

#[async_trait]
impl RecordSink for CsvJournal {
    async fn insert(&self, record: &PriceRecord) -> Result<(), SinkError> {
        // held across the blocking write so rows land in call order
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        let record = record.clone();
        task::spawn_blocking(move || append(&path, &record))
            .await
            .map_err(|e| SinkError::Persistence(format!("journal writer task failed: {e}")))?
    }
}

fn append(path: &Path, record: &PriceRecord) -> Result<(), SinkError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let is_new = file.metadata()?.len() == 0;

    let mut writer = WriterBuilder::new().has_headers(is_new).from_writer(file);
    writer
        .serialize(record)
        .map_err(|e| SinkError::Persistence(e.to_string()))?;
    writer.flush()?;
    Ok(())
}
