//! Journal aggregation command.

use anyhow::{Context, Result};
use serde_json::json;
use std::io;
use std::path::Path;
use watchprice_data::{Bucket, CsvJournal, TimeseriesAggregator};

use crate::cli::{AggregateArgs, OutputFormat};

pub async fn run(args: AggregateArgs, journal_path: &Path) -> Result<()> {
    let journal = CsvJournal::new(journal_path);
    let ticks = journal
        .load_ticks(&args.symbol)
        .with_context(|| format!("Failed to read journal {}", journal_path.display()))?;

    let aggregator = TimeseriesAggregator::new(args.interval, args.limit);
    let buckets = aggregator.aggregate(&ticks);
    if buckets.is_empty() {
        eprintln!("No priced records for {} in {}", args.symbol, journal_path.display());
    }

    match args.format {
        OutputFormat::Json => {
            let output = json!({
                "code": args.symbol,
                "intervalMinutes": aggregator.interval_minutes(),
                "limit": aggregator.limit(),
                "data": buckets,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => print_table(&buckets),
        OutputFormat::Csv => write_csv(&buckets)?,
    }
    Ok(())
}

fn print_table(buckets: &[Bucket]) {
    println!(
        "{:<20} {:>10} {:>10} {:>10} {:>10} {:>10} {:>14} {:>8} {:>8}",
        "time", "open", "high", "low", "close", "avg", "volume", "amp%", "chg%"
    );
    for b in buckets {
        println!(
            "{:<20} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>14} {:>8} {:>8}",
            b.timestamp.format("%Y-%m-%d %H:%M"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.avg_price,
            optional(b.volume, 0),
            optional(b.amplitude, 2),
            optional(b.change_percent, 2),
        );
    }
}

fn optional(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_else(|| "-".to_string())
}

fn write_csv(buckets: &[Bucket]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    for bucket in buckets {
        writer.serialize(bucket)?;
    }
    writer.flush()?;
    Ok(())
}
