//! One-shot quote resolution.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use watchprice_config::load_or_init;
use watchprice_core::types::{SourcePreference, WatchedInstrument};
use watchprice_data::ReqwestHttpClient;
use watchprice_engine::QuoteResolver;
use watchprice_monitor::{render_quote, render_unavailable};

use crate::cli::QuoteArgs;

pub async fn run(args: QuoteArgs, config_path: &Path) -> Result<()> {
    let instruments: Vec<WatchedInstrument> = if args.symbols.is_empty() {
        load_or_init(config_path)
            .with_context(|| format!("Failed to load configuration at {}", config_path.display()))?
            .to_watch_config()
            .instruments
    } else {
        args.symbols
            .iter()
            .map(|s| WatchedInstrument::new(s.trim(), "", SourcePreference::Auto))
            .collect()
    };

    if instruments.is_empty() {
        anyhow::bail!("No symbols to resolve; pass symbols or add stocks to {}", config_path.display());
    }

    let resolver = QuoteResolver::standard(Arc::new(ReqwestHttpClient::new()));
    let results = resolver.resolve_all(&instruments).await;

    let mut unavailable = 0;
    for (instrument, result) in instruments.iter().zip(results) {
        match result {
            Ok(quote) => println!("{}\n", render_quote(instrument, &quote)),
            Err(e) => {
                unavailable += 1;
                println!("{} [{}]\n", render_unavailable(instrument), e);
            }
        }
    }

    if unavailable == instruments.len() {
        anyhow::bail!("No quote source answered");
    }
    Ok(())
}
