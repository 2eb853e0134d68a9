//! Console rendering of resolved quotes.

use chrono::Local;
use std::fmt::Write;
use watchprice_core::types::{Quote, WatchedInstrument};

use crate::notify::currency_sign;

/// Multi-line summary of one instrument's quote.
pub fn render_quote(instrument: &WatchedInstrument, quote: &Quote) -> String {
    let cur = currency_sign(instrument);
    let arrow = if quote.is_up() { "▲" } else { "▼" };
    let sign = if quote.is_up() { "+" } else { "" };
    let percent = quote
        .change_percent
        .map(|p| format!("{sign}{p:.2}%"))
        .unwrap_or_else(|| "n/a".to_string());
    let name = if quote.name.is_empty() {
        instrument.label()
    } else {
        quote.name.as_str()
    };

    let mut out = format!(
        "{arrow} {name} ({symbol}) via {source}\n  \
         price {cur}{price:.2}  change {sign}{change:.2} ({percent})\n  \
         open {cur}{open:.2} | prev close {cur}{prev:.2}\n  \
         high {cur}{high:.2} | low {cur}{low:.2}\n  \
         volume {volume:.2}万 | as of {as_of}",
        symbol = instrument.symbol,
        source = quote.source,
        price = quote.current_price,
        change = quote.change,
        open = quote.open,
        prev = quote.previous_close,
        high = quote.high,
        low = quote.low,
        volume = quote.volume / 10_000.0,
        as_of = quote.as_of.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
    );

    if let Some(set) = &quote.indicators {
        if let Some(macd) = set.macd {
            let _ = write!(
                out,
                "\n  MACD {:.4} | signal {} | hist {}",
                macd.macd,
                fixed4(macd.signal),
                fixed4(macd.histogram)
            );
            if let Some(bias) = macd.bias {
                let _ = write!(out, " | {bias}");
            }
        }
        if let Some(rsi) = set.rsi {
            let _ = write!(out, "\n  RSI {:.2} | {}", rsi.value, rsi.zone);
        }
        if let Some(kdj) = set.kdj {
            let _ = write!(
                out,
                "\n  KDJ K={:.2} D={:.2} J={:.2} | {}",
                kdj.k, kdj.d, kdj.j, kdj.zone
            );
        }
        if let Some(trend) = set.trend {
            let _ = write!(out, "\n  trend {:.2}% | {}", trend.value, trend.bias);
        }
    }

    out
}

fn fixed4(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.4}"))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Line logged when no source could produce a quote.
pub fn render_unavailable(instrument: &WatchedInstrument) -> String {
    format!("✗ {} ({}): unavailable", instrument.label(), instrument.symbol)
}
