//! Annotated series and trade list export (CSV/JSON).
//!
//! Absent values are written as empty cells, never as a sentinel. When the
//! bars came from a CSV, its extra columns are written back after the OHLC
//! columns, and timestamps that did not parse are written as their raw text.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crosslab_core::domain::{AnnotatedBar, CrossEvent, Trade};

use crate::data_loader::SourceColumns;

/// Annotated columns; input pass-through columns go between `close` and `trend_value`.
pub const ANNOTATED_HEADER: [&str; 17] = [
    "index",
    "timestamp",
    "open",
    "high",
    "low",
    "close",
    "trend_value",
    "cross_event",
    "macd",
    "macd_signal",
    "macd_hist",
    "entry_signal",
    "exit_signal",
    "exit_type",
    "in_position",
    "trade_id",
    "profit_pips",
];

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

const PRICE_COLUMNS: usize = 6;

fn annotated_row(row: usize, b: &AnnotatedBar, source: Option<&SourceColumns>) -> Vec<String> {
    let cross = match b.cross_event {
        CrossEvent::None => String::new(),
        CrossEvent::Long => "long".into(),
        CrossEvent::Short => "short".into(),
    };
    let timestamp = match b.bar.timestamp {
        Some(ts) => ts.to_string(),
        None => source
            .and_then(|s| s.raw_timestamp(row))
            .unwrap_or_default()
            .to_string(),
    };
    let extra_count = source.map_or(0, |s| s.extra_headers.len());

    let mut cells = Vec::with_capacity(ANNOTATED_HEADER.len() + extra_count);
    cells.extend([
        b.bar.index.to_string(),
        timestamp,
        b.bar.open.to_string(),
        b.bar.high.to_string(),
        b.bar.low.to_string(),
        b.bar.close.to_string(),
    ]);
    if let Some(s) = source {
        cells.extend((0..extra_count).map(|column| s.extra(row, column).to_string()));
    }
    cells.extend([
        b.trend_value.to_string(),
        cross,
        b.oscillator.line.to_string(),
        b.oscillator.signal_line.to_string(),
        b.oscillator.histogram.to_string(),
        opt(b.entry_signal),
        opt(b.exit_signal),
        opt(b.exit_type),
        b.in_position.to_string(),
        opt(b.trade_id),
        b.profit_pips.map(|p| format!("{p:.5}")).unwrap_or_default(),
    ]);
    cells
}

/// Write the annotated series as CSV to any writer.
///
/// `source` rows are matched to bars by position.
pub fn write_annotated_csv_to<W: Write>(
    writer: W,
    bars: &[AnnotatedBar],
    source: Option<&SourceColumns>,
) -> Result<()> {
    let extra_headers = source.map_or(&[][..], |s| s.extra_headers.as_slice());
    let header = ANNOTATED_HEADER[..PRICE_COLUMNS]
        .iter()
        .copied()
        .chain(extra_headers.iter().map(String::as_str))
        .chain(ANNOTATED_HEADER[PRICE_COLUMNS..].iter().copied());

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header)?;
    for (row, bar) in bars.iter().enumerate() {
        wtr.write_record(annotated_row(row, bar, source))?;
    }
    wtr.flush().context("Failed to flush annotated CSV")?;
    Ok(())
}

pub fn write_annotated_csv(
    path: &Path,
    bars: &[AnnotatedBar],
    source: Option<&SourceColumns>,
) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path)
        .with_context(|| format!("Failed to create annotated CSV {}", path.display()))?;
    write_annotated_csv_to(file, bars, source)
        .with_context(|| format!("Failed to write annotated CSV {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = bars.len(), "saved annotated series");
    Ok(())
}

pub fn write_trades_json(path: &Path, trades: &[Trade]) -> Result<()> {
    write_json(path, trades)?;
    tracing::info!(path = %path.display(), trades = trades.len(), "saved trades");
    Ok(())
}

/// Pretty-printed JSON of any serializable value.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write JSON {}", path.display()))?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}
