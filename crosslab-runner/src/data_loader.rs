//! Bar loading from CSV, plus synthetic bars for demos.
//!
//! The CSV header must contain Open, High, Low and Close (any case, any
//! order). A timestamp is picked up from one of the usual column names, or
//! from separate Date and Time columns (MT4 style). Timestamps that fail to
//! parse become `None` on the bar, but their text is kept in
//! [`SourceColumns`] along with every other non-OHLC column so the export can
//! write them back. Rows keep file order and `index` is the zero-based row
//! number.

use chrono::{NaiveDate, NaiveDateTime};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crosslab_core::domain::Bar;
use crosslab_core::fingerprint::{dataset_hash, Fingerprint};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("row {row}: cannot parse {column} value '{value}' as a number")]
    ParseField {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("no data rows")]
    Empty,
}

pub const REQUIRED_COLUMNS: [&str; 4] = ["Open", "High", "Low", "Close"];

/// Single columns holding a full date and time, in lookup order.
const TIMESTAMP_COLUMNS: [&str; 5] = ["timestamp", "datetime", "date time", "gmt time", "local time"];

const DATETIME_FORMATS: [&str; 11] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
    "%Y.%m.%d %H:%M:%S%.f",
    "%Y.%m.%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y.%m.%d", "%d.%m.%Y", "%m/%d/%Y", "%Y/%m/%d"];

/// Where a row's timestamp text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimestampSource {
    Single(usize),
    Split { date: usize, time: usize },
}

impl TimestampSource {
    fn detect(find: impl Fn(&str) -> Option<usize>) -> Option<Self> {
        if let Some(idx) = TIMESTAMP_COLUMNS.iter().find_map(|&name| find(name)) {
            return Some(Self::Single(idx));
        }
        match (find("date"), find("time")) {
            (Some(date), Some(time)) => Some(Self::Split { date, time }),
            (Some(idx), None) | (None, Some(idx)) => Some(Self::Single(idx)),
            (None, None) => None,
        }
    }

    fn columns(self) -> Vec<usize> {
        match self {
            Self::Single(idx) => vec![idx],
            Self::Split { date, time } => vec![date, time],
        }
    }

    fn text(self, record: &csv::StringRecord) -> Option<String> {
        let text = match self {
            Self::Single(idx) => record.get(idx)?.to_string(),
            Self::Split { date, time } => {
                format!("{} {}", record.get(date)?, record.get(time)?)
            }
        };
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Input text that is not part of a [`Bar`], kept for export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceColumns {
    /// Raw timestamp text per row; date and time are joined by a space when split.
    pub timestamps: Vec<Option<String>>,
    /// Headers of input columns that are neither OHLC nor timestamp, in file order.
    pub extra_headers: Vec<String>,
    /// Values of the extra columns, one row per bar.
    pub extra_rows: Vec<Vec<String>>,
}

impl SourceColumns {
    pub fn raw_timestamp(&self, row: usize) -> Option<&str> {
        self.timestamps.get(row).and_then(|t| t.as_deref())
    }

    /// Extra value for `row`, empty when absent.
    pub fn extra(&self, row: usize, column: usize) -> &str {
        self.extra_rows
            .get(row)
            .and_then(|r| r.get(column))
            .map_or("", String::as_str)
    }
}

/// Result of loading bars, with provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub bars: Vec<Bar>,
    /// Headers of the column(s) timestamps were read from; empty when none.
    pub timestamp_columns: Vec<String>,
    /// Raw timestamp text and pass-through columns.
    pub source: SourceColumns,
    /// BLAKE3 over all bar values.
    pub dataset_hash: Fingerprint,
}

/// Load bars from a CSV file.
pub fn load_csv(path: &Path) -> Result<LoadedData, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = read_csv(file)?;
    tracing::info!(
        path = %path.display(),
        bars = loaded.bars.len(),
        dataset = loaded.dataset_hash.short(),
        "loaded bars"
    );
    Ok(loaded)
}

/// Read bars from any CSV source.
pub fn read_csv<R: Read>(reader: R) -> Result<LoadedData, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|&&c| find(c).is_none())
        .map(|c| c.to_string())
        .collect();
    let [open, high, low, close] = match REQUIRED_COLUMNS.map(|c| find(c)) {
        [Some(o), Some(h), Some(l), Some(c)] => [o, h, l, c],
        _ => return Err(LoadError::MissingColumns(missing)),
    };

    let ts_source = TimestampSource::detect(&find);
    let ts_columns = ts_source.map(TimestampSource::columns).unwrap_or_default();
    let timestamp_columns = ts_columns.iter().map(|&i| headers[i].to_string()).collect();

    let used = [open, high, low, close];
    let extra_idx: Vec<usize> = (0..headers.len())
        .filter(|i| !used.contains(i) && !ts_columns.contains(i))
        .collect();
    let mut source = SourceColumns {
        extra_headers: extra_idx.iter().map(|&i| headers[i].to_string()).collect(),
        ..SourceColumns::default()
    };

    let mut bars = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let ts_text = ts_source.and_then(|src| src.text(&record));
        let field = |idx: usize, column: &'static str| -> Result<f64, LoadError> {
            let raw = record.get(idx).unwrap_or("");
            raw.parse::<f64>().map_err(|_| LoadError::ParseField {
                row,
                column,
                value: raw.to_string(),
            })
        };
        bars.push(Bar {
            index: row,
            timestamp: ts_text.as_deref().and_then(parse_timestamp),
            open: field(open, "Open")?,
            high: field(high, "High")?,
            low: field(low, "Low")?,
            close: field(close, "Close")?,
        });
        source.timestamps.push(ts_text);
        source.extra_rows.push(
            extra_idx
                .iter()
                .map(|&i| record.get(i).unwrap_or("").to_string())
                .collect(),
        );
    }

    if bars.is_empty() {
        return Err(LoadError::Empty);
    }

    let dataset_hash = dataset_hash(&bars);
    Ok(LoadedData {
        bars,
        timestamp_columns,
        source,
        dataset_hash,
    })
}

/// Parse the timestamp formats seen in FX and equity exports.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    // Drop a trailing UTC offset or zone tag ("+00:00", " GMT+0000", "Z").
    let raw = raw
        .split_once(" GMT")
        .map_or(raw, |(head, _)| head)
        .trim_end_matches('Z');
    let raw = match raw.rfind('+') {
        Some(pos) if pos > 10 => &raw[..pos],
        _ => raw,
    };

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Generate a seeded random-walk series of one-minute bars.
///
/// Starts at 1.1000 with moves of up to 5 pips per bar. The same seed
/// always gives the same bars.
pub fn generate_synthetic_bars(n: usize, seed: u64) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2025, 1, 6).and_then(|d| d.and_hms_opt(0, 0, 0));

    let mut bars = Vec::with_capacity(n);
    let mut price = 1.1000_f64;
    for i in 0..n {
        let open = price;
        let close = open + rng.gen_range(-0.0005..0.0005);
        let high = open.max(close) + rng.gen_range(0.0..0.0003);
        let low = open.min(close) - rng.gen_range(0.0..0.0003);
        bars.push(Bar {
            index: i,
            timestamp: start.map(|s| s + chrono::Duration::minutes(i as i64)),
            open,
            high,
            low,
            close,
        });
        price = close;
    }
    bars
}
