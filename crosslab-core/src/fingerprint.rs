//! Run fingerprinting — deterministic BLAKE3 hashes of inputs, config and output.
//!
//! Two runs on the same bars with the same config must produce the same
//! `output_hash`; the runner records all three hashes in its report.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::StrategyConfig;
use crate::domain::{AnnotatedBar, Bar};

/// Hex-encoded BLAKE3 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash of the OHLC values in series order. Timestamps are included when present.
pub fn dataset_hash(bars: &[Bar]) -> Fingerprint {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        if let Some(ts) = bar.timestamp {
            hasher.update(ts.to_string().as_bytes());
        }
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
    }
    Fingerprint(hasher.finalize().to_hex().to_string())
}

/// Hash of every parameter. Field order is fixed by the struct layout.
pub fn config_hash(config: &StrategyConfig) -> Fingerprint {
    let mut hasher = blake3::Hasher::new();
    for period in [
        config.trend_period,
        config.fast_period,
        config.slow_period,
        config.signal_period,
    ] {
        hasher.update(&(period as u64).to_le_bytes());
    }
    hasher.update(&config.pip_size.to_le_bytes());
    Fingerprint(hasher.finalize().to_hex().to_string())
}

/// Hash of the annotated output, bit-exact on floats.
pub fn output_hash(bars: &[AnnotatedBar]) -> Fingerprint {
    let mut hasher = blake3::Hasher::new();
    for b in bars {
        hasher.update(&b.bar.close.to_le_bytes());
        hasher.update(&b.trend_value.to_le_bytes());
        hasher.update(&[b.cross_event as u8]);
        hasher.update(&b.oscillator.line.to_le_bytes());
        hasher.update(&b.oscillator.signal_line.to_le_bytes());
        hasher.update(&b.oscillator.histogram.to_le_bytes());
        hasher.update(&[
            b.entry_signal.map_or(0, |d| d as u8 + 1),
            b.exit_signal.map_or(0, |e| e as u8 + 1),
            b.exit_type.map_or(0, |r| r as u8 + 1),
            u8::from(b.in_position),
        ]);
        hasher.update(&b.trade_id.map_or(0, |id| id.0).to_le_bytes());
        hasher.update(&b.profit_pips.map_or(0, f64::to_bits).to_le_bytes());
    }
    Fingerprint(hasher.finalize().to_hex().to_string())
}
