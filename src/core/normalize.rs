use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::OhlcBar;
use crate::core::primitives::millis_from_f64;

/// Bar as it arrives on the wire: `{t, o, h, l, c}` with any field possibly missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawBar {
    #[serde(rename = "t", default)]
    pub timestamp: Option<f64>,
    #[serde(rename = "o", default)]
    pub open: Option<f64>,
    #[serde(rename = "h", default)]
    pub high: Option<f64>,
    #[serde(rename = "l", default)]
    pub low: Option<f64>,
    #[serde(rename = "c", default)]
    pub close: Option<f64>,
}

impl RawBar {
    #[must_use]
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp: Some(timestamp as f64),
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
        }
    }

    /// Converts into a bar, or `None` when a field is missing, not a finite
    /// number, or `low > high`.
    #[must_use]
    pub fn to_bar(self) -> Option<OhlcBar> {
        let timestamp = millis_from_f64(self.timestamp?)?;
        OhlcBar::lenient(timestamp, self.open?, self.high?, self.low?, self.close?).ok()
    }
}

impl From<OhlcBar> for RawBar {
    fn from(bar: OhlcBar) -> Self {
        Self::new(bar.timestamp, bar.open, bar.high, bar.low, bar.close)
    }
}

/// Drops malformed entries and returns bars sorted ascending by timestamp.
///
/// An empty result is the valid "nothing to render" state, not an error.
#[must_use]
pub fn normalize_bars(raw: Vec<RawBar>) -> Vec<OhlcBar> {
    let original_len = raw.len();
    let bars: Vec<OhlcBar> = raw.into_iter().filter_map(RawBar::to_bar).collect();
    let malformed_count = original_len - bars.len();
    if malformed_count > 0 {
        warn!(malformed_count, "dropped malformed raw bars");
    }
    canonicalize_bars(bars)
}

/// Sorts bars by timestamp and keeps the last bar of each duplicated timestamp.
///
/// Bars with non-finite prices or `low > high` are dropped. Bars whose open or
/// close falls outside `[low, high]` are kept as drawn by the producer and only
/// reported.
#[must_use]
pub fn canonicalize_bars(mut bars: Vec<OhlcBar>) -> Vec<OhlcBar> {
    let original_len = bars.len();
    bars.retain(|bar| bar.validate_drawable().is_ok());
    // Stable sort keeps submission order among equal timestamps so "last wins" holds.
    bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let mut deduped: Vec<OhlcBar> = Vec::with_capacity(bars.len());
    let mut duplicate_count = 0_usize;
    for bar in bars {
        if let Some(last) = deduped.last_mut() {
            if bar.timestamp.cmp(&last.timestamp) == Ordering::Equal {
                *last = bar;
                duplicate_count += 1;
                continue;
            }
        }
        deduped.push(bar);
    }

    let filtered_count = original_len.saturating_sub(deduped.len() + duplicate_count);
    if filtered_count > 0 || duplicate_count > 0 {
        warn!(
            filtered_count,
            duplicate_count,
            canonical_count = deduped.len(),
            "canonicalized bars"
        );
    }

    let misordered_count = deduped.iter().filter(|bar| !bar.is_well_ordered()).count();
    if misordered_count > 0 {
        warn!(misordered_count, "bars have open/close outside low/high");
    }
    deduped
}
