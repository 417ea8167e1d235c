//! Market-data payloads consumed by the engine.
//!
//! Fetching, authentication and status handling belong to the host; this
//! module only decodes an already-fetched aggregates body and describes the
//! request key that produced it.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::{Granularity, RawBar};
use crate::error::{ChartError, ChartResult};

/// Aggregates response body. Fields other than `results` are informational.
///
/// A `results` entry that is not a bar object (wrong field types, `null`)
/// decodes to an empty [`RawBar`], which the normalizer drops.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatesPayload {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default, rename = "resultsCount")]
    pub results_count: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_results")]
    pub results: Vec<RawBar>,
}

fn deserialize_results<'de, D>(deserializer: D) -> Result<Vec<RawBar>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|entry| serde_json::from_value(entry).unwrap_or_default())
        .collect())
}

impl AggregatesPayload {
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(ChartError::json("failed to parse aggregates payload"))
    }
}

/// Key of one aggregates request: `multiplier` x `timespan` bars of `ticker`
/// between two ISO dates (inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatesQuery {
    pub ticker: String,
    pub multiplier: u32,
    pub timespan: Granularity,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl AggregatesQuery {
    pub fn new(
        ticker: impl Into<String>,
        multiplier: u32,
        timespan: Granularity,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ChartResult<Self> {
        let ticker: String = ticker.into();
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(ChartError::query("ticker", "must not be empty"));
        }
        if multiplier == 0 {
            return Err(ChartError::query("multiplier", "must be > 0"));
        }
        if from > to {
            return Err(ChartError::query("from", "range start must be <= end"));
        }

        Ok(Self {
            ticker: ticker.to_ascii_uppercase(),
            multiplier,
            timespan,
            from,
            to,
        })
    }

    /// Builds a query from the host form's free-text fields.
    pub fn parse(
        ticker: &str,
        multiplier: &str,
        timespan: &str,
        from: &str,
        to: &str,
    ) -> ChartResult<Self> {
        let multiplier = multiplier
            .trim()
            .parse::<u32>()
            .map_err(|e| ChartError::query("multiplier", format!("`{multiplier}`: {e}")))?;
        let timespan = timespan
            .parse::<Granularity>()
            .map_err(|e| ChartError::query("timespan", e.to_string()))?;
        Self::new(
            ticker,
            multiplier,
            timespan,
            parse_iso_date(from, "from")?,
            parse_iso_date(to, "to")?,
        )
    }

    /// Path segment identifying the aggregates range, e.g.
    /// `/v2/aggs/ticker/AAPL/range/5/minute/2023-01-09/2023-01-09`.
    #[must_use]
    pub fn request_path(&self) -> String {
        format!(
            "/v2/aggs/ticker/{}/range/{}/{}/{}/{}",
            self.ticker,
            self.multiplier,
            self.timespan,
            self.from.format("%Y-%m-%d"),
            self.to.format("%Y-%m-%d"),
        )
    }
}

fn parse_iso_date(input: &str, field: &'static str) -> ChartResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| ChartError::query(field, format!("date `{input}`: {e}")))
}
