//! `v8/finance/chart` payloads: instrument lookup, price history, corporate actions.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::domains::finance::error::{ProviderError, ProviderResult};
use crate::domains::finance::provider::Instrument;
use crate::domains::finance::table::{Cell, RowTable};

/// Columns of a price history table, after the `Date` index.
pub const HISTORY_COLUMNS: [&str; 7] = [
    "Open",
    "High",
    "Low",
    "Close",
    "Volume",
    "Dividends",
    "Stock Splits",
];

/// Columns of a corporate actions table, after the `Date` index.
pub const ACTION_COLUMNS: [&str; 2] = ["Dividends", "Stock Splits"];

/// Error code Yahoo uses for unknown symbols.
const NOT_FOUND_CODE: &str = "Not Found";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    events: ChartEvents,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    currency: Option<String>,
    exchange_name: Option<String>,
    instrument_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: HashMap<String, DividendEvent>,
    #[serde(default)]
    splits: HashMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    date: i64,
    numerator: f64,
    denominator: f64,
}

impl SplitEvent {
    fn ratio(&self) -> Option<f64> {
        (self.denominator != 0.0).then(|| self.numerator / self.denominator)
    }
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteIndicator>,
    #[serde(default)]
    adjclose: Vec<AdjCloseIndicator>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteIndicator {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct AdjCloseIndicator {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Parse a chart response body. The body is inspected before the status so
/// that Yahoo's own error code survives a 404.
pub fn parse_chart(status: u16, body: &str) -> ProviderResult<ChartResult> {
    let envelope: ChartEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !(200..300).contains(&status) => {
            return Err(ProviderError::status(status, "chart"));
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(err) = envelope.chart.error {
        return Err(ProviderError::upstream(err.code, err.description));
    }

    envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProviderError::parse("chart response has no result"))
}

/// Whether a chart failure means the symbol does not exist.
pub fn is_unknown_symbol(err: &ProviderError) -> bool {
    match err {
        ProviderError::Upstream { code, .. } => code == NOT_FOUND_CODE,
        ProviderError::Status { status, .. } => *status == 404,
        _ => false,
    }
}

fn at<T: Copy>(series: &[Option<T>], i: usize) -> Option<T> {
    series.get(i).copied().flatten()
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

/// Index of the last bar starting at or before `event`.
fn bar_index(timestamps: &[i64], event: i64) -> Option<usize> {
    timestamps.partition_point(|&t| t <= event).checked_sub(1)
}

impl ChartResult {
    pub fn instrument(&self) -> Instrument {
        Instrument {
            symbol: self.meta.symbol.clone(),
            exchange: self.meta.exchange_name.clone(),
            instrument_type: self.meta.instrument_type.clone(),
            currency: self.meta.currency.clone(),
        }
    }

    /// Split/dividend adjusted OHLCV bars with per-bar corporate actions.
    /// Bars without any price are dropped.
    pub fn history_table(&self) -> RowTable {
        let mut table = RowTable::with_index("Date", HISTORY_COLUMNS);
        let empty = QuoteIndicator::default();
        let quote = self.indicators.quote.first().unwrap_or(&empty);
        let adjclose = self
            .indicators
            .adjclose
            .first()
            .map(|a| a.adjclose.as_slice())
            .unwrap_or_default();

        let n = self.timestamp.len();
        let mut dividends = vec![0.0; n];
        let mut splits = vec![0.0; n];
        for event in self.events.dividends.values() {
            if let Some(i) = bar_index(&self.timestamp, event.date) {
                dividends[i] += event.amount;
            }
        }
        for event in self.events.splits.values() {
            if let (Some(i), Some(ratio)) = (bar_index(&self.timestamp, event.date), event.ratio()) {
                splits[i] = ratio;
            }
        }

        for (i, &ts) in self.timestamp.iter().enumerate() {
            let (open, high, low, close) = (
                at(&quote.open, i),
                at(&quote.high, i),
                at(&quote.low, i),
                at(&quote.close, i),
            );
            if open.is_none() && high.is_none() && low.is_none() && close.is_none() {
                continue;
            }

            let factor = match (at(adjclose, i), close) {
                (Some(adj), Some(c)) if c != 0.0 => adj / c,
                _ => 1.0,
            };
            let adjust = |v: Option<f64>| Cell::from(v.map(|v| v * factor));

            table.push_row(
                timestamp(ts),
                vec![
                    adjust(open),
                    adjust(high),
                    adjust(low),
                    adjust(close),
                    Cell::from(at(&quote.volume, i).map(|v| v as i64)),
                    Cell::Float(dividends[i]),
                    Cell::Float(splits[i]),
                ],
            );
        }

        table
    }

    /// Every dividend and split, oldest first, one row per event date.
    pub fn actions_table(&self) -> RowTable {
        let mut by_date: BTreeMap<i64, (f64, f64)> = BTreeMap::new();
        for event in self.events.dividends.values() {
            by_date.entry(event.date).or_default().0 += event.amount;
        }
        for event in self.events.splits.values() {
            if let Some(ratio) = event.ratio() {
                by_date.entry(event.date).or_default().1 = ratio;
            }
        }

        let mut table = RowTable::with_index("Date", ACTION_COLUMNS);
        for (date, (dividend, split)) in by_date {
            table.push_row(timestamp(date), vec![Cell::Float(dividend), Cell::Float(split)]);
        }
        table
    }
}
