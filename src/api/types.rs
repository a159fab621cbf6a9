//! API response types for the Yahoo Finance chart endpoint.

use chrono::{FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::Bar;

/// Decimal places kept from the provider's float prices.
const PRICE_DECIMALS: u32 = 4;

/// Top-level response from /v8/finance/chart/{symbol}.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

/// Error object the endpoint returns for unknown symbols and bad ranges.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

/// Series for a single symbol.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub exchange_timezone_name: Option<String>,
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    pub gmtoffset: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

/// Column-oriented OHLC values; `null` marks a missing session value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartResult {
    /// Convert the columns into time-ordered bars.
    ///
    /// Sessions with a missing or non-positive price, or with high below
    /// low, are dropped.
    pub fn into_bars(self) -> Vec<Bar> {
        let offset = FixedOffset::east_opt(self.meta.gmtoffset).unwrap_or_else(|| Utc.fix());
        let Some(quote) = self.indicators.quote.into_iter().next() else {
            return Vec::new();
        };

        let mut bars: Vec<Bar> = self
            .timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let date = session_date(ts, &offset)?;
                let open = price_at(&quote.open, i)?;
                let high = price_at(&quote.high, i)?;
                let low = price_at(&quote.low, i)?;
                let close = price_at(&quote.close, i)?;
                if high < low {
                    return None;
                }
                Some(Bar {
                    date,
                    open,
                    high,
                    low,
                    close,
                })
            })
            .collect();

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        bars
    }
}

fn session_date(timestamp: i64, offset: &FixedOffset) -> Option<NaiveDate> {
    offset
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.date_naive())
}

fn price_at(column: &[Option<f64>], index: usize) -> Option<Decimal> {
    let value = column.get(index).copied().flatten()?;
    let price = Decimal::try_from(value).ok()?.round_dp(PRICE_DECIMALS);
    (price > Decimal::ZERO).then_some(price)
}
