//! Yahoo Finance chart client for daily OHLC bars.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::Bar;

use super::types::*;
use super::MarketDataProvider;

const CHART_API_BASE: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_RANGE: &str = "3mo";
const USER_AGENT: &str = concat!("swingsize/", env!("CARGO_PKG_VERSION"));

/// Client for the public chart API (read-only).
pub struct DataClient {
    client: Client,
    base_url: String,
    range: String,
}

impl DataClient {
    /// Create a new data client with default settings.
    pub fn new() -> Result<Self> {
        Self::with_base_url(CHART_API_BASE.to_string())
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            range: DEFAULT_RANGE.to_string(),
        })
    }

    /// Look-back window requested from the API (e.g. `1mo`, `3mo`, `6mo`).
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    /// Fetch the raw daily chart for a symbol.
    pub async fn get_chart(&self, symbol: &str) -> Result<ChartResult> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.base_url, symbol, self.range
        );

        debug!(url = %url, "Fetching daily chart");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch chart")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Chart request for {} failed: {} - {}", symbol, status, body);
        }

        let chart: ChartResponse = response
            .json()
            .await
            .context("Failed to parse chart response")?;

        if let Some(err) = chart.chart.error {
            anyhow::bail!("Chart request for {} failed: {} - {}", symbol, err.code, err.description);
        }

        chart
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .with_context(|| format!("No chart data returned for {}", symbol))
    }
}

#[async_trait]
impl MarketDataProvider for DataClient {
    async fn daily_bars(&self, symbol: &str) -> Result<Vec<Bar>> {
        let chart = self.get_chart(symbol).await?;
        let sessions = chart.timestamp.len();
        let bars = chart.into_bars();

        if bars.len() < sessions {
            warn!(
                symbol = %symbol,
                dropped = sessions - bars.len(),
                "Dropped incomplete sessions"
            );
        }
        debug!(symbol = %symbol, bars = bars.len(), "Fetched daily bars");

        Ok(bars)
    }
}
