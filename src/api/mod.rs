//! Market data clients: daily bars from the chart API, with optional caching.

mod cache;
mod data_client;
mod types;

pub use cache::{CachedProvider, DEFAULT_FRESHNESS};
pub use data_client::DataClient;
pub use types::*;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Bar;

/// Source of daily OHLC bars for a ticker symbol.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Time-ordered daily bars, oldest first.
    async fn daily_bars(&self, symbol: &str) -> Result<Vec<Bar>>;
}
