//! Time-windowed cache around a market data provider.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::Bar;

use super::MarketDataProvider;

/// How long a fetched series is treated as current.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(60 * 60);

struct CachedSeries {
    fetched_at: Instant,
    bars: Vec<Bar>,
}

/// Serves repeated requests for the same symbol from memory until the
/// freshness window elapses. Failed fetches are never cached.
pub struct CachedProvider<P> {
    inner: P,
    freshness: Duration,
    entries: RwLock<HashMap<String, CachedSeries>>,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    pub fn new(inner: P, freshness: Duration) -> Self {
        Self {
            inner,
            freshness,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// Drop the cached series for `symbol`, forcing the next call to fetch.
    pub async fn invalidate(&self, symbol: &str) {
        self.entries.write().await.remove(&cache_key(symbol));
    }

    async fn fresh(&self, key: &str) -> Option<Vec<Bar>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.freshness)
            .map(|entry| entry.bars.clone())
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    async fn daily_bars(&self, symbol: &str) -> Result<Vec<Bar>> {
        let key = cache_key(symbol);

        if let Some(bars) = self.fresh(&key).await {
            debug!(symbol = %symbol, "Market data cache hit");
            return Ok(bars);
        }

        debug!(symbol = %symbol, "Market data cache miss");
        let bars = self.inner.daily_bars(symbol).await?;

        self.entries.write().await.insert(
            key,
            CachedSeries {
                fetched_at: Instant::now(),
                bars: bars.clone(),
            },
        );

        Ok(bars)
    }
}

fn cache_key(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
