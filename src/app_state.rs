// =============================================================================
// Central Application State — ETF Pulse dashboard
// =============================================================================
//
// Shared across request handlers via `Arc<AppState>`. Configuration is fixed
// after startup; the only mutable shared state is the series cache inside the
// fetcher, which manages its own interior mutability.
// =============================================================================

use std::sync::Arc;
use std::time::Instant;

use crate::market_data::{DataFetcher, MarketDataProvider, SeriesCache};
use crate::runtime_config::DashboardConfig;

pub struct AppState {
    pub config: DashboardConfig,
    pub fetcher: DataFetcher,

    /// Used for uptime in the health endpoint.
    pub start_time: Instant,
}

impl AppState {
    /// Wire the fetcher and cache for `provider` using the TTL from `config`.
    pub fn new(config: DashboardConfig, provider: Arc<dyn MarketDataProvider>) -> Self {
        let cache = SeriesCache::new(config.cache_ttl());
        Self {
            fetcher: DataFetcher::new(provider, cache),
            config,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
