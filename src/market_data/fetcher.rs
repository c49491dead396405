// =============================================================================
// DataFetcher — cached history + metadata retrieval for one selection
// =============================================================================
//
// History is mandatory: if it fails the request fails. Metadata is
// best-effort: an upstream error degrades to an empty record whose fields
// all render as "N/A".
// =============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use super::cache::{CachedFetch, SeriesCache};
use super::provider::MarketDataProvider;
use super::FundMetadata;
use crate::types::Selection;

pub struct DataFetcher {
    provider: Arc<dyn MarketDataProvider>,
    cache: SeriesCache,
}

impl DataFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, cache: SeriesCache) -> Self {
        Self { provider, cache }
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// Fetch (or reuse) the series and metadata for `selection`.
    ///
    /// The boolean is `true` when the result was served from the cache.
    #[instrument(skip_all, fields(selection = %selection))]
    pub async fn fetch(&self, selection: Selection) -> Result<(CachedFetch, bool)> {
        self.cache
            .get_or_fetch(selection, || self.fetch_upstream(selection))
            .await
    }

    async fn fetch_upstream(&self, selection: Selection) -> Result<CachedFetch> {
        let Selection {
            ticker,
            period,
            interval,
        } = selection;

        let (history, metadata) = tokio::join!(
            self.provider.history(ticker, period, interval),
            self.provider.metadata(ticker),
        );

        let series =
            history.with_context(|| format!("failed to load price history for {selection}"))?;

        let metadata = metadata.unwrap_or_else(|e| {
            warn!(ticker = %ticker, error = %e, "metadata unavailable, showing placeholders");
            FundMetadata::default()
        });

        info!(
            selection = %selection,
            bars = series.len(),
            "fetched market data from upstream"
        );

        Ok(CachedFetch::new(series, metadata))
    }
}
