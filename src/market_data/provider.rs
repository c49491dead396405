// =============================================================================
// MarketDataProvider — seam between the dashboard and the upstream API
// =============================================================================

use anyhow::Result;
use async_trait::async_trait;

use super::{FundMetadata, PriceSeries};
use crate::types::{Interval, Period, Ticker};

/// Upstream source of price history and fund metadata.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// OHLCV history for `ticker` over `period`, sampled every `interval`.
    async fn history(&self, ticker: Ticker, period: Period, interval: Interval)
        -> Result<PriceSeries>;

    /// Descriptive metadata. Fields the upstream does not publish are `None`.
    async fn metadata(&self, ticker: Ticker) -> Result<FundMetadata>;
}
