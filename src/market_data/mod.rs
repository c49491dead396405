pub mod cache;
pub mod fetcher;
pub mod metadata;
pub mod price_series;
pub mod provider;

// Re-export the core data types for convenient access (e.g. `use crate::market_data::Bar`).
pub use cache::SeriesCache;
pub use fetcher::DataFetcher;
pub use metadata::{FundMetadata, MetadataDisplay};
pub use price_series::{Bar, PriceSeries};
pub use provider::MarketDataProvider;
