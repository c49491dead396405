// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators shown on the
// dashboard. Series outputs are aligned to their input and use `Option<f64>`
// for positions that are not available yet, so callers are forced to handle
// warm-up periods instead of mistaking them for zero.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stats;

pub use bollinger::{calculate_bollinger, BollingerParams};
pub use macd::{calculate_macd, MacdParams};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stats::{compute_stats, SeriesStats};
