// =============================================================================
// Whole-series statistics: volatility, max drawdown, Sharpe ratio
// =============================================================================
//
// Returns are simple percentage changes between consecutive closes. The
// annualisation factor assumes 252 trading periods regardless of the bar
// interval, as the dashboard always has.

use serde::Serialize;

use super::sma::{mean, sample_std};

const PERIODS_PER_YEAR: f64 = 252.0;

/// Scalar statistics derived from the full closing-price series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeriesStats {
    /// Annualised volatility of returns, in percent.
    pub volatility_pct: Option<f64>,
    /// Deepest decline from a running peak, in percent (always <= 0).
    pub max_drawdown_pct: Option<f64>,
    /// Mean return over its deviation, annualised; no risk-free rate.
    pub sharpe_ratio: Option<f64>,
}

/// Percentage change between consecutive closes.
///
/// A step whose previous close is zero has no defined return and is skipped.
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .filter(|r| r.is_finite())
        .collect()
}

/// Maximum drawdown in percent; `None` for an empty series.
pub fn max_drawdown_pct(closes: &[f64]) -> Option<f64> {
    let mut peak = f64::NEG_INFINITY;
    let mut worst: Option<f64> = None;

    for &close in closes {
        peak = peak.max(close);
        if peak == 0.0 {
            continue;
        }
        let dd = (close / peak - 1.0) * 100.0;
        worst = Some(worst.map_or(dd, |w: f64| w.min(dd)));
    }
    worst
}

pub fn compute_stats(closes: &[f64]) -> SeriesStats {
    let returns = simple_returns(closes);
    let std = sample_std(&returns);
    let sqrt_year = PERIODS_PER_YEAR.sqrt();

    let sharpe_ratio = std.and_then(|sd| {
        if sd == 0.0 {
            return Some(0.0);
        }
        mean(&returns).map(|m| m / sd * sqrt_year)
    });

    SeriesStats {
        volatility_pct: std.map(|sd| sd * sqrt_year * 100.0),
        max_drawdown_pct: max_drawdown_pct(closes),
        sharpe_ratio,
    }
}
