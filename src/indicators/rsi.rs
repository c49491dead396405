// =============================================================================
// Relative Strength Index (RSI) — rolling-mean formulation
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes. The first
//          close has no predecessor and contributes a zero change.
// Step 2 — gain = max(delta, 0), loss = max(-delta, 0).
// Step 3 — Simple rolling mean of gains and losses over `period` steps.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Thresholds:  RSI > 70 => overbought,  RSI < 30 => oversold.
// =============================================================================

use super::sma::calculate_sma;

/// Default look-back used by the dashboard.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Compute the RSI series for the given `closes` and `period`.
///
/// The returned vector is aligned to `closes`; the first `period - 1`
/// positions are `None`.
///
/// # Edge cases
/// - `period == 0` => every position `None`
/// - Average loss zero with positive average gain => 100.0
/// - Average loss and average gain both zero (flat market) => 50.0
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if closes.is_empty() {
        return Vec::new();
    }

    // --- Gains / losses, aligned to closes ------------------------------------
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    gains.push(0.0);
    losses.push(0.0);
    for w in closes.windows(2) {
        let delta = w[1] - w[0];
        gains.push(if delta > 0.0 { delta } else { 0.0 });
        losses.push(if delta < 0.0 { -delta } else { 0.0 });
    }

    let avg_gain = calculate_sma(&gains, period);
    let avg_loss = calculate_sma(&losses, period);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(g, l)| rsi_from_averages(g?, l?))
        .collect()
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - If both averages are zero, RSI is 50.0 (no movement).
/// - If average loss is zero (only gains), RSI is 100.0.
/// - Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn defined(series: &[Option<f64>]) -> Vec<f64> {
        series.iter().flatten().copied().collect()
    }

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_period_zero() {
        assert_eq!(calculate_rsi(&[1.0, 2.0, 3.0], 0), vec![None, None, None]);
    }

    #[test]
    fn rsi_warmup_positions_are_missing() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), 20);
        assert!(series[..13].iter().all(Option::is_none));
        assert!(series[13..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_all_gains_saturates_at_100() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let values = defined(&calculate_rsi(&closes, 14));
        assert!(!values.is_empty());
        for v in values {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        for v in defined(&calculate_rsi(&closes, 14)) {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market_is_neutral() {
        let closes = vec![100.0; 30];
        for v in defined(&calculate_rsi(&closes, 14)) {
            assert!((v - 50.0).abs() < 1e-10, "expected 50.0, got {v}");
        }
    }

    #[test]
    fn rsi_known_value() {
        // period 2 at index 2: gains [1, 0] -> 0.5, losses [0, 2] -> 1.0
        // RS = 0.5, RSI = 100 - 100 / 1.5
        let series = calculate_rsi(&[10.0, 11.0, 9.0], 2);
        assert!(series[0].is_none());
        // index 1 window: gains [0, 1], losses [0, 0] => 100
        assert!((series[1].unwrap() - 100.0).abs() < 1e-10);
        let expected = 100.0 - 100.0 / 1.5;
        assert!((series[2].unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn rsi_range_check_oscillating() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + 8.0 * (i as f64 * 0.37).sin() + (i % 7) as f64)
            .collect();
        for v in defined(&calculate_rsi(&closes, 14)) {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_range_check_reference_data() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let values = defined(&calculate_rsi(&closes, 14));
        assert_eq!(values.len(), 5);
        for v in values {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }
}
