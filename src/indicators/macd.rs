// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   macd      = EMA(close, fast) - EMA(close, slow)
//   signal    = EMA(macd, signal_span)
//   histogram = macd - signal
//
// All three EMAs use the recursive, first-value-seeded form from `ema.rs`.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ema::{calculate_ema, calculate_ema_closes};

/// Spans for the three EMAs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

/// Aligned MACD output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

pub fn calculate_macd(closes: &[f64], params: MacdParams) -> MacdSeries {
    let fast = calculate_ema_closes(closes, params.fast);
    let slow = calculate_ema_closes(closes, params.slow);

    let macd: Vec<Option<f64>> = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let signal = calculate_ema(&macd, params.signal);

    let histogram = macd
        .iter()
        .zip(&signal)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 50.0 + 5.0 * (i as f64 * 0.21).sin() + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn macd_is_aligned_and_defined_from_start() {
        let closes = wave(60);
        let out = calculate_macd(&closes, MacdParams::default());
        assert_eq!(out.macd.len(), 60);
        assert_eq!(out.signal.len(), 60);
        assert_eq!(out.histogram.len(), 60);
        assert!(out.histogram.iter().all(Option::is_some));
        // Both EMAs seed on the first close, so the line starts at zero.
        assert_eq!(out.macd[0], Some(0.0));
    }

    #[test]
    fn histogram_is_macd_minus_signal() {
        let out = calculate_macd(&wave(120), MacdParams::default());
        for i in 0..120 {
            let (m, s, h) = (out.macd[i], out.signal[i], out.histogram[i]);
            if let (Some(m), Some(s), Some(h)) = (m, s, h) {
                assert_eq!(h, m - s, "index {i}");
            }
        }
    }

    #[test]
    fn rising_series_has_positive_macd() {
        let closes: Vec<f64> = (1..=80).map(|x| x as f64).collect();
        let out = calculate_macd(&closes, MacdParams::default());
        let last = out.macd.last().copied().flatten().unwrap();
        assert!(last > 0.0);
    }

    #[test]
    fn empty_input_is_empty() {
        let out = calculate_macd(&[], MacdParams::default());
        assert!(out.macd.is_empty() && out.signal.is_empty() && out.histogram.is_empty());
    }
}
