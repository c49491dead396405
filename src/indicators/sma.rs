// =============================================================================
// Simple Moving Average (SMA) and rolling-window helpers
// =============================================================================
//
// Every rolling computation in this crate produces a vector aligned to its
// input: position `i` describes the window ending at `i`. Positions whose
// window has not filled yet are `None`.
// =============================================================================

/// Apply `f` to every full trailing window of `window` values.
///
/// The output has the same length as `values`; the first `window - 1`
/// positions (or every position, when `window == 0` or the input is shorter
/// than the window) are `None`.
pub(crate) fn rolling<F>(values: &[f64], window: usize, mut f: F) -> Vec<Option<f64>>
where
    F: FnMut(&[f64]) -> Option<f64>,
{
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    for (offset, slice) in values.windows(window).enumerate() {
        out[offset + window - 1] = f(slice).filter(|v| v.is_finite());
    }
    out
}

/// Arithmetic mean of a non-empty slice.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (ddof = 1). `None` for fewer than two values.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Simple moving average over the trailing `window` closes.
pub fn calculate_sma(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(closes, window, mean)
}
