// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula (recursive, no bias adjustment):
//   alpha  = 2 / (span + 1)
//   EMA_0  = close_0
//   EMA_t  = alpha * close_t + (1 - alpha) * EMA_{t-1}
//
// Because the recursion is seeded with the first value, the EMA is defined at
// every position of the input.
// =============================================================================

/// Compute the EMA series for the given `values` and `span`.
///
/// The output is aligned to the input. Missing inputs (`None`) are skipped:
/// the output at that position is `None` and the recursion resumes from the
/// last defined EMA, so a series that starts with missing values is seeded
/// with its first defined value.
///
/// # Edge cases
/// - `span == 0` => every position `None`
/// - Non-finite results stop the series; later positions are `None`.
pub fn calculate_ema(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if span == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;

    for (slot, value) in result.iter_mut().zip(values) {
        let Some(x) = *value else { continue };
        let ema = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        if !ema.is_finite() {
            // Downstream consumers should not trust a broken series.
            break;
        }
        *slot = Some(ema);
        prev = Some(ema);
    }

    result
}

/// EMA of a plain closing-price slice.
pub fn calculate_ema_closes(closes: &[f64], span: usize) -> Vec<Option<f64>> {
    let wrapped: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    calculate_ema(&wrapped, span)
}
