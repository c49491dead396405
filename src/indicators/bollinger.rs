// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the rolling *sample* standard
// deviation (n - 1 denominator) over the same window as the SMA.

use serde::{Deserialize, Serialize};

use super::sma::{calculate_sma, rolling, sample_std};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerParams {
    pub window: usize,
    pub num_std: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            window: 20,
            num_std: 2.0,
        }
    }
}

/// Aligned band output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Calculate Bollinger Bands for every position of `closes`.
///
/// Positions before the window fills are `None` in all three bands. With a
/// window of one the sample deviation is undefined, so only `middle` is set.
pub fn calculate_bollinger(closes: &[f64], params: BollingerParams) -> BollingerSeries {
    let middle = calculate_sma(closes, params.window);
    let std = rolling(closes, params.window, sample_std);

    let band = |sign: f64| -> Vec<Option<f64>> {
        middle
            .iter()
            .zip(&std)
            .map(|(m, s)| Some((*m)? + sign * params.num_std * (*s)?))
            .collect()
    };

    BollingerSeries {
        upper: band(1.0),
        lower: band(-1.0),
        middle,
    }
}
