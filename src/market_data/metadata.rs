// =============================================================================
// Fund metadata — descriptive fields that may or may not be published
// =============================================================================
//
// Every field is optional. Display formatting never fails: a missing value
// renders as "N/A". For the size/ratio fields a reported zero is treated the
// same as missing, since the provider uses 0 as a placeholder for them.
// =============================================================================

use serde::{Deserialize, Serialize};

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundMetadata {
    pub long_name: Option<String>,
    pub category: Option<String>,
    pub previous_close: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    /// Net assets in USD.
    pub total_assets: Option<f64>,
    /// Fraction, e.g. 0.0003 for 0.03%.
    pub expense_ratio: Option<f64>,
    /// Fraction, e.g. 0.013 for 1.3%.
    pub dividend_yield: Option<f64>,
    pub beta_3y: Option<f64>,
    pub average_volume: Option<f64>,
}

/// Pre-formatted strings for the "basic information" panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataDisplay {
    pub long_name: String,
    pub category: String,
    pub fifty_two_week_high: String,
    pub fifty_two_week_low: String,
    pub total_assets: String,
    pub expense_ratio: String,
    pub dividend_yield: String,
    pub beta_3y: String,
    pub average_volume: String,
}

fn text_or_na(value: &Option<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

fn fmt_or_na(value: Option<f64>, f: impl FnOnce(f64) -> String) -> String {
    value
        .filter(|v| v.is_finite())
        .map(f)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

impl FundMetadata {
    pub fn display(&self) -> MetadataDisplay {
        MetadataDisplay {
            long_name: text_or_na(&self.long_name),
            category: text_or_na(&self.category),
            fifty_two_week_high: fmt_or_na(self.fifty_two_week_high, |v| format!("${v:.2}")),
            fifty_two_week_low: fmt_or_na(self.fifty_two_week_low, |v| format!("${v:.2}")),
            total_assets: fmt_or_na(nonzero(self.total_assets), |v| format!("${:.2}B", v / 1e9)),
            expense_ratio: fmt_or_na(nonzero(self.expense_ratio), |v| format!("{:.2}%", v * 100.0)),
            dividend_yield: fmt_or_na(nonzero(self.dividend_yield), |v| {
                format!("{:.2}%", v * 100.0)
            }),
            beta_3y: fmt_or_na(self.beta_3y, |v| format!("{v:.2}")),
            average_volume: fmt_or_na(nonzero(self.average_volume), |v| {
                format!("{:.1}M", v / 1e6)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_metadata_renders_all_na() {
        let d = FundMetadata::default().display();
        for field in [
            &d.long_name,
            &d.category,
            &d.fifty_two_week_high,
            &d.fifty_two_week_low,
            &d.total_assets,
            &d.expense_ratio,
            &d.dividend_yield,
            &d.beta_3y,
            &d.average_volume,
        ] {
            assert_eq!(field, NOT_AVAILABLE);
        }
    }

    #[test]
    fn populated_metadata_is_formatted() {
        let meta = FundMetadata {
            long_name: Some("Vanguard S&P 500 ETF".into()),
            category: Some("Large Blend".into()),
            previous_close: Some(500.0),
            fifty_two_week_high: Some(512.349),
            fifty_two_week_low: Some(401.1),
            total_assets: Some(1_234_000_000_000.0),
            expense_ratio: Some(0.0003),
            dividend_yield: Some(0.0131),
            beta_3y: Some(1.0),
            average_volume: Some(5_430_000.0),
        };
        let d = meta.display();
        assert_eq!(d.long_name, "Vanguard S&P 500 ETF");
        assert_eq!(d.fifty_two_week_high, "$512.35");
        assert_eq!(d.total_assets, "$1234.00B");
        assert_eq!(d.expense_ratio, "0.03%");
        assert_eq!(d.dividend_yield, "1.31%");
        assert_eq!(d.beta_3y, "1.00");
        assert_eq!(d.average_volume, "5.4M");
    }

    #[test]
    fn zero_placeholders_render_as_na() {
        let meta = FundMetadata {
            total_assets: Some(0.0),
            expense_ratio: Some(0.0),
            dividend_yield: Some(0.0),
            average_volume: Some(0.0),
            beta_3y: Some(0.0),
            long_name: Some("   ".into()),
            ..Default::default()
        };
        let d = meta.display();
        assert_eq!(d.total_assets, NOT_AVAILABLE);
        assert_eq!(d.expense_ratio, NOT_AVAILABLE);
        assert_eq!(d.dividend_yield, NOT_AVAILABLE);
        assert_eq!(d.average_volume, NOT_AVAILABLE);
        assert_eq!(d.long_name, NOT_AVAILABLE);
        // A zero beta is a real reading.
        assert_eq!(d.beta_3y, "0.00");
    }
}
