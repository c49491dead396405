// =============================================================================
// Shared types used across the ETF Pulse dashboard
// =============================================================================
//
// The three user selections (ticker, lookback period, sampling interval) are
// closed enums. Their wire form is exactly the string Yahoo Finance expects,
// so `as_str()` is used both for query parameters and for JSON output.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Error returned when a selection string is not one of the allowed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSelectionError {
    pub field: &'static str,
    pub value: String,
    pub allowed: Vec<&'static str>,
}

impl std::fmt::Display for ParseSelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid {} '{}': expected one of {}",
            self.field,
            self.value,
            self.allowed.join(", ")
        )
    }
}

impl std::error::Error for ParseSelectionError {}

/// Implements `as_str`, `ALL`, `Display` and `FromStr` for a selection enum.
macro_rules! selection_enum {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn allowed() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseSelectionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| ParseSelectionError {
                        field: $field,
                        value: s.to_string(),
                        allowed: Self::allowed(),
                    })
            }
        }
    };
}

/// ETFs offered by the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Ticker {
    #[default]
    Voo,
    Qqq,
    Vt,
    Spy,
    Ivv,
    Vti,
}

selection_enum!(Ticker, "ticker", {
    Voo => "VOO",
    Qqq => "QQQ",
    Vt => "VT",
    Spy => "SPY",
    Ivv => "IVV",
    Vti => "VTI",
});

/// Lookback window passed to the chart endpoint as `range`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

selection_enum!(Period, "period", {
    OneMonth => "1mo",
    ThreeMonths => "3mo",
    SixMonths => "6mo",
    OneYear => "1y",
    TwoYears => "2y",
    FiveYears => "5y",
});

/// Sampling interval of each bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
    #[serde(rename = "1mo")]
    Monthly,
}

selection_enum!(Interval, "interval", {
    Daily => "1d",
    Weekly => "1wk",
    Monthly => "1mo",
});

/// A complete user selection; also the cache key for fetched data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Selection {
    pub ticker: Ticker,
    pub period: Period,
    pub interval: Interval,
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.ticker, self.period, self.interval)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(" qqq ".parse::<Ticker>().unwrap(), Ticker::Qqq);
        assert_eq!("1WK".parse::<Interval>().unwrap(), Interval::Weekly);
        assert_eq!("5y".parse::<Period>().unwrap(), Period::FiveYears);
    }

    #[test]
    fn one_month_is_both_a_period_and_an_interval() {
        assert_eq!("1mo".parse::<Period>().unwrap(), Period::OneMonth);
        assert_eq!("1mo".parse::<Interval>().unwrap(), Interval::Monthly);
    }

    #[test]
    fn unknown_value_lists_allowed_set() {
        let err = "AAPL".parse::<Ticker>().unwrap_err();
        assert_eq!(err.field, "ticker");
        assert_eq!(err.allowed, vec!["VOO", "QQQ", "VT", "SPY", "IVV", "VTI"]);
        assert!(err.to_string().contains("AAPL"));
    }

    #[test]
    fn serde_uses_wire_strings() {
        let sel = Selection {
            ticker: Ticker::Spy,
            period: Period::SixMonths,
            interval: Interval::Weekly,
        };
        let json = serde_json::to_value(sel).unwrap();
        assert_eq!(json["ticker"], "SPY");
        assert_eq!(json["period"], "6mo");
        assert_eq!(json["interval"], "1wk");
    }

    #[test]
    fn defaults_match_dashboard_startup() {
        let sel = Selection::default();
        assert_eq!(sel.to_string(), "VOO/1y/1d");
    }

    #[test]
    fn every_variant_roundtrips_through_display() {
        for t in Ticker::ALL {
            assert_eq!(t.to_string().parse::<Ticker>().unwrap(), *t);
        }
        assert_eq!(Period::ALL.len(), 6);
        assert_eq!(Interval::ALL.len(), 3);
    }
}
