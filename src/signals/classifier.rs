// =============================================================================
// Signal Classifier — latest indicator values to human-readable categories
// =============================================================================
//
// Every comparison is guarded by an availability check first: an indicator
// still warming up yields `InsufficientData`, never a comparison against 0.
// =============================================================================

use serde::Serialize;

/// RSI above this is overbought.
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// RSI below this is oversold.
pub const RSI_OVERSOLD: f64 = 30.0;

/// Colour hint for the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Negative,
    Caution,
    Neutral,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendSignal {
    StrongUptrend,
    StrongDowntrend,
    MildBullish,
    MildBearish,
    InsufficientData,
}

impl TrendSignal {
    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongUptrend => "strong uptrend",
            Self::StrongDowntrend => "strong downtrend",
            Self::MildBullish => "mild bullish",
            Self::MildBearish => "mild bearish",
            Self::InsufficientData => "insufficient data",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::StrongUptrend => Tone::Positive,
            Self::StrongDowntrend => Tone::Negative,
            Self::MildBullish => Tone::Neutral,
            Self::MildBearish => Tone::Caution,
            Self::InsufficientData => Tone::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiSignal {
    Overbought,
    Oversold,
    Neutral,
    InsufficientData,
}

impl RsiSignal {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Overbought => "overbought",
            Self::Oversold => "oversold",
            Self::Neutral => "neutral",
            Self::InsufficientData => "insufficient data",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::Overbought => Tone::Negative,
            Self::Oversold => Tone::Positive,
            Self::Neutral => Tone::Neutral,
            Self::InsufficientData => Tone::Unknown,
        }
    }

    /// Advisory text shown next to the extreme readings.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Overbought => Some("consider taking profits"),
            Self::Oversold => Some("possible buying opportunity"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdSignal {
    Bullish,
    Bearish,
    InsufficientData,
}

impl MacdSignal {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::InsufficientData => "insufficient data",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Self::Bullish => Tone::Positive,
            Self::Bearish => Tone::Negative,
            Self::InsufficientData => Tone::Unknown,
        }
    }
}

/// Most recent value of every indicator the classifier looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatestValues {
    pub close: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
}

/// One classified reading, flattened for the JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalReading<S> {
    pub signal: S,
    pub label: &'static str,
    pub tone: Tone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalSummary {
    pub trend: SignalReading<TrendSignal>,
    pub rsi: SignalReading<RsiSignal>,
    pub macd: SignalReading<MacdSignal>,
}

pub fn classify_trend(
    close: Option<f64>,
    sma_20: Option<f64>,
    sma_50: Option<f64>,
    sma_200: Option<f64>,
) -> TrendSignal {
    let (Some(c), Some(s20), Some(s50), Some(s200)) = (close, sma_20, sma_50, sma_200) else {
        return TrendSignal::InsufficientData;
    };

    if c > s20 && s20 > s50 && s50 > s200 {
        TrendSignal::StrongUptrend
    } else if c < s20 && s20 < s50 && s50 < s200 {
        TrendSignal::StrongDowntrend
    } else if c > s50 {
        TrendSignal::MildBullish
    } else {
        TrendSignal::MildBearish
    }
}

pub fn classify_rsi(rsi: Option<f64>) -> RsiSignal {
    match rsi {
        None => RsiSignal::InsufficientData,
        Some(v) if v > RSI_OVERBOUGHT => RsiSignal::Overbought,
        Some(v) if v < RSI_OVERSOLD => RsiSignal::Oversold,
        Some(_) => RsiSignal::Neutral,
    }
}

pub fn classify_macd(macd: Option<f64>, signal: Option<f64>) -> MacdSignal {
    match (macd, signal) {
        (Some(m), Some(s)) if m > s => MacdSignal::Bullish,
        (Some(_), Some(_)) => MacdSignal::Bearish,
        _ => MacdSignal::InsufficientData,
    }
}

/// Classify all three signals from the latest indicator values.
pub fn classify(latest: &LatestValues) -> SignalSummary {
    let trend = classify_trend(latest.close, latest.sma_20, latest.sma_50, latest.sma_200);
    let rsi = classify_rsi(latest.rsi);
    let macd = classify_macd(latest.macd, latest.macd_signal);

    SignalSummary {
        trend: SignalReading {
            signal: trend,
            label: trend.label(),
            tone: trend.tone(),
            value: None,
            hint: None,
        },
        rsi: SignalReading {
            signal: rsi,
            label: rsi.label(),
            tone: rsi.tone(),
            value: latest.rsi,
            hint: rsi.hint(),
        },
        macd: SignalReading {
            signal: macd,
            label: macd.label(),
            tone: macd.tone(),
            value: match (latest.macd, latest.macd_signal) {
                (Some(m), Some(s)) => Some(m - s),
                _ => None,
            },
            hint: None,
        },
    }
}
