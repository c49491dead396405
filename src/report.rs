// =============================================================================
// Dashboard Report — one fetch-compute pass for a selection
// =============================================================================
//
// Turns a PriceSeries + FundMetadata into the full payload the front-end
// renders: quote snapshot, basic information, chart rows with every indicator
// aligned to its bar, latest readings, classified signals, statistics and the
// recent raw-data table.
// =============================================================================

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::indicators::{
    calculate_bollinger, calculate_macd, calculate_rsi, calculate_sma, compute_stats, SeriesStats,
};
use crate::market_data::{Bar, FundMetadata, MetadataDisplay, PriceSeries};
use crate::runtime_config::IndicatorParams;
use crate::signals::{classify, LatestValues, SignalSummary};
use crate::types::Selection;

pub const DATA_SOURCE: &str = "Yahoo Finance";
pub const DISCLAIMER: &str = "For reference only. Not investment advice.";

// =============================================================================
// IndicatorSet
// =============================================================================

pub const SMA_SHORT: &str = "sma_20";
pub const SMA_MEDIUM: &str = "sma_50";
pub const SMA_LONG: &str = "sma_200";
pub const RSI: &str = "rsi";
pub const MACD: &str = "macd";
pub const MACD_SIGNAL: &str = "macd_signal";
pub const MACD_HIST: &str = "macd_hist";
pub const BB_UPPER: &str = "bb_upper";
pub const BB_MIDDLE: &str = "bb_middle";
pub const BB_LOWER: &str = "bb_lower";

/// Indicator name to a series aligned with the bars it was derived from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorSet {
    len: usize,
    series: BTreeMap<&'static str, Vec<Option<f64>>>,
}

impl IndicatorSet {
    /// Compute every dashboard indicator over the closes of `series`.
    pub fn compute(series: &PriceSeries, params: &IndicatorParams) -> Self {
        let closes = series.closes();
        let [short, medium, long] = params.sma_windows;
        let macd = calculate_macd(&closes, params.macd);
        let bb = calculate_bollinger(&closes, params.bollinger);

        let mut set = Self {
            len: closes.len(),
            series: BTreeMap::new(),
        };
        set.insert(SMA_SHORT, calculate_sma(&closes, short));
        set.insert(SMA_MEDIUM, calculate_sma(&closes, medium));
        set.insert(SMA_LONG, calculate_sma(&closes, long));
        set.insert(RSI, calculate_rsi(&closes, params.rsi_period));
        set.insert(MACD, macd.macd);
        set.insert(MACD_SIGNAL, macd.signal);
        set.insert(MACD_HIST, macd.histogram);
        set.insert(BB_UPPER, bb.upper);
        set.insert(BB_MIDDLE, bb.middle);
        set.insert(BB_LOWER, bb.lower);
        set
    }

    fn insert(&mut self, name: &'static str, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.len, "indicator {name} is misaligned");
        self.series.insert(name, values);
    }

    pub fn get(&self, name: &str) -> Option<&[Option<f64>]> {
        self.series.get(name).map(Vec::as_slice)
    }

    /// Value of `name` at bar `index`; `None` if unknown or not available.
    pub fn at(&self, name: &str, index: usize) -> Option<f64> {
        self.get(name)?.get(index).copied().flatten()
    }

    /// Value of `name` at the latest bar.
    pub fn latest(&self, name: &str) -> Option<f64> {
        self.at(name, self.len.checked_sub(1)?)
    }
}

// =============================================================================
// Report types
// =============================================================================

/// Latest-bar metrics shown in the quote header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteSnapshot {
    pub as_of: DateTime<Utc>,
    pub current_price: f64,
    pub previous_close: Option<f64>,
    pub change: Option<f64>,
    pub change_pct: Option<f64>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub volume_millions: f64,
}

/// One bar with every indicator value at that position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    #[serde(flatten)]
    pub bar: Bar,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataSection {
    pub raw: FundMetadata,
    pub display: MetadataDisplay,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub selection: Selection,
    pub quote: QuoteSnapshot,
    pub metadata: MetadataSection,
    pub latest: LatestValues,
    pub signals: SignalSummary,
    pub stats: SeriesStats,
    pub chart: Vec<ChartRow>,
    pub recent: Vec<Bar>,
    pub generated_at: DateTime<Utc>,
    pub data_fetched_at: Option<DateTime<Utc>>,
    pub cached: bool,
    pub data_source: &'static str,
    pub disclaimer: &'static str,
}

// =============================================================================
// Builders
// =============================================================================

/// Quote header for the latest bar.
///
/// The previous close comes from metadata when published, otherwise from the
/// bar before the latest. Returns `None` for an empty series.
pub fn quote_snapshot(series: &PriceSeries, metadata: &FundMetadata) -> Option<QuoteSnapshot> {
    let last = series.last()?;
    let previous_close = metadata
        .previous_close
        .filter(|v| v.is_finite())
        .or_else(|| series.previous_close());

    let change = previous_close.map(|p| last.close - p);
    let change_pct = match (change, previous_close) {
        (Some(c), Some(p)) if p != 0.0 => Some(c / p * 100.0),
        _ => None,
    };

    Some(QuoteSnapshot {
        as_of: last.timestamp,
        current_price: last.close,
        previous_close,
        change,
        change_pct,
        open: last.open,
        high: last.high,
        low: last.low,
        volume: last.volume,
        volume_millions: last.volume / 1_000_000.0,
    })
}

pub fn latest_values(series: &PriceSeries, indicators: &IndicatorSet) -> LatestValues {
    LatestValues {
        close: series.last().map(|b| b.close),
        sma_20: indicators.latest(SMA_SHORT),
        sma_50: indicators.latest(SMA_MEDIUM),
        sma_200: indicators.latest(SMA_LONG),
        rsi: indicators.latest(RSI),
        macd: indicators.latest(MACD),
        macd_signal: indicators.latest(MACD_SIGNAL),
    }
}

fn chart_rows(series: &PriceSeries, indicators: &IndicatorSet) -> Vec<ChartRow> {
    series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| ChartRow {
            bar: *bar,
            sma_20: indicators.at(SMA_SHORT, i),
            sma_50: indicators.at(SMA_MEDIUM, i),
            sma_200: indicators.at(SMA_LONG, i),
            rsi: indicators.at(RSI, i),
            macd: indicators.at(MACD, i),
            macd_signal: indicators.at(MACD_SIGNAL, i),
            macd_hist: indicators.at(MACD_HIST, i),
            bb_upper: indicators.at(BB_UPPER, i),
            bb_middle: indicators.at(BB_MIDDLE, i),
            bb_lower: indicators.at(BB_LOWER, i),
        })
        .collect()
}

/// Build the full dashboard payload. Fails only when the series is empty.
pub fn build_report(
    selection: Selection,
    series: &PriceSeries,
    metadata: &FundMetadata,
    params: &IndicatorParams,
) -> Result<DashboardReport> {
    let Some(quote) = quote_snapshot(series, metadata) else {
        anyhow::bail!("no price data returned for {selection}");
    };

    let indicators = IndicatorSet::compute(series, params);
    let latest = latest_values(series, &indicators);

    Ok(DashboardReport {
        selection,
        quote,
        metadata: MetadataSection {
            raw: metadata.clone(),
            display: metadata.display(),
        },
        latest,
        signals: classify(&latest),
        stats: compute_stats(&series.closes()),
        chart: chart_rows(series, &indicators),
        recent: series.tail(params.recent_rows).to_vec(),
        generated_at: Utc::now(),
        data_fetched_at: None,
        cached: false,
        data_source: DATA_SOURCE,
        disclaimer: DISCLAIMER,
    })
}
