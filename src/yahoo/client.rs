// =============================================================================
// Yahoo Finance REST client — chart history and quote-summary metadata
// =============================================================================
//
// The chart endpoint is public. The quote-summary endpoint requires a session
// cookie plus a "crumb" token obtained from /v1/test/getcrumb; the crumb is
// fetched lazily, cached, and refreshed once when the API rejects it.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::RwLock;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::market_data::{Bar, FundMetadata, MarketDataProvider, PriceSeries};
use crate::runtime_config::YahooConfig;
use crate::types::{Interval, Period, Ticker};

/// Quote-summary modules that carry the fund metadata fields.
const SUMMARY_MODULES: &str = "price,summaryDetail,defaultKeyStatistics,fundProfile";

// -----------------------------------------------------------------------------
// Chart response shape
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Yahoo Finance REST client.
pub struct YahooClient {
    base_url: String,
    cookie_url: String,
    client: reqwest::Client,
    crumb: RwLock<Option<String>>,
}

impl YahooClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    pub fn new(config: &YahooConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "YahooClient initialised");

        Ok(Self {
            base_url,
            cookie_url: config.cookie_url.clone(),
            client,
            crumb: RwLock::new(None),
        })
    }

    // -------------------------------------------------------------------------
    // Chart history
    // -------------------------------------------------------------------------

    /// GET /v8/finance/chart/{ticker}?range=..&interval=..
    #[instrument(skip(self), name = "yahoo::get_chart")]
    pub async fn get_chart(
        &self,
        ticker: Ticker,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}&includePrePost=false",
            self.base_url, ticker, period, interval
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET /v8/finance/chart request failed")?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("failed to read chart response body")?;

        // Yahoo reports API errors inside the JSON envelope even on 4xx.
        let envelope: ChartEnvelope = match serde_json::from_str(&text) {
            Ok(env) => env,
            Err(e) if status.is_success() => {
                return Err(e).context("failed to parse chart response");
            }
            Err(_) => anyhow::bail!("Yahoo GET /v8/finance/chart returned {status}: {text}"),
        };

        let series = parse_chart(envelope)?;
        if series.is_empty() {
            warn!(%ticker, %period, %interval, "chart returned no usable rows");
        }
        debug!(%ticker, %period, %interval, bars = series.len(), "chart fetched");
        Ok(series)
    }

    // -------------------------------------------------------------------------
    // Quote summary
    // -------------------------------------------------------------------------

    /// GET /v10/finance/quoteSummary/{ticker} with the metadata modules.
    #[instrument(skip(self), name = "yahoo::get_quote_summary")]
    pub async fn get_quote_summary(&self, ticker: Ticker) -> Result<FundMetadata> {
        let crumb = self.crumb(false).await?;
        let (status, body) = self.quote_summary_request(ticker, &crumb).await?;

        let (status, body) = if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
        {
            warn!(%ticker, %status, "crumb rejected, refreshing");
            let crumb = self.crumb(true).await?;
            self.quote_summary_request(ticker, &crumb).await?
        } else {
            (status, body)
        };

        if !status.is_success() {
            anyhow::bail!("Yahoo GET /v10/finance/quoteSummary returned {status}: {body}");
        }

        let result = body["quoteSummary"]["result"]
            .as_array()
            .and_then(|arr| arr.first())
            .context("quoteSummary response has no result")?;

        debug!(%ticker, "quote summary retrieved");
        Ok(parse_quote_summary(result))
    }

    async fn quote_summary_request(
        &self,
        ticker: Ticker,
        crumb: &str,
    ) -> Result<(StatusCode, serde_json::Value)> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}",
            self.base_url, ticker
        );

        let resp = self
            .client
            .get(&url)
            .query(&[("modules", SUMMARY_MODULES), ("crumb", crumb)])
            .send()
            .await
            .context("GET /v10/finance/quoteSummary request failed")?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("failed to read quoteSummary response body")?;

        // Rejections are not always JSON; keep the raw text for the error.
        let body = match serde_json::from_str(&text) {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(e).context("failed to parse quoteSummary response");
            }
            Err(_) => serde_json::Value::String(text),
        };
        Ok((status, body))
    }

    /// Cached crumb, or a freshly issued one when `refresh` is set or none is
    /// cached yet.
    async fn crumb(&self, refresh: bool) -> Result<String> {
        if !refresh {
            let cached = self.crumb.read().clone();
            if let Some(c) = cached {
                return Ok(c);
            }
        }

        // The cookie page itself answers 404; only the Set-Cookie matters.
        if let Err(e) = self.client.get(&self.cookie_url).send().await {
            debug!(url = %self.cookie_url, error = %e, "cookie request failed");
        }

        let url = format!("{}/v1/test/getcrumb", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET /v1/test/getcrumb request failed")?;

        let status = resp.status();
        let crumb = resp
            .text()
            .await
            .context("failed to read crumb response")?
            .trim()
            .to_string();

        if !status.is_success() || crumb.is_empty() || crumb.contains('<') {
            anyhow::bail!("Yahoo GET /v1/test/getcrumb returned {status}");
        }

        *self.crumb.write() = Some(crumb.clone());
        Ok(crumb)
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn history(
        &self,
        ticker: Ticker,
        period: Period,
        interval: Interval,
    ) -> Result<PriceSeries> {
        self.get_chart(ticker, period, interval).await
    }

    async fn metadata(&self, ticker: Ticker) -> Result<FundMetadata> {
        self.get_quote_summary(ticker).await
    }
}

impl std::fmt::Debug for YahooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooClient")
            .field("base_url", &self.base_url)
            .field("cookie_url", &self.cookie_url)
            .field("crumb", &self.crumb.read().as_ref().map(|_| "<cached>"))
            .finish()
    }
}

// =============================================================================
// Response parsing
// =============================================================================

fn parse_chart(envelope: ChartEnvelope) -> Result<PriceSeries> {
    if let Some(error) = envelope.chart.error {
        anyhow::bail!("Yahoo API error: {} - {}", error.code, error.description);
    }

    let result = envelope
        .chart
        .result
        .context("no data in chart response")?
        .into_iter()
        .next()
        .context("empty chart result array")?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    let mut skipped = 0usize;

    for (i, &ts) in result.timestamp.iter().enumerate() {
        let at = |v: &Vec<Option<f64>>| v.get(i).copied().flatten().filter(|x| x.is_finite());

        let Some(close) = at(&quote.close) else {
            skipped += 1;
            continue;
        };
        let Some(timestamp) = Utc.timestamp_opt(ts, 0).single() else {
            skipped += 1;
            continue;
        };

        let open = at(&quote.open).unwrap_or(close);
        let high = at(&quote.high).unwrap_or(close);
        let low = at(&quote.low).unwrap_or(close);
        let volume = at(&quote.volume).unwrap_or(0.0);
        bars.push(Bar::new(timestamp, open, high, low, close, volume));
    }

    if skipped > 0 {
        debug!(skipped, "skipped chart rows without a close");
    }

    Ok(PriceSeries::from_bars(bars))
}

/// Numeric field that Yahoo wraps as `{ "raw": 1.23, "fmt": "1.23" }` or,
/// in some modules, emits as a bare number.
fn raw_f64(value: &serde_json::Value) -> Option<f64> {
    value
        .get("raw")
        .and_then(|v| v.as_f64())
        .or_else(|| value.as_f64())
        .filter(|v| v.is_finite())
}

fn text(value: &serde_json::Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_quote_summary(result: &serde_json::Value) -> FundMetadata {
    let price = &result["price"];
    let detail = &result["summaryDetail"];
    let stats = &result["defaultKeyStatistics"];
    let fund = &result["fundProfile"];

    // First source that publishes the field wins.
    let first = |candidates: &[&serde_json::Value]| candidates.iter().find_map(|v| raw_f64(v));

    FundMetadata {
        long_name: text(&price["longName"]).or_else(|| text(&price["shortName"])),
        category: text(&fund["categoryName"]).or_else(|| text(&stats["category"])),
        previous_close: first(&[&detail["previousClose"], &price["regularMarketPreviousClose"]]),
        fifty_two_week_high: raw_f64(&detail["fiftyTwoWeekHigh"]),
        fifty_two_week_low: raw_f64(&detail["fiftyTwoWeekLow"]),
        total_assets: first(&[&detail["totalAssets"], &stats["totalAssets"]]),
        expense_ratio: first(&[
            &stats["annualReportExpenseRatio"],
            &fund["feesExpensesInvestment"]["annualReportExpenseRatio"],
            &detail["expenseRatio"],
        ]),
        dividend_yield: first(&[&detail["yield"], &detail["trailingAnnualDividendYield"]]),
        beta_3y: raw_f64(&stats["beta3Year"]),
        average_volume: first(&[&detail["averageVolume"], &price["averageDailyVolume3Month"]]),
    }
}
