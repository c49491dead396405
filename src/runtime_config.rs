// =============================================================================
// Runtime Configuration — dashboard settings with env overrides
// =============================================================================
//
// Settings are read once at startup from an optional JSON file. All fields
// carry `#[serde(default)]` so that a partial (or absent) file still yields a
// complete configuration. Environment variables are applied on top, so a
// deployment can set the port without shipping a file at all.
//
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::indicators::{BollingerParams, MacdParams};
use crate::types::Selection;

/// Default path of the optional settings file.
pub const DEFAULT_CONFIG_PATH: &str = "dashboard_config.json";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_cookie_url() -> String {
    "https://fc.yahoo.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
        .to_string()
}

fn default_sma_windows() -> [usize; 3] {
    [20, 50, 200]
}

fn default_rsi_period() -> usize {
    crate::indicators::rsi::DEFAULT_RSI_PERIOD
}

fn default_recent_rows() -> usize {
    20
}

// =============================================================================
// Sections
// =============================================================================

/// Upstream market-data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YahooConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Page that sets the session cookie needed before a crumb is issued.
    #[serde(default = "default_cookie_url")]
    pub cookie_url: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Yahoo rejects requests without a browser-like agent.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cookie_url: default_cookie_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Indicator windows and spans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorParams {
    /// Short / medium / long SMA windows used by the trend classifier.
    #[serde(default = "default_sma_windows")]
    pub sma_windows: [usize; 3],

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default)]
    pub macd: MacdParams,

    #[serde(default)]
    pub bollinger: BollingerParams,

    /// Rows in the raw-data table.
    #[serde(default = "default_recent_rows")]
    pub recent_rows: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_windows: default_sma_windows(),
            rsi_period: default_rsi_period(),
            macd: MacdParams::default(),
            bollinger: BollingerParams::default(),
            recent_rows: default_recent_rows(),
        }
    }
}

// =============================================================================
// DashboardConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Interface to bind. All interfaces by default.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// How long a fetched series is reused before refetching.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Selection used for any query parameter the client omits.
    #[serde(default)]
    pub default_selection: Selection,

    #[serde(default)]
    pub yahoo: YahooConfig,

    #[serde(default)]
    pub indicators: IndicatorParams,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cache_ttl_secs: default_cache_ttl_secs(),
            default_selection: Selection::default(),
            yahoo: YahooConfig::default(),
            indicators: IndicatorParams::default(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dashboard config from {}", path.display()))?;

        info!(
            path = %path.display(),
            port = config.port,
            cache_ttl_secs = config.cache_ttl_secs,
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    ///
    /// `PORT` takes precedence over `ZEABUR_PORT`. Unparseable values are
    /// ignored with a warning.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ["PORT", "ZEABUR_PORT"] {
            let Some(raw) = lookup(key) else { continue };
            match raw.trim().parse::<u16>() {
                Ok(port) => {
                    self.port = port;
                    break;
                }
                Err(_) => warn!(var = key, value = %raw, "ignoring non-numeric port"),
            }
        }

        if let Some(host) = lookup("ETF_PULSE_BIND_HOST").filter(|h| !h.trim().is_empty()) {
            self.host = host.trim().to_string();
        }

        if let Some(raw) = lookup("ETF_PULSE_CACHE_TTL_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(ttl) => self.cache_ttl_secs = ttl,
                Err(_) => warn!(value = %raw, "ignoring invalid ETF_PULSE_CACHE_TTL_SECS"),
            }
        }

        if let Some(url) = lookup("ETF_PULSE_YAHOO_BASE_URL").filter(|u| !u.trim().is_empty()) {
            self.yahoo.base_url = url.trim().to_string();
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::types::{Interval, Period, Ticker};

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn default_config_has_expected_values() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8501");
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(300));
        assert_eq!(cfg.default_selection.ticker, Ticker::Voo);
        assert_eq!(cfg.default_selection.period, Period::OneYear);
        assert_eq!(cfg.default_selection.interval, Interval::Daily);
        assert_eq!(cfg.indicators.sma_windows, [20, 50, 200]);
        assert_eq!(cfg.indicators.rsi_period, 14);
        assert_eq!(cfg.indicators.macd, MacdParams::default());
        assert_eq!(cfg.indicators.bollinger.window, 20);
        assert_eq!(cfg.indicators.recent_rows, 20);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.port, 8501);
        assert_eq!(cfg.yahoo.base_url, "https://query1.finance.yahoo.com");
        assert_eq!(cfg.yahoo.timeout_secs, 10);
        assert_eq!(cfg.yahoo.cookie_url, "https://fc.yahoo.com");
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "port": 9000,
            "default_selection": { "ticker": "QQQ", "period": "6mo", "interval": "1wk" },
            "indicators": { "rsi_period": 9 }
        }"#;
        let cfg: DashboardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.default_selection.ticker, Ticker::Qqq);
        assert_eq!(cfg.default_selection.interval, Interval::Weekly);
        assert_eq!(cfg.indicators.rsi_period, 9);
        assert_eq!(cfg.indicators.sma_windows, [20, 50, 200]);
        assert_eq!(cfg.cache_ttl_secs, 300);
    }

    #[test]
    fn port_env_precedence() {
        let mut cfg = DashboardConfig::default();
        cfg.apply_env(env(&[("PORT", "8080"), ("ZEABUR_PORT", "9090")]));
        assert_eq!(cfg.port, 8080);

        let mut cfg = DashboardConfig::default();
        cfg.apply_env(env(&[("ZEABUR_PORT", "9090")]));
        assert_eq!(cfg.port, 9090);

        let mut cfg = DashboardConfig::default();
        cfg.apply_env(env(&[("PORT", "not-a-port"), ("ZEABUR_PORT", "7000")]));
        assert_eq!(cfg.port, 7000);

        let mut cfg = DashboardConfig::default();
        cfg.apply_env(env(&[]));
        assert_eq!(cfg.port, 8501);
    }

    #[test]
    fn other_env_overrides() {
        let mut cfg = DashboardConfig::default();
        cfg.apply_env(env(&[
            ("ETF_PULSE_BIND_HOST", "127.0.0.1"),
            ("ETF_PULSE_CACHE_TTL_SECS", "60"),
            ("ETF_PULSE_YAHOO_BASE_URL", "http://localhost:9999"),
        ]));
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8501");
        assert_eq!(cfg.cache_ttl_secs, 60);
        assert_eq!(cfg.yahoo.base_url, "http://localhost:9999");
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(DashboardConfig::load("/nonexistent/dashboard_config.json").is_err());
    }
}
