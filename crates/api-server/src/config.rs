use anyhow::{anyhow, bail, Context, Result};
use context_core::TrackedTicker;
use context_orchestrator::{default_tickers, AggregatorConfig, DEFAULT_LIQUIDITY_NOTE};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    // Market data
    pub tickers: Vec<TrackedTicker>,
    pub market_lookback_days: u32,

    // Macro
    pub fred_api_key: Option<String>,
    pub fred_series_id: String,
    pub liquidity_note: String,

    // News
    pub news_query: String,
    pub news_lookback_days: u32,
    pub news_max_items: usize,

    pub provider_timeout: Duration,
    pub request_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let tickers = match get("MARKET_TICKERS").filter(|v| !v.trim().is_empty()) {
            Some(raw) => parse_tickers(&raw)?,
            None => default_tickers(),
        };

        let news_max_items: usize = parse_or(&get, "NEWS_MAX_ITEMS", 5)?;
        if news_max_items == 0 {
            bail!("NEWS_MAX_ITEMS must be at least 1");
        }

        let provider_timeout_secs: u64 = parse_or(&get, "PROVIDER_TIMEOUT_SECS", 10)?;
        let request_timeout_secs: u64 = parse_or(&get, "REQUEST_TIMEOUT_SECS", 60)?;
        if provider_timeout_secs == 0 || request_timeout_secs == 0 {
            bail!("PROVIDER_TIMEOUT_SECS and REQUEST_TIMEOUT_SECS must be positive");
        }

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 8000)?,
            tickers,
            market_lookback_days: parse_or(&get, "MARKET_LOOKBACK_DAYS", 60)?,
            fred_api_key: get("FRED_API_KEY").filter(|k| !k.trim().is_empty()),
            fred_series_id: get("FRED_SERIES_ID").unwrap_or_else(|| "FEDFUNDS".to_string()),
            liquidity_note: get("LIQUIDITY_NOTE")
                .unwrap_or_else(|| DEFAULT_LIQUIDITY_NOTE.to_string()),
            news_query: get("NEWS_QUERY")
                .unwrap_or_else(|| "US Economy Federal Reserve Inflation".to_string()),
            news_lookback_days: parse_or(&get, "NEWS_LOOKBACK_DAYS", 3)?,
            news_max_items,
            provider_timeout: Duration::from_secs(provider_timeout_secs),
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            tickers: self.tickers.clone(),
            lookback_days: self.market_lookback_days,
            macro_series_id: self.fred_series_id.clone(),
            liquidity_note: self.liquidity_note.clone(),
            news_query: self.news_query.clone(),
            news_max_age_days: self.news_lookback_days,
            max_news_items: self.news_max_items,
        }
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {}={:?}: {}", key, raw, e)),
        None => Ok(default),
    }
}

/// `SPX=^GSPC,Gold=GC=F`, order preserved
fn parse_tickers(raw: &str) -> Result<Vec<TrackedTicker>> {
    let tickers = raw
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<TrackedTicker>()
                .with_context(|| format!("Invalid MARKET_TICKERS entry {:?}", entry))
        })
        .collect::<Result<Vec<_>>>()?;

    if tickers.is_empty() {
        bail!("MARKET_TICKERS lists no tickers");
    }
    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.tickers.len(), 7);
        assert_eq!(config.tickers[0], TrackedTicker::new("SPX", "^GSPC"));
        assert_eq!(config.market_lookback_days, 60);
        assert!(config.fred_api_key.is_none());
        assert_eq!(config.fred_series_id, "FEDFUNDS");
        assert_eq!(config.news_lookback_days, 3);
        assert_eq!(config.news_max_items, 5);
        assert_eq!(config.provider_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9100"),
            ("MARKET_TICKERS", "Gold=GC=F, SPX=^GSPC,"),
            ("FRED_API_KEY", "abc123"),
            ("NEWS_MAX_ITEMS", "8"),
        ])
        .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(
            config.tickers,
            vec![TrackedTicker::new("Gold", "GC=F"), TrackedTicker::new("SPX", "^GSPC")]
        );
        assert_eq!(config.fred_api_key.as_deref(), Some("abc123"));

        let aggregator = config.aggregator_config();
        assert_eq!(aggregator.max_news_items, 8);
        assert_eq!(aggregator.tickers.len(), 2);
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let config = config_from(&[("FRED_API_KEY", "  ")]).unwrap();
        assert!(config.fred_api_key.is_none());
    }

    #[test]
    fn test_malformed_values_are_errors() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("MARKET_LOOKBACK_DAYS", "-5")]).is_err());
        assert!(config_from(&[("NEWS_MAX_ITEMS", "0")]).is_err());
        assert!(config_from(&[("REQUEST_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("MARKET_TICKERS", "SPX")]).is_err());
        assert!(config_from(&[("MARKET_TICKERS", "=^GSPC")]).is_err());
    }

    #[test]
    fn test_error_names_the_variable() {
        let err = config_from(&[("NEWS_LOOKBACK_DAYS", "three")]).unwrap_err();
        assert!(err.to_string().contains("NEWS_LOOKBACK_DAYS"));
    }
}
