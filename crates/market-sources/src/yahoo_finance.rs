use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use context_core::{ContextError, MarketDataSource, PricePoint, PriceSeries};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::http::{build_client, invalid, send};

const BASE_URL: &str = "https://query2.finance.yahoo.com";
const PROVIDER: &str = "Yahoo Finance";

#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
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

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl YahooFinanceClient {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Daily closes covering the last `lookback_days` calendar days
    pub async fn get_daily_closes(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<PriceSeries, ContextError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(PROVIDER, e))?;
        url.path_segments_mut()
            .map_err(|_| invalid(PROVIDER, "base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);

        let now = Utc::now();
        let from = now - ChronoDuration::days(i64::from(lookback_days));

        tracing::debug!(symbol, lookback_days, "Fetching Yahoo Finance chart");

        let response = send(
            PROVIDER,
            self.client
                .get(url)
                .timeout(self.timeout)
                .query(&[
                    ("period1", from.timestamp().to_string()),
                    ("period2", now.timestamp().to_string()),
                    ("interval", "1d".to_string()),
                ]),
        )
        .await?;

        let chart: ChartResponse = response.json().await.map_err(|e| invalid(PROVIDER, e))?;
        parse_chart(symbol, chart)
    }
}

fn parse_chart(symbol: &str, chart: ChartResponse) -> Result<PriceSeries, ContextError> {
    if let Some(err) = chart.chart.error {
        return Err(ContextError::SourceUnavailable(format!(
            "{}: {} {}: {}",
            PROVIDER, symbol, err.code, err.description
        )));
    }

    let result = chart
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| invalid(PROVIDER, format!("no chart result for {}", symbol)))?;

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    // Yahoo reports null closes for halted or not-yet-settled sessions
    let mut points: Vec<PricePoint> = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            Some(PricePoint {
                timestamp: DateTime::from_timestamp(ts, 0)?,
                close: close?,
            })
        })
        .collect();

    points.sort_by_key(|p| p.timestamp);
    points.dedup_by_key(|p| p.timestamp);

    if points.is_empty() {
        return Err(ContextError::InsufficientData(format!(
            "{}: no closes returned for {}",
            PROVIDER, symbol
        )));
    }

    PriceSeries::new(points)
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    async fn fetch_series(&self, symbol: &str, lookback_days: u32) -> Result<PriceSeries, ContextError> {
        self.get_daily_closes(symbol, lookback_days).await
    }
}
