use async_trait::async_trait;
use context_core::{ContextError, MacroRateSource};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::http::{build_client, invalid, send};

const BASE_URL: &str = "https://api.stlouisfed.org";
const PROVIDER: &str = "FRED";

/// Client for the St. Louis Fed economic data API
#[derive(Clone)]
pub struct FredClient {
    api_key: Option<String>,
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

impl FredClient {
    /// A client without a key still constructs; every fetch then fails as
    /// unavailable so the rest of the context can be served.
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self::with_base_url(api_key, BASE_URL, timeout)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client: build_client(),
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Most recent observation of `series_id`
    pub async fn get_latest_observation(&self, series_id: &str) -> Result<f64, ContextError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ContextError::SourceUnavailable(format!("{}: API key not configured", PROVIDER))
        })?;

        let url = format!("{}/fred/series/observations", self.base_url.trim_end_matches('/'));

        tracing::debug!(series_id, "Fetching latest FRED observation");

        let response = send(
            PROVIDER,
            self.client.get(&url).timeout(self.timeout).query(&[
                ("series_id", series_id),
                ("api_key", api_key),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", "1"),
            ]),
        )
        .await?;

        let body: ObservationsResponse = response.json().await.map_err(|e| invalid(PROVIDER, e))?;
        parse_latest(series_id, body)
    }
}

fn parse_latest(series_id: &str, body: ObservationsResponse) -> Result<f64, ContextError> {
    let latest = body
        .observations
        .into_iter()
        .next()
        .ok_or_else(|| invalid(PROVIDER, format!("no observations for {}", series_id)))?;

    // FRED marks missing observations with "."; `parse` would also accept "NaN" and "inf"
    latest
        .value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            invalid(
                PROVIDER,
                format!("{} has no value on {} ({:?})", series_id, latest.date, latest.value),
            )
        })
}

#[async_trait]
impl MacroRateSource for FredClient {
    async fn fetch_latest(&self, series_id: &str) -> Result<f64, ContextError> {
        self.get_latest_observation(series_id).await
    }
}
