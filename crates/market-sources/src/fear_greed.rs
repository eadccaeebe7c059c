use async_trait::async_trait;
use context_core::{ContextError, FearGreedScore, SentimentSource};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::http::{build_client, invalid, send};

const BASE_URL: &str = "https://production.dataviz.cnn.io";
const PROVIDER: &str = "CNN Fear & Greed";

/// CNN's Fear & Greed graph endpoint. Not a published API; it only answers
/// browser-like user agents.
#[derive(Clone)]
pub struct FearGreedClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct GraphData {
    fear_and_greed: Current,
}

#[derive(Debug, Deserialize)]
struct Current {
    score: f64,
    rating: String,
}

impl FearGreedClient {
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

    pub async fn get_current(&self) -> Result<FearGreedScore, ContextError> {
        let url = format!("{}/index/fearandgreed/graphdata", self.base_url.trim_end_matches('/'));

        let response = send(
            PROVIDER,
            self.client
                .get(&url)
                .timeout(self.timeout)
                .header(reqwest::header::ACCEPT, "application/json"),
        )
        .await?;

        let data: GraphData = response.json().await.map_err(|e| invalid(PROVIDER, e))?;

        Ok(FearGreedScore {
            score: data.fear_and_greed.score,
            rating: data.fear_and_greed.rating,
        })
    }
}

#[async_trait]
impl SentimentSource for FearGreedClient {
    async fn fetch(&self) -> Result<FearGreedScore, ContextError> {
        self.get_current().await
    }
}
