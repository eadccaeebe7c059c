use async_trait::async_trait;
use crate::{ContextError, FearGreedScore, NewsItem, PriceSeries};

/// Daily closing prices for a provider symbol (e.g. `^GSPC`)
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_series(&self, symbol: &str, lookback_days: u32) -> Result<PriceSeries, ContextError>;
}

/// Latest value of a macroeconomic series (e.g. `FEDFUNDS`)
#[async_trait]
pub trait MacroRateSource: Send + Sync {
    async fn fetch_latest(&self, series_id: &str) -> Result<f64, ContextError>;
}

/// Composite market sentiment index
#[async_trait]
pub trait SentimentSource: Send + Sync {
    async fn fetch(&self) -> Result<FearGreedScore, ContextError>;
}

/// Headlines matching a query, most relevant first
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch(&self, query: &str, max_age_days: u32) -> Result<Vec<NewsItem>, ContextError>;
}
