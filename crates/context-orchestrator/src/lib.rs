use context_core::{
    AggregatedContext, AssetQuote, MacroIndicator, MacroRateSource, MarketDataSource,
    MarketSnapshot, NewsItem, NewsSource, SentimentReading, SentimentSource, TrackedTicker,
};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use technical_analysis::compute_quote;


pub const DEFAULT_LIQUIDITY_NOTE: &str =
    "Check 10Y Yield in Market Data for real-time liquidity stress.";

/// Fallback named in the sentiment note when the index is unavailable
const SENTIMENT_FALLBACK_HINT: &str = "using VIX in market data instead";

/// Tickers tracked when none are configured, in display order
pub fn default_tickers() -> Vec<TrackedTicker> {
    [
        ("SPX", "^GSPC"),
        ("NDX", "^NDX"),
        ("10Y_Yield", "^TNX"),
        ("Gold", "GC=F"),
        ("Crude_Oil", "CL=F"),
        ("DXY", "DX-Y.NYB"),
        ("VIX", "^VIX"),
    ]
    .into_iter()
    .map(|(label, symbol)| TrackedTicker::new(label, symbol))
    .collect()
}

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub tickers: Vec<TrackedTicker>,
    /// Calendar days of price history requested per ticker
    pub lookback_days: u32,
    pub macro_series_id: String,
    pub liquidity_note: String,
    pub news_query: String,
    pub news_max_age_days: u32,
    pub max_news_items: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            lookback_days: 60,
            macro_series_id: "FEDFUNDS".to_string(),
            liquidity_note: DEFAULT_LIQUIDITY_NOTE.to_string(),
            news_query: "US Economy Federal Reserve Inflation".to_string(),
            news_max_age_days: 3,
            max_news_items: 5,
        }
    }
}

/// Adapter handles, built once at startup and shared read-only
#[derive(Clone)]
pub struct ContextSources {
    pub market: Arc<dyn MarketDataSource>,
    pub macro_rates: Arc<dyn MacroRateSource>,
    pub sentiment: Arc<dyn SentimentSource>,
    pub news: Arc<dyn NewsSource>,
}

pub struct ContextAggregator {
    sources: ContextSources,
    config: AggregatorConfig,
}

impl ContextAggregator {
    pub fn new(sources: ContextSources, config: AggregatorConfig) -> Self {
        Self { sources, config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Build a fresh context from every source.
    ///
    /// Never fails: a broken source only degrades its own part of the result.
    /// Dropping the returned future cancels all in-flight provider calls.
    #[tracing::instrument(name = "aggregate_context", skip_all)]
    pub async fn aggregate(&self) -> AggregatedContext {
        let started = Instant::now();
        tracing::info!(
            "Starting context aggregation ({} tickers)",
            self.config.tickers.len()
        );

        let (market, macro_indicator, sentiment, news) = tokio::join!(
            self.market_snapshot(),
            self.macro_indicator(),
            self.sentiment_reading(),
            self.headlines(),
        );

        tracing::info!(
            quotes = market.len(),
            configured = self.config.tickers.len(),
            macro_available = macro_indicator.rate.is_some(),
            sentiment_available = !sentiment.is_degraded(),
            news = news.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Context aggregation finished"
        );

        AggregatedContext {
            market,
            macro_indicator,
            sentiment,
            news,
        }
    }

    /// Quotes for every configured ticker, fetched concurrently and kept in
    /// configuration order
    pub async fn market_snapshot(&self) -> MarketSnapshot {
        let quotes = join_all(self.config.tickers.iter().map(|t| self.quote_for(t))).await;
        MarketSnapshot::new(quotes.into_iter().flatten().collect())
    }

    async fn quote_for(&self, ticker: &TrackedTicker) -> Option<AssetQuote> {
        let series = match self
            .sources
            .market
            .fetch_series(&ticker.symbol, self.config.lookback_days)
            .await
        {
            Ok(series) => series,
            Err(e) => {
                tracing::warn!(asset = %ticker.label, symbol = %ticker.symbol, error = %e, "Price fetch failed, omitting asset");
                return None;
            }
        };

        match compute_quote(&ticker.label, &series) {
            Ok(quote) => Some(quote),
            Err(e) => {
                tracing::warn!(asset = %ticker.label, symbol = %ticker.symbol, error = %e, "Quote computation failed, omitting asset");
                None
            }
        }
    }

    pub async fn macro_indicator(&self) -> MacroIndicator {
        let series_id = &self.config.macro_series_id;
        match self.sources.macro_rates.fetch_latest(series_id).await {
            Ok(rate) => MacroIndicator::available(series_id, rate, &self.config.liquidity_note),
            Err(e) => {
                tracing::warn!(series_id = %series_id, error = %e, "Macro rate unavailable");
                MacroIndicator::degraded(series_id, e.to_string())
            }
        }
    }

    pub async fn sentiment_reading(&self) -> SentimentReading {
        match self.sources.sentiment.fetch().await {
            Ok(index) => SentimentReading::from_index(index),
            Err(e) => {
                tracing::warn!(error = %e, "Sentiment index unavailable");
                SentimentReading::degraded(format!("{}; {}", e, SENTIMENT_FALLBACK_HINT))
            }
        }
    }

    /// Provider order, capped at `max_news_items`
    pub async fn headlines(&self) -> Vec<NewsItem> {
        match self
            .sources
            .news
            .fetch(&self.config.news_query, self.config.news_max_age_days)
            .await
        {
            Ok(mut items) => {
                items.truncate(self.config.max_news_items);
                items
            }
            Err(e) => {
                tracing::warn!(query = %self.config.news_query, error = %e, "News unavailable");
                Vec::new()
            }
        }
    }
}
