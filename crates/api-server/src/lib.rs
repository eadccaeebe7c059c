//! HTTP surface for the daily market context: one aggregation endpoint plus a
//! health probe.

pub mod config;
pub mod context_routes;
pub mod error;
pub mod logging;
pub mod request_id;

use anyhow::Context;
use axum::{
    error_handling::HandleErrorLayer,
    extract::{Request, State},
    middleware,
    routing::get,
    Json, Router,
};
use context_orchestrator::{ContextAggregator, ContextSources};
use context_renderer::ContextRenderer;
use market_sources::{FearGreedClient, FredClient, GoogleNewsClient, YahooFinanceClient};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

pub use config::ServerConfig;
pub use context_routes::context_routes;
pub use error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<ContextAggregator>,
    pub renderer: Arc<ContextRenderer>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(aggregator: ContextAggregator, renderer: ContextRenderer) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            renderer: Arc::new(renderer),
            started_at: Instant::now(),
        }
    }

    /// Wire the production adapters. Clients are built once here and shared
    /// by every request.
    pub fn from_config(config: &ServerConfig) -> Self {
        let timeout = config.provider_timeout;
        let sources = ContextSources {
            market: Arc::new(YahooFinanceClient::new(timeout)),
            macro_rates: Arc::new(FredClient::new(config.fred_api_key.clone(), timeout)),
            sentiment: Arc::new(FearGreedClient::new(timeout)),
            news: Arc::new(GoogleNewsClient::new(timeout)),
        };

        if config.fred_api_key.is_none() {
            tracing::warn!("FRED_API_KEY not set, the macro section will be degraded");
        }

        Self::new(
            ContextAggregator::new(sources, config.aggregator_config()),
            ContextRenderer::new(config.news_max_items, config.news_lookback_days),
        )
    }
}

pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(context_routes())
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(error::handle_panic))
                .layer(TraceLayer::new_for_http().make_span_with(|req: &Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri(),
                        request_id = tracing::field::Empty,
                    )
                }))
                .layer(middleware::from_fn(request_id::request_id_middleware))
                .layer(CorsLayer::permissive())
                .layer(HandleErrorLayer::new(error::handle_middleware_error))
                .timeout(request_timeout),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_logging();

    let config = ServerConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        tickers = config.tickers.len(),
        series_id = %config.fred_series_id,
        news_max_items = config.news_max_items,
        "Loaded configuration"
    );

    let app = create_router(AppState::from_config(&config), config.request_timeout);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Market context server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
