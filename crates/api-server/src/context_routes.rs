use axum::{extract::State, routing::get, Extension, Json, Router};
use context_core::AggregatedContext;
use serde::Serialize;
use tracing::Instrument;

use crate::request_id::RequestId;
use crate::AppState;

#[cfg(test)]
#[path = "context_routes_tests.rs"]
mod context_routes_tests;

#[derive(Debug, Serialize)]
pub struct DailyContextResponse {
    pub status: &'static str,
    pub data_json: AggregatedContext,
    pub llm_context_text: String,
}

pub fn context_routes() -> Router<AppState> {
    Router::new().route("/daily_analysis_context", get(get_daily_analysis_context))
}

/// Always answers `success`; degraded sources show up inside the payload.
async fn get_daily_analysis_context(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Json<DailyContextResponse> {
    // Source warnings logged during aggregation carry the request id
    let span = tracing::info_span!("daily_context", request_id = %request_id);
    let context = state.aggregator.aggregate().instrument(span).await;
    let text = state.renderer.render(&context);

    tracing::info!(
        request_id = %request_id,
        quotes = context.market.len(),
        "Daily context served"
    );

    Json(DailyContextResponse {
        status: "success",
        data_json: context,
        llm_context_text: text,
    })
}
