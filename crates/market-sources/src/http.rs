use context_core::ContextError;
use reqwest::{Client, RequestBuilder, Response};

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Shared client with the browser User-Agent. Timeouts are set per request by
/// each adapter, so they also hold for the fallback client.
pub(crate) fn build_client() -> Client {
    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        })
}

/// Send once and require a 2xx status.
///
/// URLs are stripped from transport errors so credentials in query strings
/// never reach logs or responses.
pub(crate) async fn send(provider: &str, request: RequestBuilder) -> Result<Response, ContextError> {
    let response = request
        .send()
        .await
        .map_err(|e| ContextError::SourceUnavailable(format!("{}: {}", provider, e.without_url())))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        return Err(ContextError::SourceUnavailable(format!(
            "{}: HTTP {}: {}",
            provider,
            status,
            body.trim()
        )));
    }

    Ok(response)
}

pub(crate) fn invalid(provider: &str, e: impl std::fmt::Display) -> ContextError {
    ContextError::InvalidData(format!("{}: {}", provider, e))
}
