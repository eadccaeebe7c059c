use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::fmt;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id for one HTTP request, available to handlers as an extension
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    /// Caller-supplied id when present and printable, otherwise a fresh UUID v4
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(request.headers());
    tracing::Span::current().record("request_id", request_id.as_str());

    let header = HeaderValue::from_str(request_id.as_str()).ok();
    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuses_caller_id() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static(" req-42 "));
        assert_eq!(RequestId::from_headers(&headers), RequestId("req-42".to_string()));
    }

    #[test]
    fn test_generates_uuid_when_missing_or_blank() {
        let generated = RequestId::from_headers(&HeaderMap::new());
        assert!(Uuid::parse_str(generated.as_str()).is_ok());

        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static(""));
        let generated = RequestId::from_headers(&headers);
        assert!(Uuid::parse_str(generated.as_str()).is_ok());
    }
}
