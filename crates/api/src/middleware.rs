use std::time::Duration;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use gateway_core::{CallContext, CallMetadata, REQUEST_TIMEOUT_HEADER};

use crate::context::RequestContext;

#[derive(Debug, Clone)]
pub struct CallState {
    pub default_timeout: Duration,
}

/// Build the [`RequestContext`] for every routed request and run the rest of
/// the stack inside a `request` span.
pub async fn call_context_middleware(
    State(state): State<CallState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let request_id = Uuid::now_v7();
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let timeout = inbound_timeout(req.headers()).unwrap_or(state.default_timeout);
    let call = CallContext::with_metadata(metadata_from_headers(req.headers())).with_timeout(timeout);
    req.extensions_mut().insert(RequestContext::new(request_id, call));

    async move {
        let response = next.run(req).await;
        tracing::info!(status = response.status().as_u16(), "request completed");
        response
    }
    .instrument(span)
    .await
}

/// Copy request headers into call metadata. Values that are not visible
/// ASCII are dropped.
pub fn metadata_from_headers(headers: &HeaderMap) -> CallMetadata {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
        .collect()
}

/// Remaining budget announced by the caller, in milliseconds.
fn inbound_timeout(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(REQUEST_TIMEOUT_HEADER)?.to_str().ok()?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::debug!(value = raw, "ignoring malformed request timeout header");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn headers_become_call_metadata() {
        let mut headers = HeaderMap::new();
        headers.insert("user_id", HeaderValue::from_static("u-1"));
        headers.insert("resources", HeaderValue::from_static(""));
        headers.append("organization_id", HeaderValue::from_static("org-1"));
        headers.append("organization_id", HeaderValue::from_static("org-2"));

        let md = metadata_from_headers(&headers);
        assert_eq!(md.get("user_id"), Some("u-1"));
        assert_eq!(md.get("organization_id"), Some("org-1"));
        assert!(md.contains("resources"));
    }

    #[test]
    fn request_timeout_header_is_parsed() {
        let mut headers = HeaderMap::new();
        assert_eq!(inbound_timeout(&headers), None);

        headers.insert(REQUEST_TIMEOUT_HEADER, HeaderValue::from_static("1500"));
        assert_eq!(inbound_timeout(&headers), Some(Duration::from_millis(1500)));

        headers.insert(REQUEST_TIMEOUT_HEADER, HeaderValue::from_static("soon"));
        assert_eq!(inbound_timeout(&headers), None);
    }
}
