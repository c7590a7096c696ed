use crate::config::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Extract the bearer token from the authorization header
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Reject requests whose bearer token is neither issued nor the static token
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(request.headers()) else {
        tracing::warn!("Unauthorized access attempt: missing or invalid header");
        return (
            StatusCode::UNAUTHORIZED,
            "Unauthorized: Missing or invalid header",
        )
            .into_response();
    };

    if !state.auth.is_authorized(token).await {
        let prefix: String = token.chars().take(8).collect();
        tracing::warn!(token = %prefix, "Unauthorized access attempt with unknown token");
        return (StatusCode::UNAUTHORIZED, "Unauthorized: Token not recognized").into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer token123"));
        assert_eq!(extract_bearer(&headers), Some("token123"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer(&headers), None);
    }
}
