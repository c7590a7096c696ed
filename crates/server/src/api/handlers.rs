use super::{ApiError, ApiResult, ErrorResponse};
use crate::config::AppState;
use crate::oauth::OAuthError;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use cfbd_mcp::{parse_message, Incoming};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// POST /mcp: one JSON-RPC message in, its response out.
///
/// Dropping this future on client disconnect drops any upstream call with it.
pub async fn mcp_endpoint(State(state): State<Arc<AppState>>, body: String) -> Response {
    match parse_message(&body) {
        Incoming::Invalid(response) => (StatusCode::BAD_REQUEST, Json(response)).into_response(),
        Incoming::Notification(notification) => {
            if let Some(cancelled) = state.mcp.handle_notification(&notification) {
                // Each HTTP request owns its call; there is nothing to cancel by id here
                tracing::debug!(request = %cancelled.request_id, "Ignoring cancellation over HTTP");
            }
            StatusCode::ACCEPTED.into_response()
        }
        Incoming::Request(request) => {
            let response = state
                .mcp
                .handle_request(&request, &CancellationToken::new())
                .await;
            Json(response).into_response()
        }
    }
}

/// GET /
pub async fn root() -> &'static str {
    "OK"
}

/// GET /robots.txt
pub async fn robots() -> &'static str {
    "User-agent: *\nDisallow: /"
}

/// GET /.well-known/oauth-authorization-server
pub async fn oauth_metadata(headers: HeaderMap) -> Json<serde_json::Value> {
    let base_url = base_url(&headers);
    Json(serde_json::json!({
        "issuer": base_url,
        "authorization_endpoint": format!("{}/authorize", base_url),
        "token_endpoint": format!("{}/token", base_url),
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code"],
        "code_challenge_methods_supported": ["S256"],
    }))
}

fn base_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");
    format!("{}://{}", scheme, host)
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    pub response_type: String,
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    pub code_challenge: String,
    pub code_challenge_method: String,
}

/// GET /authorize: issue a code and redirect back to the client
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthorizeParams>,
) -> ApiResult<Response> {
    if params.response_type != "code" {
        return Err(ApiError::bad_request(
            "Unsupported response_type",
            params.response_type,
        ));
    }
    if params.code_challenge_method != "S256" {
        return Err(ApiError::bad_request(
            "Unsupported code_challenge_method",
            params.code_challenge_method,
        ));
    }
    let mut redirect = Url::parse(&params.redirect_uri)
        .map_err(|e| ApiError::bad_request("Invalid redirect_uri", e.to_string()))?;

    let code = state
        .auth
        .authorize(&params.client_id, &params.redirect_uri, &params.code_challenge)
        .await;
    tracing::info!(client_id = %params.client_id, scope = ?params.scope, "Authorization code issued");

    {
        let mut query = redirect.query_pairs_mut();
        query.append_pair("code", &code);
        if let Some(s) = &params.state {
            query.append_pair("state", s);
        }
    }

    Ok((StatusCode::FOUND, [(header::LOCATION, redirect.to_string())]).into_response())
}

#[derive(Debug, Deserialize)]
pub struct TokenParams {
    pub grant_type: String,
    pub code: String,
    pub redirect_uri: String,
    pub client_id: String,
    pub code_verifier: String,
}

/// POST /token: exchange a code for a bearer token
pub async fn token(
    State(state): State<Arc<AppState>>,
    Form(params): Form<TokenParams>,
) -> ApiResult<Json<serde_json::Value>> {
    if params.grant_type != "authorization_code" {
        return Err(ApiError::bad_request(
            "Unsupported grant_type",
            params.grant_type,
        ));
    }

    let token = state
        .auth
        .exchange(
            &params.code,
            &params.client_id,
            &params.redirect_uri,
            &params.code_verifier,
        )
        .await
        .map_err(|e| {
            tracing::warn!(client_id = %params.client_id, error = %e, "Token exchange rejected");
            ApiError::from(e)
        })?;

    Ok(Json(serde_json::json!({
        "access_token": token,
        "token_type": "Bearer",
    })))
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        if err.is_client_error() {
            ApiError::new(StatusCode::BAD_REQUEST, ErrorResponse::new(err.to_string()))
        } else {
            ApiError::internal(err.into())
        }
    }
}
