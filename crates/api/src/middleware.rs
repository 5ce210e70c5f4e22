use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use bankapi_auth::TokenValidator;

use crate::app::errors::ApiError;
use crate::context::AccountContext;

/// Legacy token header, accepted alongside `Authorization: Bearer`.
pub const TOKEN_HEADER: &str = "x-jwt-token";

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenValidator>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;

    let claims = state.tokens.validate(token, Utc::now()).map_err(|e| {
        tracing::warn!(error = %e, path = %req.uri().path(), "token rejected");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(AccountContext::from(claims));

    Ok(next.run(req).await)
}

/// `Authorization: Bearer <token>`, falling back to `x-jwt-token: <token>`.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let token = bearer
        .or_else(|| headers.get(TOKEN_HEADER).and_then(|h| h.to_str().ok()))?
        .trim();

    if token.is_empty() { None } else { Some(token) }
}

/// Log one line per request with status and latency.
pub async fn trace_requests(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let res = next.run(req).await;

    let status = res.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::error!(%method, %path, status = status.as_u16(), elapsed_ms, "request failed");
    } else if status.is_client_error() {
        tracing::info!(%method, %path, status = status.as_u16(), elapsed_ms, "request rejected");
    } else {
        tracing::info!(%method, %path, status = status.as_u16(), elapsed_ms, "request");
    }

    res
}
