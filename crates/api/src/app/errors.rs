use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use bankapi_auth::TokenError;
use bankapi_core::DomainError;
use bankapi_infra::StoreError;

/// Everything a handler can fail with.
///
/// The store and token service only report error *kinds*; picking a status
/// code for each kind happens here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("malformed request body: {0}")]
    Body(String),

    #[error("{0}")]
    Unauthorized(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Domain(e) => domain_error_to_response(e),
            ApiError::Store(e) => store_error_to_response(e),
            ApiError::Token(e) => token_error_to_response(e),
            ApiError::Body(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_argument", msg),
            ApiError::Unauthorized(msg) => json_error(StatusCode::UNAUTHORIZED, "unauthorized", msg),
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_argument", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::InvalidArgument(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_argument", msg),
        e @ StoreError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", e.to_string()),
        StoreError::Persistence(msg) => {
            tracing::error!(error = %msg, "account store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "persistence_error", "unable to complete account operation")
        }
        StoreError::CorruptRow(msg) => {
            tracing::error!(error = %msg, "corrupt account row");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "corrupt_row", "stored account is unreadable")
        }
    }
}

pub fn token_error_to_response(err: TokenError) -> axum::response::Response {
    if err.is_config() {
        tracing::error!(error = %err, "token configuration error (check JWT_SECRET / TOKEN_TTL_SECS)");
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "config_error", err.to_string());
    }
    json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid authorization")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn error_kinds_map_to_statuses() {
        assert_eq!(status(StoreError::InvalidArgument("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(StoreError::NotFound("1".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(StoreError::Persistence("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(StoreError::CorruptRow("x".into())), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(DomainError::invalid_id("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status(DomainError::validation("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status(TokenError::MissingSigningKey), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(TokenError::TtlOutOfRange), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status(TokenError::Expired), StatusCode::UNAUTHORIZED);
        assert_eq!(status(TokenError::InvalidSignature("RS256".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status(TokenError::InvalidToken("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status(TokenError::InvalidClaims("x".into())), StatusCode::UNAUTHORIZED);
    }
}
