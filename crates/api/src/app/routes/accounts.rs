use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use bankapi_core::{Account, AccountId, ExternalId};

use crate::app::dto::{CreateAccountRequest, CreateAccountResponse, DeletedResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::AccountContext;

pub async fn list_accounts(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Account>>, ApiError> {
    Ok(Json(services.store.get_accounts().await?))
}

/// Create an account and hand back a token bound to it.
pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    body.validate()?;

    // Fail before writing anything if tokens cannot be issued.
    if !services.tokens.has_signing_key() {
        return Err(bankapi_auth::TokenError::MissingSigningKey.into());
    }

    let account = body.into_account();
    let id = services.store.create_account(&account).await?;
    let account = account.with_id(id);
    let token = services.tokens.issue(&account)?;

    tracing::info!(account_id = %id, external_id = %account.external_id, "account created");

    Ok((StatusCode::CREATED, Json(CreateAccountResponse { token, account })))
}

/// The account the presented token was issued for.
pub async fn get_my_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AccountContext>,
) -> Result<Json<Account>, ApiError> {
    let account = services.store.get_account_by_id(ctx.account_id()).await?;
    Ok(Json(account))
}

pub async fn get_account_by_id(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Account>, ApiError> {
    let id: AccountId = id.parse()?;
    Ok(Json(services.store.get_account_by_id(id).await?))
}

pub async fn delete_account_by_id(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id: AccountId = id.parse()?;
    services.store.delete_account_by_id(id).await?;

    tracing::info!(account_id = %id, "account deleted");
    Ok(Json(DeletedResponse { deleted: id.to_string() }))
}

pub async fn get_account_by_uuid(
    Extension(services): Extension<Arc<AppServices>>,
    Path(uuid): Path<String>,
) -> Result<Json<Account>, ApiError> {
    let external_id: ExternalId = uuid.parse()?;
    Ok(Json(services.store.get_account_by_external_id(external_id).await?))
}

pub async fn delete_account_by_uuid(
    Extension(services): Extension<Arc<AppServices>>,
    Path(uuid): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let external_id: ExternalId = uuid.parse()?;
    services.store.delete_account_by_external_id(external_id).await?;

    tracing::info!(%external_id, "account deleted");
    Ok(Json(DeletedResponse { deleted: external_id.to_string() }))
}
