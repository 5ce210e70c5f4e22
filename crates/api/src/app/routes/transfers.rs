use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
};

use bankapi_core::{AccountId, ExternalId};

use crate::app::dto::TransferRequest;
use crate::app::errors::ApiError;
use crate::context::AccountContext;

// Transfers are accepted and echoed; balances are not moved yet.

pub async fn transfer_by_id(
    Extension(ctx): Extension<AccountContext>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransferRequest>), ApiError> {
    let Json(body) = body?;
    let to: AccountId = body.to_account.parse()?;

    tracing::info!(from = %ctx.account_id(), to = %to, amount = body.amount, "transfer accepted");
    Ok((StatusCode::ACCEPTED, Json(body)))
}

pub async fn transfer_by_uuid(
    Extension(ctx): Extension<AccountContext>,
    body: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransferRequest>), ApiError> {
    let Json(body) = body?;
    let to: ExternalId = body.to_account.parse()?;

    tracing::info!(from = %ctx.external_id(), to = %to, amount = body.amount, "transfer accepted");
    Ok((StatusCode::ACCEPTED, Json(body)))
}
