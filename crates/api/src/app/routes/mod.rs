use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{AuthState, auth_middleware};

pub mod accounts;
pub mod system;
pub mod transfers;

/// Account and transfer endpoints.
///
/// Only "get my account" and the transfer routes require a token; the auth
/// layer is attached per route so the public methods on the same paths stay
/// open.
pub fn router(auth: AuthState) -> Router {
    let auth_layer = axum::middleware::from_fn_with_state(auth, auth_middleware);

    Router::new()
        .route(
            "/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route(
            "/account",
            post(accounts::create_account)
                .merge(get(accounts::get_my_account).route_layer(auth_layer.clone())),
        )
        .route(
            "/account/:id",
            get(accounts::get_account_by_id).delete(accounts::delete_account_by_id),
        )
        .route(
            "/account/uuid/:uuid",
            get(accounts::get_account_by_uuid).delete(accounts::delete_account_by_uuid),
        )
        .route(
            "/transfer",
            post(transfers::transfer_by_id).route_layer(auth_layer.clone()),
        )
        .route(
            "/transfer/uuid",
            post(transfers::transfer_by_uuid).route_layer(auth_layer),
        )
}
