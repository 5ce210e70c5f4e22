use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use bankapi_core::{Account, AccountId, DomainError, ExternalId};

/// Account store operation error.
///
/// Returned as-is to the caller; the store never retries or recovers.
///
/// ## Error Categories
///
/// - **InvalidArgument**: caller-supplied data is malformed (bad identifier,
///   negative balance, value rejected by a check constraint)
/// - **NotFound**: no account matches the identifier
/// - **Persistence**: the storage engine failed (including duplicate external ids)
/// - **CorruptRow**: a persisted row does not map onto an `Account`
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("account {0} not found")]
    NotFound(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("corrupt account row: {0}")]
    CorruptRow(String),
}

impl StoreError {
    pub fn not_found(what: impl core::fmt::Display) -> Self {
        Self::NotFound(what.to_string())
    }
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound => StoreError::NotFound("requested".into()),
            other => StoreError::InvalidArgument(other.to_string()),
        }
    }
}

/// Persistence boundary for accounts.
///
/// ## Semantics shared by all implementations
///
/// - `create_account` persists every field except `id` and returns the
///   store-assigned id. Uniqueness of `id` and `external_id` is enforced by the
///   storage layer; a colliding external id fails with `Persistence`.
/// - Lookups fail with `NotFound` when nothing matches.
/// - `get_accounts` returns accounts ordered by id; empty when none exist.
/// - Deletes do not check whether anything was removed.
/// - `update_account` replaces names and balance of the row with the account's
///   id. `external_id` is never written. A negative balance is rejected with
///   `InvalidArgument`, an unknown id with `NotFound`.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_account(&self, account: &Account) -> Result<AccountId, StoreError>;

    async fn get_account_by_id(&self, id: AccountId) -> Result<Account, StoreError>;

    async fn get_account_by_external_id(&self, external_id: ExternalId) -> Result<Account, StoreError>;

    async fn get_accounts(&self) -> Result<Vec<Account>, StoreError>;

    async fn delete_account_by_id(&self, id: AccountId) -> Result<(), StoreError>;

    async fn delete_account_by_external_id(&self, external_id: ExternalId) -> Result<(), StoreError>;

    async fn update_account(&self, account: &Account) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn create_account(&self, account: &Account) -> Result<AccountId, StoreError> {
        (**self).create_account(account).await
    }

    async fn get_account_by_id(&self, id: AccountId) -> Result<Account, StoreError> {
        (**self).get_account_by_id(id).await
    }

    async fn get_account_by_external_id(&self, external_id: ExternalId) -> Result<Account, StoreError> {
        (**self).get_account_by_external_id(external_id).await
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, StoreError> {
        (**self).get_accounts().await
    }

    async fn delete_account_by_id(&self, id: AccountId) -> Result<(), StoreError> {
        (**self).delete_account_by_id(id).await
    }

    async fn delete_account_by_external_id(&self, external_id: ExternalId) -> Result<(), StoreError> {
        (**self).delete_account_by_external_id(external_id).await
    }

    async fn update_account(&self, account: &Account) -> Result<(), StoreError> {
        (**self).update_account(account).await
    }
}
