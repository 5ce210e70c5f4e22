use bankapi_auth::AccountClaims;
use bankapi_core::{AccountId, ExternalId};

/// Authenticated account for a request, derived from a validated token.
///
/// Inserted by the auth middleware; a handler only ever acts on this account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountContext {
    account_id: AccountId,
    external_id: ExternalId,
}

impl AccountContext {
    pub fn new(account_id: AccountId, external_id: ExternalId) -> Self {
        Self {
            account_id,
            external_id,
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn external_id(&self) -> ExternalId {
        self.external_id
    }
}

impl From<AccountClaims> for AccountContext {
    fn from(claims: AccountClaims) -> Self {
        Self::new(claims.id, claims.external_id)
    }
}
