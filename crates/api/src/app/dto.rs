use serde::{Deserialize, Serialize};

use bankapi_core::{Account, DomainResult, validate_name};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub first_name: String,
    pub last_name: String,
}

impl CreateAccountRequest {
    pub fn validate(&self) -> DomainResult<()> {
        validate_name("firstName", &self.first_name)?;
        validate_name("lastName", &self.last_name)
    }

    pub fn into_account(self) -> Account {
        Account::new(self.first_name.trim(), self.last_name.trim())
    }
}

/// Transfer request body. Accepted and echoed back; no balance moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub to_account: String,

    #[serde(alias = "ammount")]
    pub amount: i64,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct CreateAccountResponse {
    pub token: String,
    pub account: Account,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: String,
}
