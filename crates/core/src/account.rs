//! Account entity.
//!
//! An `Account` is built in memory with a fresh external identifier and a zero
//! balance, then handed to a store which assigns its sequential `id`.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::id::{AccountId, ExternalId};

/// Maximum length (in characters) of a first or last name.
pub const MAX_NAME_LEN: usize = 30;

/// A bank account.
///
/// Serialized as `{id, uuid, firstName, lastName, balance}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,

    #[serde(rename = "uuid")]
    pub external_id: ExternalId,

    pub first_name: String,
    pub last_name: String,

    /// Balance in minor currency units. Never negative.
    pub balance: i64,
}

impl Account {
    /// Construct a not-yet-persisted account.
    ///
    /// Pure: generates the external identifier, sets the balance to zero and
    /// leaves `id` unassigned.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: AccountId::UNASSIGNED,
            external_id: ExternalId::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            balance: 0,
        }
    }

    /// Attach the store-assigned identifier.
    pub fn with_id(mut self, id: AccountId) -> Self {
        self.id = id;
        self
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_assigned()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Check the field invariants every stored account must satisfy.
    pub fn validate(&self) -> DomainResult<()> {
        validate_name("first_name", &self.first_name)?;
        validate_name("last_name", &self.last_name)?;
        validate_balance(self.balance)
    }
}

/// An account's identity is its external id: fixed at construction, while the
/// sequential `id` is only assigned once a store persists it.
impl Entity for Account {
    type Id = ExternalId;

    fn id(&self) -> &ExternalId {
        &self.external_id
    }
}

/// Validate a first/last name: non-empty after trimming and at most
/// [`MAX_NAME_LEN`] characters.
pub fn validate_name(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a balance against the non-negative invariant.
pub fn validate_balance(balance: i64) -> DomainResult<()> {
    if balance < 0 {
        return Err(DomainError::validation(format!(
            "balance must not be negative (got {balance})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_account_is_unpersisted_with_zero_balance() {
        let a = Account::new("Ana", "Rad");
        assert_eq!(a.id, AccountId::UNASSIGNED);
        assert!(!a.is_persisted());
        assert_eq!(a.balance, 0);
        assert_eq!(a.first_name, "Ana");
        assert_eq!(a.last_name, "Rad");
        assert_eq!(a.full_name(), "Ana Rad");
    }

    #[test]
    fn with_id_keeps_external_id() {
        let a = Account::new("Ana", "Rad");
        let ext = a.external_id;
        let a = a.with_id(AccountId::new(7));
        assert_eq!(a.id, AccountId::new(7));
        assert_eq!(a.external_id, ext);
        assert!(a.is_persisted());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let a = Account::new("Ana", "Rad").with_id(AccountId::new(1));
        let json = serde_json::to_value(&a).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["uuid"], a.external_id.to_string());
        assert_eq!(json["firstName"], "Ana");
        assert_eq!(json["lastName"], "Rad");
        assert_eq!(json["balance"], 0);
        assert_eq!(json.as_object().unwrap().len(), 5);

        let back: Account = serde_json::from_value(json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn entity_identity_survives_persistence() {
        let a = Account::new("Ana", "Rad");
        let before = *Entity::id(&a);
        let a = a.with_id(AccountId::new(3));
        assert_eq!(Entity::id(&a), &before);
    }

    #[test]
    fn validate_checks_names_and_balance() {
        assert!(Account::new("Ana", "Rad").validate().is_ok());
        assert!(Account::new("", "Rad").validate().is_err());
        assert!(Account::new("Ana", "   ").validate().is_err());
        assert!(Account::new("x".repeat(MAX_NAME_LEN + 1), "Rad").validate().is_err());

        let mut a = Account::new("Ana", "Rad");
        a.balance = -1;
        assert!(matches!(a.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn name_validation() {
        assert!(validate_name("firstName", "Ana").is_ok());
        assert!(validate_name("firstName", "").is_err());
        assert!(validate_name("firstName", "   ").is_err());
        assert!(validate_name("firstName", &"x".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_name("firstName", &"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn balance_validation() {
        assert!(validate_balance(0).is_ok());
        assert!(validate_balance(1_000).is_ok());
        assert_eq!(
            validate_balance(-1),
            Err(DomainError::validation("balance must not be negative (got -1)"))
        );
    }

    proptest! {
        #[test]
        fn constructed_accounts_never_share_external_ids(n in 2usize..64) {
            let mut seen = std::collections::HashSet::new();
            for _ in 0..n {
                prop_assert!(seen.insert(Account::new("A", "B").external_id));
            }
        }
    }
}
