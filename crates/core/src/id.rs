//! Strongly-typed account identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Store-assigned sequential identifier of an account.
///
/// `AccountId::UNASSIGNED` (zero) marks an account that has not been persisted yet.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    pub const UNASSIGNED: AccountId = AccountId(0);

    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }

    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for AccountId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<AccountId> for i64 {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

impl FromStr for AccountId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .parse::<i64>()
            .map_err(|e| DomainError::invalid_id(format!("AccountId: {s:?}: {e}")))?;
        Ok(Self(value))
    }
}

/// Globally-unique, non-sequential account identifier.
///
/// Generated once when an account is constructed and never changed afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(Uuid);

impl ExternalId {
    /// Create a new random (v4) external identifier.
    ///
    /// v4 rather than v7 so the identifier carries no creation-order information.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ExternalId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ExternalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for ExternalId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<ExternalId> for Uuid {
    fn from(value: ExternalId) -> Self {
        value.0
    }
}

impl FromStr for ExternalId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::from_str(s)
            .map_err(|e| DomainError::invalid_id(format!("ExternalId: {s:?}: {e}")))?;
        Ok(Self(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_parses_decimal() {
        assert_eq!("42".parse::<AccountId>().unwrap(), AccountId::new(42));
    }

    #[test]
    fn account_id_rejects_garbage() {
        let err = "4x2".parse::<AccountId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(_)));
    }

    #[test]
    fn unassigned_is_zero() {
        assert!(!AccountId::UNASSIGNED.is_assigned());
        assert!(AccountId::new(1).is_assigned());
    }

    #[test]
    fn external_id_round_trips_through_string() {
        let id = ExternalId::new();
        let parsed: ExternalId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn external_id_rejects_malformed_input() {
        for bad in ["", "not-a-uuid", "123", "0000000-0000-0000-0000-000000000000"] {
            let err = bad.parse::<ExternalId>().unwrap_err();
            assert!(matches!(err, DomainError::InvalidId(_)), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn external_ids_are_random_v4() {
        let a = ExternalId::new();
        let b = ExternalId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 4);
    }
}
