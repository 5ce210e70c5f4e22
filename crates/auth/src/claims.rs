use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use bankapi_core::{Account, AccountId, ExternalId};

use crate::token::TokenError;

/// Claims embedded in an account token.
///
/// Binds a token to exactly one account. `exp` is only present when the
/// issuing service was configured with a token lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountClaims {
    /// The account's sequential identifier.
    pub id: AccountId,

    /// The account's external identifier, carried as the `uuid` claim (a
    /// hyphenated UUID string, same key as the account payload).
    #[serde(rename = "uuid")]
    pub external_id: ExternalId,

    /// Expiry as UNIX seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl AccountClaims {
    pub fn for_account(account: &Account, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id: account.id,
            external_id: account.external_id,
            exp: expires_at.map(|t| t.timestamp()),
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.id
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    /// Fail with `Expired` if an expiry is present and `now` is at or past it.
    pub fn check_expiry(&self, now: DateTime<Utc>) -> Result<(), TokenError> {
        match self.exp {
            Some(exp) if now.timestamp() >= exp => Err(TokenError::Expired),
            _ => Ok(()),
        }
    }

    /// Decode claims from a verified token payload.
    ///
    /// Every field is checked explicitly: `id` must be an integral JSON number
    /// (`1` and `1.0` are both accepted), `uuid` a UUID string and `exp`,
    /// when present, an integral number.
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, TokenError> {
        let id = payload
            .get("id")
            .ok_or_else(|| TokenError::InvalidClaims("missing `id`".into()))
            .and_then(|v| integral("id", v))?;

        let external_id = match payload.get("uuid") {
            Some(Value::String(s)) => s
                .parse::<ExternalId>()
                .map_err(|e| TokenError::InvalidClaims(format!("`uuid`: {e}")))?,
            Some(other) => {
                return Err(TokenError::InvalidClaims(format!(
                    "`uuid` must be a string, got {other}"
                )));
            }
            None => return Err(TokenError::InvalidClaims("missing `uuid`".into())),
        };

        let exp = match payload.get("exp") {
            None | Some(Value::Null) => None,
            Some(v) => Some(integral("exp", v)?),
        };

        Ok(Self {
            id: AccountId::new(id),
            external_id,
            exp,
        })
    }
}

fn integral(field: &str, value: &Value) -> Result<i64, TokenError> {
    let Value::Number(n) = value else {
        return Err(TokenError::InvalidClaims(format!(
            "`{field}` must be a number, got {value}"
        )));
    };

    if let Some(i) = n.as_i64() {
        return Ok(i);
    }

    match n.as_f64() {
        // `i64::MAX as f64` rounds up to 2^63, which is out of range.
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(TokenError::InvalidClaims(format!(
            "`{field}` must be an integer, got {n}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn decodes_integer_and_integral_float_ids() {
        let ext = ExternalId::new();

        let c = AccountClaims::from_payload(&payload(json!({ "id": 3, "uuid": ext.to_string() }))).unwrap();
        assert_eq!(c.id, AccountId::new(3));
        assert_eq!(c.external_id, ext);
        assert_eq!(c.exp, None);

        let c = AccountClaims::from_payload(&payload(json!({ "id": 3.0, "uuid": ext.to_string() }))).unwrap();
        assert_eq!(c.id, AccountId::new(3));
    }

    #[test]
    fn rejects_mistyped_claims() {
        let ext = ExternalId::new().to_string();
        let cases = [
            json!({ "uuid": ext }),
            json!({ "id": "3", "uuid": ext }),
            json!({ "id": 3.5, "uuid": ext }),
            json!({ "id": 3 }),
            json!({ "id": 3, "uuid": 17 }),
            json!({ "id": 3, "uuid": "nope" }),
            json!({ "id": 9.223372036854775807e18, "uuid": ext }),
            json!({ "id": 3, "external_id": ext }),
            json!({ "id": 3, "uuid": ext, "exp": "tomorrow" }),
        ];

        for case in cases {
            let err = AccountClaims::from_payload(&payload(case.clone())).unwrap_err();
            assert!(matches!(err, TokenError::InvalidClaims(_)), "{case} -> {err:?}");
        }
    }

    #[test]
    fn expiry_window() {
        let now = Utc::now();
        let account = Account::new("Ana", "Rad").with_id(AccountId::new(1));

        let no_exp = AccountClaims::for_account(&account, None);
        assert!(no_exp.check_expiry(now).is_ok());
        assert_eq!(no_exp.expires_at(), None);

        let later = AccountClaims::for_account(&account, Some(now + chrono::Duration::minutes(5)));
        assert!(later.check_expiry(now).is_ok());
        assert_eq!(
            later.check_expiry(now + chrono::Duration::minutes(5)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn serialized_claims_omit_absent_expiry() {
        let account = Account::new("Ana", "Rad").with_id(AccountId::new(9));
        let v = serde_json::to_value(AccountClaims::for_account(&account, None)).unwrap();
        assert_eq!(v, json!({ "id": 9, "uuid": account.external_id.to_string() }));
    }
}
