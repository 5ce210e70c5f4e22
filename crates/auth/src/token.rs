//! HMAC-signed account tokens.
//!
//! Tokens are JWTs signed with HS256. Validation accepts the HMAC family only
//! and rejects any other `alg` before the signature is looked at.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use thiserror::Error;

use bankapi_core::Account;

use crate::claims::AccountClaims;

const ISSUE_ALGORITHM: Algorithm = Algorithm::HS256;
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("no token signing key is configured")]
    MissingSigningKey,

    #[error("unexpected signing algorithm: {0}")]
    InvalidSignature(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token has expired")]
    Expired,

    #[error("invalid token claims: {0}")]
    InvalidClaims(String),

    #[error("token lifetime is too large to compute an expiry")]
    TtlOutOfRange,
}

impl TokenError {
    /// Configuration problem on our side rather than a bad token.
    pub fn is_config(&self) -> bool {
        matches!(self, TokenError::MissingSigningKey | TokenError::TtlOutOfRange)
    }
}

/// Token service configuration.
#[derive(Clone, Default)]
pub struct TokenConfig {
    /// Symmetric HMAC key. `None` (or empty) makes every issue/validate call
    /// fail with [`TokenError::MissingSigningKey`].
    pub signing_key: Option<String>,

    /// Optional token lifetime. `None` issues tokens without `exp`.
    pub ttl: Option<Duration>,
}

impl TokenConfig {
    pub fn new(signing_key: impl Into<String>) -> Self {
        Self {
            signing_key: Some(signing_key.into()),
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

impl core::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("signing_key", &self.signing_key.as_ref().map(|_| "<redacted>"))
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Validates presented tokens (transport-agnostic).
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AccountClaims, TokenError>;
}

/// Issues and validates account tokens.
///
/// Stateless and cheap to clone; the key is shared behind an `Arc`.
#[derive(Clone)]
pub struct TokenService {
    key: Option<Arc<[u8]>>,
    ttl: Option<Duration>,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let key = config
            .signing_key
            .filter(|k| !k.is_empty())
            .map(|k| Arc::<[u8]>::from(k.into_bytes()));

        Self { key, ttl: config.ttl }
    }

    pub fn has_signing_key(&self) -> bool {
        self.key.is_some()
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Issue a token for a persisted account.
    pub fn issue(&self, account: &Account) -> Result<String, TokenError> {
        self.issue_at(account, Utc::now())
    }

    pub fn issue_at(&self, account: &Account, now: DateTime<Utc>) -> Result<String, TokenError> {
        let key = self.key.as_deref().ok_or(TokenError::MissingSigningKey)?;

        let expires_at = self
            .ttl
            .map(|ttl| now.checked_add_signed(ttl).ok_or(TokenError::TtlOutOfRange))
            .transpose()?;
        let claims = AccountClaims::for_account(account, expires_at);

        jsonwebtoken::encode(
            &Header::new(ISSUE_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(key),
        )
        .map_err(|e| TokenError::InvalidToken(format!("encoding failed: {e}")))
    }

    /// Verify a token and decode its claims.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<AccountClaims, TokenError> {
        let key = self.key.as_deref().ok_or(TokenError::MissingSigningKey)?;

        check_algorithm(token)?;

        let mut validation = Validation::new(ISSUE_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        // Expiry is optional and checked against the caller's clock below.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<Map<String, Value>>(
            token,
            &DecodingKey::from_secret(key),
            &validation,
        )
        .map_err(map_jwt_error)?;

        let claims = AccountClaims::from_payload(&data.claims)?;
        claims.check_expiry(now)?;
        Ok(claims)
    }
}

impl TokenValidator for TokenService {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AccountClaims, TokenError> {
        self.validate_at(token, now)
    }
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("has_signing_key", &self.has_signing_key())
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Reject non-HMAC algorithms (including `none`) from the raw header.
///
/// Done by hand because `jsonwebtoken` cannot represent `none` and would
/// report it as a generic parse failure.
fn check_algorithm(token: &str) -> Result<(), TokenError> {
    let mut parts = token.split('.');
    let (Some(header), Some(_), Some(_), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
        return Err(TokenError::InvalidToken("expected three dot-separated segments".into()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|e| TokenError::InvalidToken(format!("header encoding: {e}")))?;
    let header: Value = serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::InvalidToken(format!("header json: {e}")))?;

    let alg = header
        .get("alg")
        .and_then(Value::as_str)
        .ok_or_else(|| TokenError::InvalidToken("header has no `alg`".into()))?;

    if matches!(alg, "HS256" | "HS384" | "HS512") {
        Ok(())
    } else {
        Err(TokenError::InvalidSignature(alg.to_string()))
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature(err.to_string()),
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::InvalidToken("signature mismatch".into()),
        _ => TokenError::InvalidToken(err.to_string()),
    }
}
