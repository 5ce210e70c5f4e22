//! `bankapi-auth` — account token issuance and validation.
//!
//! This crate is intentionally decoupled from HTTP and storage: it only knows
//! how to bind a signed token to an account's identifiers and verify it again.

pub mod claims;
pub mod token;

pub use claims::AccountClaims;
pub use token::{TokenConfig, TokenError, TokenService, TokenValidator};
