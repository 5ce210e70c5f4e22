//! `bankapi-core` — account domain building blocks.
//!
//! This crate contains **pure domain** types (no storage, HTTP or token concerns).

pub mod account;
pub mod entity;
pub mod error;
pub mod id;

pub use account::{Account, MAX_NAME_LEN, validate_balance, validate_name};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, ExternalId};
