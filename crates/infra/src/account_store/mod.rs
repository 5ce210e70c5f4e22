//! Account persistence boundary.
//!
//! This module defines the storage-agnostic `AccountStore` trait plus its
//! Postgres and in-memory implementations.

pub mod in_memory;
pub mod postgres;
pub mod row;
pub mod r#trait;

pub use in_memory::InMemoryAccountStore;
pub use postgres::PostgresAccountStore;
pub use row::{ACCOUNT_COLUMNS, RawAccountRow, account_from_row};
pub use r#trait::{AccountStore, StoreError};
