//! Infrastructure layer: account persistence and process configuration.

pub mod account_store;
pub mod config;

pub use account_store::{AccountStore, InMemoryAccountStore, PostgresAccountStore, StoreError};
pub use config::{AppConfig, ConfigError, DatabaseConfig, StoreBackend};
