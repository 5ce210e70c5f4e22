//! Postgres-backed account store.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Persistence` | Duplicate `external_id` |
//! | Database (check violation) | `23514` | `InvalidArgument` | Negative balance / empty name |
//! | Database (string too long) | `22001` | `InvalidArgument` | Name wider than the column |
//! | Database (other) | Any other | `Persistence` | Other database errors |
//! | ColumnDecode / ColumnNotFound / ColumnIndexOutOfBounds | N/A | `CorruptRow` | Row shape mismatch |
//! | PoolTimedOut / PoolClosed / Io / other | N/A | `Persistence` | Connectivity |
//!
//! ## Concurrency
//!
//! Uniqueness of `id` and `external_id` is enforced by the table's PRIMARY KEY
//! and UNIQUE constraints. `create_account` is a single `INSERT ... RETURNING`
//! round-trip, so there is no window between the write and the id lookup.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::instrument;

use bankapi_core::{Account, AccountId, ExternalId};

use super::row::{ACCOUNT_COLUMNS, account_from_row};
use super::r#trait::{AccountStore, StoreError};
use crate::config::DatabaseConfig;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id          BIGSERIAL PRIMARY KEY,
        external_id UUID NOT NULL UNIQUE,
        first_name  VARCHAR(30) NOT NULL CHECK (btrim(first_name) <> ''),
        last_name   VARCHAR(30) NOT NULL CHECK (btrim(last_name) <> ''),
        balance     BIGINT NOT NULL DEFAULT 0 CHECK (balance >= 0)
    )
"#;

/// Postgres-backed implementation of [`AccountStore`].
///
/// Cheap to clone; the pool is shared.
#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        Ok(Self::new(pool))
    }

    /// Create the `accounts` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("init", e))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self, account), fields(external_id = %account.external_id), err)]
    async fn create_account(&self, account: &Account) -> Result<AccountId, StoreError> {
        account.validate()?;

        let row = sqlx::query(
            r#"
            INSERT INTO accounts (external_id, first_name, last_name, balance)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(account.external_id.as_uuid())
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.balance)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_account", e))?;

        let id: i64 = row
            .try_get(0)
            .map_err(|e| StoreError::CorruptRow(format!("returned id: {e}")))?;

        tracing::debug!(account_id = id, "account created");
        Ok(AccountId::new(id))
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn get_account_by_id(&self, id: AccountId) -> Result<Account, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_account_by_id", e))?;

        match row {
            Some(row) => account_from_row(&row),
            None => Err(StoreError::not_found(id)),
        }
    }

    #[instrument(skip(self), fields(external_id = %external_id), err)]
    async fn get_account_by_external_id(&self, external_id: ExternalId) -> Result<Account, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE external_id = $1"
        ))
        .bind(external_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_account_by_external_id", e))?;

        match row {
            Some(row) => account_from_row(&row),
            None => Err(StoreError::not_found(external_id)),
        }
    }

    #[instrument(skip(self), err)]
    async fn get_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_accounts", e))?;

        rows.iter().map(account_from_row).collect()
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn delete_account_by_id(&self, id: AccountId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_account_by_id", e))?;

        tracing::debug!(rows_affected = result.rows_affected(), "delete by id");
        Ok(())
    }

    #[instrument(skip(self), fields(external_id = %external_id), err)]
    async fn delete_account_by_external_id(&self, external_id: ExternalId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE external_id = $1")
            .bind(external_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_account_by_external_id", e))?;

        tracing::debug!(rows_affected = result.rows_affected(), "delete by external id");
        Ok(())
    }

    #[instrument(skip(self, account), fields(account_id = %account.id), err)]
    async fn update_account(&self, account: &Account) -> Result<(), StoreError> {
        account.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET first_name = $2,
                last_name = $3,
                balance = $4
            WHERE id = $1
            "#,
        )
        .bind(account.id.get())
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.balance)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_account", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(account.id));
        }
        Ok(())
    }
}

/// Map SQLx errors to store errors (see module docs for the table).
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            match db_err.code().as_deref() {
                Some("23505") => StoreError::Persistence(format!("duplicate account: {msg}")),
                Some("23514") | Some("22001") => StoreError::InvalidArgument(msg),
                _ => StoreError::Persistence(msg),
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound(format!("row in {operation}")),
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. } => {
            StoreError::CorruptRow(format!("{operation}: {err}"))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Persistence(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Persistence(format!("timed out acquiring a connection in {operation}"))
        }
        other => StoreError::Persistence(format!("{operation}: {other}")),
    }
}
