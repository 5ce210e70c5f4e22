//! Row → `Account` mapping.
//!
//! Mapping is total and all-or-nothing: a row either yields a complete
//! `Account` or fails with `StoreError::CorruptRow`.

use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};
use uuid::Uuid;

use bankapi_core::{Account, AccountId, ExternalId};

use super::r#trait::StoreError;

/// Column list every account query selects, in mapping order.
pub const ACCOUNT_COLUMNS: &str = "id, external_id, first_name, last_name, balance";

/// A persisted account row, read positionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAccountRow {
    pub id: i64,
    pub external_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub balance: i64,
}

impl RawAccountRow {
    pub const COLUMN_COUNT: usize = 5;

    /// Read the five account columns by position.
    ///
    /// Any deviation in column count or column type is a `CorruptRow`.
    pub fn from_pg_row(row: &PgRow) -> Result<Self, StoreError> {
        if row.len() != Self::COLUMN_COUNT {
            return Err(StoreError::CorruptRow(format!(
                "expected {} columns, got {}",
                Self::COLUMN_COUNT,
                row.len()
            )));
        }

        Ok(Self {
            id: column(row, 0, "id")?,
            external_id: column(row, 1, "external_id")?,
            first_name: column(row, 2, "first_name")?,
            last_name: column(row, 3, "last_name")?,
            balance: column(row, 4, "balance")?,
        })
    }
}

fn column<'r, T>(row: &'r PgRow, index: usize, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get::<T, _>(index)
        .map_err(|e| StoreError::CorruptRow(format!("column {index} ({name}): {e}")))
}

impl TryFrom<RawAccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: RawAccountRow) -> Result<Self, Self::Error> {
        if row.id <= 0 {
            return Err(StoreError::CorruptRow(format!("non-positive id {}", row.id)));
        }

        let account = Account {
            id: AccountId::new(row.id),
            external_id: ExternalId::from_uuid(row.external_id),
            first_name: row.first_name,
            last_name: row.last_name,
            balance: row.balance,
        };
        account
            .validate()
            .map_err(|e| StoreError::CorruptRow(format!("account {}: {e}", account.id)))?;

        Ok(account)
    }
}

/// Map a raw Postgres row straight to an `Account`.
pub fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    RawAccountRow::from_pg_row(row)?.try_into()
}
