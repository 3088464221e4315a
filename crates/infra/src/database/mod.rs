//! SQLite persistence for partners, addresses, contacts and sync checkpoints

pub mod address_repository;
pub mod business_partner_repository;
pub mod contact_repository;
pub mod import_repository;
pub mod manager;
pub mod pool;
pub mod sync_meta_repository;

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use mdsync_domain::MdSyncError;
use rusqlite::types::Type;
use tokio::task;

pub use address_repository::SqliteAddressRepository;
pub use business_partner_repository::SqliteBusinessPartnerRepository;
pub use contact_repository::SqliteContactRepository;
pub use import_repository::SqliteImportRepository;
pub use manager::DbManager;
pub use pool::{create_pool, PoolConfig, SqliteConnection, SqlitePool};
pub use sync_meta_repository::SqliteSyncMetaRepository;

use crate::errors::InfraError;

/// Address IDs of the form `A<digits>`, as a GLOB pair.
pub(crate) const MAX_ADDRESS_SUFFIX_SQL: &str =
    "SELECT MAX(CAST(SUBSTR(id, 2) AS INTEGER)) FROM addresses
     WHERE id GLOB 'A[0-9]*' AND id NOT GLOB 'A*[^0-9]*'";

pub(crate) fn map_sql_error(err: rusqlite::Error) -> MdSyncError {
    MdSyncError::from(InfraError::from(err))
}

pub(crate) fn map_join_error(err: task::JoinError) -> MdSyncError {
    if err.is_cancelled() {
        MdSyncError::Internal("blocking task cancelled".into())
    } else {
        MdSyncError::Internal(format!("blocking task failed: {err}"))
    }
}

pub(crate) fn ts_to_sql(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn ts_from_sql(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

/// Parse a code column stored via `as_str()`.
pub(crate) fn code_from_sql<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    raw.parse::<T>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into()))
}

/// `MAX(...)` over an empty set reads as NULL.
pub(crate) fn query_max_address_suffix(conn: &rusqlite::Connection) -> rusqlite::Result<u64> {
    let max: Option<i64> = conn.query_row(MAX_ADDRESS_SUFFIX_SQL, [], |row| row.get(0))?;
    Ok(max.and_then(|value| u64::try_from(value).ok()).unwrap_or(0))
}
