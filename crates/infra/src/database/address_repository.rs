//! Address repository

use std::sync::Arc;

use async_trait::async_trait;
use mdsync_core::{AddressRepository, EntityStore, SyncWrite};
use mdsync_domain::{Address, MdSyncError, ReconcileMode, Result, SyncScope};
use rusqlite::{params, Connection, OptionalExtension, Row, Statement, Transaction};
use tokio::task;
use tracing::debug;

use super::manager::DbManager;
use super::sync_meta_repository::upsert_sync_meta;
use super::{code_from_sql, map_join_error, map_sql_error, query_max_address_suffix};

const ADDRESS_COLUMNS: &str = "id, card_code, addr_type, street, block, building, city, \
     zip_code, county, state, country, create_date, update_date, source, sync_status";

const INSERT_ADDRESS_SQL: &str = "INSERT INTO addresses (id, card_code, addr_type, street, \
     block, building, city, zip_code, county, state, country, create_date, update_date, source, \
     sync_status)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)";

const UPSERT_ADDRESS_SQL: &str = "INSERT INTO addresses (id, card_code, addr_type, street, \
     block, building, city, zip_code, county, state, country, create_date, update_date, source, \
     sync_status)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
     ON CONFLICT(card_code, id) DO UPDATE SET
         addr_type = excluded.addr_type,
         street = excluded.street,
         block = excluded.block,
         building = excluded.building,
         city = excluded.city,
         zip_code = excluded.zip_code,
         county = excluded.county,
         state = excluded.state,
         country = excluded.country,
         create_date = COALESCE(excluded.create_date, create_date),
         update_date = COALESCE(excluded.update_date, update_date),
         source = excluded.source,
         sync_status = excluded.sync_status,
         updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')";

/// SQLite-backed address store
pub struct SqliteAddressRepository {
    db: Arc<DbManager>,
}

impl SqliteAddressRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EntityStore<Address> for SqliteAddressRepository {
    async fn list_for_scope(&self, scope: &SyncScope) -> Result<Vec<Address>> {
        let SyncScope::Addresses(card_code) = scope else {
            return Err(MdSyncError::InvalidInput(format!("scope {scope} does not hold addresses")));
        };
        self.list_addresses(card_code).await
    }

    async fn apply_sync(&self, write: SyncWrite<Address>) -> Result<usize> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            let sql = match write.mode {
                ReconcileMode::Bootstrap => {
                    INSERT_ADDRESS_SQL.replacen("INSERT INTO", "INSERT OR IGNORE INTO", 1)
                }
                ReconcileMode::Incremental => UPSERT_ADDRESS_SQL.to_string(),
            };
            let written = execute_all(&tx, &sql, &write.rows).map_err(map_sql_error)?;
            upsert_sync_meta(&tx, &write.checkpoint).map_err(map_sql_error)?;

            tx.commit().map_err(map_sql_error)?;
            debug!(scope = %write.scope, mode = ?write.mode, written, "address sync applied");
            Ok(written)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl AddressRepository for SqliteAddressRepository {
    async fn find_address(&self, card_code: &str, id: &str) -> Result<Option<Address>> {
        let db = Arc::clone(&self.db);
        let card_code = card_code.to_string();
        let id = id.to_string();

        task::spawn_blocking(move || -> Result<Option<Address>> {
            let conn = db.get_connection()?;
            query_address(&conn, &card_code, &id).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_addresses(&self, card_code: &str) -> Result<Vec<Address>> {
        let db = Arc::clone(&self.db);
        let card_code = card_code.to_string();

        task::spawn_blocking(move || -> Result<Vec<Address>> {
            let conn = db.get_connection()?;
            query_addresses_for_partner(&conn, &card_code).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn save_address(&self, address: &Address) -> Result<()> {
        let db = Arc::clone(&self.db);
        let address = address.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(UPSERT_ADDRESS_SQL).map_err(map_sql_error)?;
            execute_address(&mut stmt, &address).map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn max_address_suffix(&self) -> Result<u64> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<u64> {
            let conn = db.get_connection()?;
            query_max_address_suffix(&conn).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

fn execute_all(tx: &Transaction<'_>, sql: &str, rows: &[Address]) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare(sql)?;
    let mut written = 0;
    for address in rows {
        written += execute_address(&mut stmt, address)?;
    }
    Ok(written)
}

/// Plain insert; a duplicate `(card_code, id)` is a constraint error.
pub(crate) fn insert_address(tx: &Transaction<'_>, address: &Address) -> rusqlite::Result<usize> {
    let mut stmt = tx.prepare_cached(INSERT_ADDRESS_SQL)?;
    execute_address(&mut stmt, address)
}

pub(crate) fn insert_address_if_absent(
    tx: &Transaction<'_>,
    address: &Address,
) -> rusqlite::Result<usize> {
    let sql = INSERT_ADDRESS_SQL.replacen("INSERT INTO", "INSERT OR IGNORE INTO", 1);
    let mut stmt = tx.prepare_cached(&sql)?;
    execute_address(&mut stmt, address)
}

fn query_address(
    conn: &Connection,
    card_code: &str,
    id: &str,
) -> rusqlite::Result<Option<Address>> {
    let sql = format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE card_code = ?1 AND id = ?2");
    conn.query_row(&sql, params![card_code, id], map_address_row).optional()
}

fn query_addresses_for_partner(conn: &Connection, card_code: &str) -> rusqlite::Result<Vec<Address>> {
    let sql = format!("SELECT {ADDRESS_COLUMNS} FROM addresses WHERE card_code = ?1 ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![card_code], map_address_row)?;
    rows.collect()
}

fn execute_address(stmt: &mut Statement<'_>, address: &Address) -> rusqlite::Result<usize> {
    stmt.execute(params![
        address.id,
        address.card_code,
        address.addr_type.as_str(),
        address.street,
        address.block,
        address.building,
        address.city,
        address.zip_code,
        address.county,
        address.state,
        address.country,
        address.create_date,
        address.update_date,
        address.provenance.source.as_str(),
        address.provenance.sync_status.as_str(),
    ])
}

fn map_address_row(row: &Row<'_>) -> rusqlite::Result<Address> {
    let addr_type: String = row.get(2)?;
    let source: String = row.get(13)?;
    let sync_status: String = row.get(14)?;

    let mut address = Address::new(
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        code_from_sql(2, &addr_type)?,
    );
    address.street = row.get(3)?;
    address.block = row.get(4)?;
    address.building = row.get(5)?;
    address.city = row.get(6)?;
    address.zip_code = row.get(7)?;
    address.county = row.get(8)?;
    address.state = row.get(9)?;
    address.country = row.get(10)?;
    address.create_date = row.get(11)?;
    address.update_date = row.get(12)?;
    address.provenance.source = code_from_sql(13, &source)?;
    address.provenance.sync_status = code_from_sql(14, &sync_status)?;
    Ok(address)
}
