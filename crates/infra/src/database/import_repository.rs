//! Store behind the chunked partner import

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mdsync_core::{ImportCommit, ImportStore, ImportWrite};
use mdsync_domain::Result;
use rusqlite::{params, params_from_iter, Connection, Transaction};
use tokio::task;
use tracing::debug;

use super::address_repository::insert_address_if_absent;
use super::business_partner_repository::insert_partner_if_absent;
use super::manager::DbManager;
use super::{map_join_error, map_sql_error, query_max_address_suffix};

pub struct SqliteImportRepository {
    db: Arc<DbManager>,
}

impl SqliteImportRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ImportStore for SqliteImportRepository {
    async fn existing_card_codes(&self, codes: &[String]) -> Result<HashSet<String>> {
        if codes.is_empty() {
            return Ok(HashSet::new());
        }
        let db = Arc::clone(&self.db);
        let codes = codes.to_vec();

        task::spawn_blocking(move || -> Result<HashSet<String>> {
            let conn = db.get_connection()?;
            query_live_codes(&conn, &codes).map_err(map_sql_error)
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

    async fn commit_import(&self, write: &ImportWrite) -> Result<ImportCommit> {
        let db = Arc::clone(&self.db);
        let write = write.clone();

        task::spawn_blocking(move || -> Result<ImportCommit> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;
            let committed = commit_all(&tx, &write).map_err(map_sql_error)?;
            tx.commit().map_err(map_sql_error)?;

            debug!(
                partners = committed.partners,
                addresses = committed.addresses,
                excess_managers = committed.excess_managers,
                "import rows inserted"
            );
            Ok(committed)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

/// Duplicates are skipped. Addresses and manager links only land for
/// partners inserted by this call.
fn commit_all(tx: &Transaction<'_>, write: &ImportWrite) -> rusqlite::Result<ImportCommit> {
    let mut committed = ImportCommit::default();
    let mut inserted = HashSet::new();

    for partner in &write.partners {
        if insert_partner_if_absent(tx, partner)? > 0 {
            committed.partners += 1;
            inserted.insert(partner.card_code.as_str());
        }
    }

    for address in write.addresses.iter().filter(|a| inserted.contains(a.card_code.as_str())) {
        committed.addresses += insert_address_if_absent(tx, address)?;
    }

    let mut link = tx.prepare_cached(
        "INSERT OR IGNORE INTO excess_managers (card_code, user_id) VALUES (?1, ?2)",
    )?;
    for manager in write.excess_managers.iter().filter(|m| inserted.contains(m.card_code.as_str())) {
        committed.excess_managers += link.execute(params![manager.card_code, manager.user_id])?;
    }

    Ok(committed)
}

fn query_live_codes(conn: &Connection, codes: &[String]) -> rusqlite::Result<HashSet<String>> {
    let placeholders = vec!["?"; codes.len()].join(", ");
    let sql = format!(
        "SELECT card_code FROM business_partners
         WHERE deleted_at IS NULL AND card_code IN ({placeholders})"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(codes.iter()), |row| row.get::<_, String>(0))?;
    rows.collect()
}
