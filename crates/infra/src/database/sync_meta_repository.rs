//! Per-scope sync checkpoints

use std::sync::Arc;

use async_trait::async_trait;
use mdsync_core::SyncMetaRepository;
use mdsync_domain::{Result, SyncMeta};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;

use super::manager::DbManager;
use super::{map_join_error, map_sql_error, ts_from_sql, ts_to_sql};

pub struct SqliteSyncMetaRepository {
    db: Arc<DbManager>,
}

impl SqliteSyncMetaRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SyncMetaRepository for SqliteSyncMetaRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<SyncMeta>> {
        let db = Arc::clone(&self.db);
        let code = code.to_string();

        task::spawn_blocking(move || -> Result<Option<SyncMeta>> {
            let conn = db.get_connection()?;
            query_sync_meta(&conn, &code).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn upsert(&self, meta: &SyncMeta) -> Result<()> {
        let db = Arc::clone(&self.db);
        let meta = meta.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            upsert_sync_meta(&conn, &meta).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

/// Also called inside entity write transactions.
pub(crate) fn upsert_sync_meta(conn: &Connection, meta: &SyncMeta) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO sync_meta (code, description, last_sync_at, updated_by, updated_at)
         VALUES (?1, ?2, ?3, ?4, strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
         ON CONFLICT(code) DO UPDATE SET
             description = excluded.description,
             last_sync_at = excluded.last_sync_at,
             updated_by = excluded.updated_by,
             updated_at = excluded.updated_at",
        params![meta.code, meta.description, ts_to_sql(meta.last_sync_at), meta.updated_by],
    )?;
    Ok(())
}

fn query_sync_meta(conn: &Connection, code: &str) -> rusqlite::Result<Option<SyncMeta>> {
    conn.query_row(
        "SELECT code, description, last_sync_at, updated_by FROM sync_meta WHERE code = ?1",
        params![code],
        map_sync_meta_row,
    )
    .optional()
}

fn map_sync_meta_row(row: &Row<'_>) -> rusqlite::Result<SyncMeta> {
    let last_sync_at: String = row.get(2)?;
    Ok(SyncMeta {
        code: row.get(0)?,
        description: row.get(1)?,
        last_sync_at: ts_from_sql(2, &last_sync_at)?,
        updated_by: row.get(3)?,
    })
}
