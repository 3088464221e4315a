//! Contact person repository

use std::sync::Arc;

use async_trait::async_trait;
use mdsync_core::ContactRepository;
use mdsync_domain::{Contact, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;

use super::manager::DbManager;
use super::{code_from_sql, map_join_error, map_sql_error};

const CONTACT_COLUMNS: &str =
    "id, card_code, name, first_name, last_name, position, phone, email, source, sync_status";

pub struct SqliteContactRepository {
    db: Arc<DbManager>,
}

impl SqliteContactRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactRepository for SqliteContactRepository {
    async fn find_contact(&self, id: &str) -> Result<Option<Contact>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();

        task::spawn_blocking(move || -> Result<Option<Contact>> {
            let conn = db.get_connection()?;
            let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1");
            conn.query_row(&sql, params![id], map_contact_row).optional().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_contact_by_name(&self, card_code: &str, name: &str) -> Result<Option<Contact>> {
        let db = Arc::clone(&self.db);
        let card_code = card_code.to_string();
        let name = name.to_string();

        task::spawn_blocking(move || -> Result<Option<Contact>> {
            let conn = db.get_connection()?;
            query_contact_by_name(&conn, &card_code, &name).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_contacts(&self, card_code: &str) -> Result<Vec<Contact>> {
        let db = Arc::clone(&self.db);
        let card_code = card_code.to_string();

        task::spawn_blocking(move || -> Result<Vec<Contact>> {
            let conn = db.get_connection()?;
            query_contacts(&conn, &card_code).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn save_contact(&self, contact: &Contact) -> Result<()> {
        let db = Arc::clone(&self.db);
        let contact = contact.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            upsert_contact(&conn, &contact).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

fn upsert_contact(conn: &Connection, contact: &Contact) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO contacts (id, card_code, name, first_name, last_name, position, phone, email, source, sync_status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             first_name = excluded.first_name,
             last_name = excluded.last_name,
             position = excluded.position,
             phone = excluded.phone,
             email = excluded.email,
             source = excluded.source,
             sync_status = excluded.sync_status,
             updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')",
        params![
            contact.id,
            contact.card_code,
            contact.name,
            contact.first_name,
            contact.last_name,
            contact.position,
            contact.phone,
            contact.email,
            contact.provenance.source.as_str(),
            contact.provenance.sync_status.as_str(),
        ],
    )?;
    Ok(())
}

/// Names are not unique per partner; the oldest row wins.
fn query_contact_by_name(
    conn: &Connection,
    card_code: &str,
    name: &str,
) -> rusqlite::Result<Option<Contact>> {
    let sql = format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts WHERE card_code = ?1 AND name = ?2
         ORDER BY created_at, id LIMIT 1"
    );
    conn.query_row(&sql, params![card_code, name], map_contact_row).optional()
}

fn query_contacts(conn: &Connection, card_code: &str) -> rusqlite::Result<Vec<Contact>> {
    let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE card_code = ?1 ORDER BY name, id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![card_code], map_contact_row)?;
    rows.collect()
}

fn map_contact_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    let source: String = row.get(8)?;
    let sync_status: String = row.get(9)?;

    let mut contact =
        Contact::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?);
    contact.first_name = row.get(3)?;
    contact.last_name = row.get(4)?;
    contact.position = row.get(5)?;
    contact.phone = row.get(6)?;
    contact.email = row.get(7)?;
    contact.provenance.source = code_from_sql(8, &source)?;
    contact.provenance.sync_status = code_from_sql(9, &sync_status)?;
    Ok(contact)
}
