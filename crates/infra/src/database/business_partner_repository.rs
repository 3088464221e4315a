//! Business partner repository
//!
//! Serves both the reconciler (`EntityStore<BusinessPartner>`) and portal
//! maintenance (`PartnerRepository`). Soft-deleted partners are invisible to
//! every read here.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mdsync_core::{EntityStore, PartnerRepository, SyncWrite};
use mdsync_domain::{
    AddrType, Address, BusinessPartner, CardType, MdSyncError, ReconcileMode, Result, SyncScope,
};
use rusqlite::{params, Connection, OptionalExtension, Row, Statement, Transaction};
use tokio::task;
use tracing::debug;

use super::address_repository::insert_address;
use super::manager::DbManager;
use super::sync_meta_repository::upsert_sync_meta;
use super::{code_from_sql, map_join_error, map_sql_error, ts_from_sql, ts_to_sql};

pub(crate) const PARTNER_COLUMNS: &str = "card_code, card_name, card_type, group_code, \
     partner_type, status, scope, phone, email, currency, payment_terms, commodity_strengths, \
     mfr_strengths, contact_person, bill_to_def, ship_to_def, create_date, update_date, source, \
     sync_status, deleted_at, deleted_by";

const INSERT_PARTNER_SQL: &str = "INSERT INTO business_partners (card_code, card_name, \
     card_type, group_code, partner_type, status, scope, phone, email, currency, payment_terms, \
     commodity_strengths, mfr_strengths, contact_person, bill_to_def, ship_to_def, create_date, \
     update_date, source, sync_status)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)";

/// SQLite-backed business partner store
pub struct SqliteBusinessPartnerRepository {
    db: Arc<DbManager>,
}

impl SqliteBusinessPartnerRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EntityStore<BusinessPartner> for SqliteBusinessPartnerRepository {
    async fn list_for_scope(&self, scope: &SyncScope) -> Result<Vec<BusinessPartner>> {
        let SyncScope::Partners(card_type) = scope else {
            return Err(MdSyncError::InvalidInput(format!(
                "scope {scope} does not hold business partners"
            )));
        };
        self.list_partners(*card_type).await
    }

    async fn apply_sync(&self, write: SyncWrite<BusinessPartner>) -> Result<usize> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<usize> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            let written = match write.mode {
                ReconcileMode::Bootstrap => insert_all(&tx, &write.rows),
                ReconcileMode::Incremental => upsert_all(&tx, &write.rows),
            }
            .map_err(map_sql_error)?;
            upsert_sync_meta(&tx, &write.checkpoint).map_err(map_sql_error)?;

            tx.commit().map_err(map_sql_error)?;
            debug!(scope = %write.scope, mode = ?write.mode, written, "partner sync applied");
            Ok(written)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl PartnerRepository for SqliteBusinessPartnerRepository {
    async fn find_partner(&self, card_code: &str) -> Result<Option<BusinessPartner>> {
        let db = Arc::clone(&self.db);
        let card_code = card_code.to_string();

        task::spawn_blocking(move || -> Result<Option<BusinessPartner>> {
            let conn = db.get_connection()?;
            query_live_partner(&conn, &card_code).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_partners(&self, card_type: CardType) -> Result<Vec<BusinessPartner>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<BusinessPartner>> {
            let conn = db.get_connection()?;
            query_partners_by_type(&conn, card_type).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn save_partner(&self, partner: &BusinessPartner, new_addresses: &[Address]) -> Result<()> {
        let db = Arc::clone(&self.db);
        let partner = partner.clone();
        let new_addresses = new_addresses.to_vec();

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db.get_connection()?;
            let tx = conn.transaction().map_err(map_sql_error)?;

            save_portal_partner(&tx, &partner).map_err(map_sql_error)?;
            for address in &new_addresses {
                insert_address(&tx, address).map_err(map_sql_error)?;
            }

            tx.commit().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn soft_delete_partner(
        &self,
        card_code: &str,
        deleted_by: &str,
        deleted_at: DateTime<Utc>,
    ) -> Result<bool> {
        let db = Arc::clone(&self.db);
        let card_code = card_code.to_string();
        let deleted_by = deleted_by.to_string();

        task::spawn_blocking(move || -> Result<bool> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE business_partners SET deleted_at = ?2, deleted_by = ?3, updated_at = ?2
                     WHERE card_code = ?1 AND deleted_at IS NULL",
                    params![card_code, ts_to_sql(deleted_at), deleted_by],
                )
                .map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_default_address(&self, card_code: &str, addr_type: AddrType, address_id: &str) -> Result<()> {
        let column = match addr_type {
            AddrType::Billing => "bill_to_def",
            AddrType::Shipping => "ship_to_def",
        };
        let sql = format!(
            "UPDATE business_partners SET {column} = ?2, updated_at = ?3
             WHERE card_code = ?1 AND deleted_at IS NULL"
        );
        self.update_live_partner(card_code, sql, address_id.to_string()).await
    }

    async fn set_default_contact(&self, card_code: &str, contact_name: &str) -> Result<()> {
        let sql = "UPDATE business_partners SET contact_person = ?2, updated_at = ?3
                   WHERE card_code = ?1 AND deleted_at IS NULL"
            .to_string();
        self.update_live_partner(card_code, sql, contact_name.to_string()).await
    }
}

impl SqliteBusinessPartnerRepository {
    async fn update_live_partner(&self, card_code: &str, sql: String, value: String) -> Result<()> {
        let db = Arc::clone(&self.db);
        let card_code = card_code.to_string();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(&sql, params![card_code, value, ts_to_sql(Utc::now())])
                .map_err(map_sql_error)?;
            if changed == 0 {
                return Err(MdSyncError::NotFound(format!("business partner {card_code}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// SQL Operations (synchronous)
// ============================================================================

fn insert_all(tx: &Transaction<'_>, rows: &[BusinessPartner]) -> rusqlite::Result<usize> {
    let sql = INSERT_PARTNER_SQL.replacen("INSERT INTO", "INSERT OR IGNORE INTO", 1);
    let mut stmt = tx.prepare(&sql)?;
    let mut written = 0;
    for partner in rows {
        written += execute_partner(&mut stmt, partner)?;
    }
    Ok(written)
}

/// Overwrites ERP-sourced columns only. Default pointers the ERP leaves
/// blank keep their local value.
fn upsert_all(tx: &Transaction<'_>, rows: &[BusinessPartner]) -> rusqlite::Result<usize> {
    let sql = format!(
        "{INSERT_PARTNER_SQL}
         ON CONFLICT(card_code) WHERE deleted_at IS NULL DO UPDATE SET
             card_name = excluded.card_name,
             card_type = excluded.card_type,
             group_code = excluded.group_code,
             partner_type = excluded.partner_type,
             status = excluded.status,
             scope = excluded.scope,
             phone = excluded.phone,
             email = excluded.email,
             currency = excluded.currency,
             payment_terms = excluded.payment_terms,
             commodity_strengths = excluded.commodity_strengths,
             mfr_strengths = excluded.mfr_strengths,
             contact_person = COALESCE(excluded.contact_person, contact_person),
             bill_to_def = COALESCE(excluded.bill_to_def, bill_to_def),
             ship_to_def = COALESCE(excluded.ship_to_def, ship_to_def),
             create_date = excluded.create_date,
             update_date = excluded.update_date,
             source = excluded.source,
             sync_status = excluded.sync_status,
             updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')"
    );
    let mut stmt = tx.prepare(&sql)?;
    let mut written = 0;
    for partner in rows {
        written += execute_partner(&mut stmt, partner)?;
    }
    Ok(written)
}

/// Portal saves replace every column of the live row.
fn save_portal_partner(tx: &Transaction<'_>, partner: &BusinessPartner) -> rusqlite::Result<()> {
    let sql = format!(
        "{INSERT_PARTNER_SQL}
         ON CONFLICT(card_code) WHERE deleted_at IS NULL DO UPDATE SET
             card_name = excluded.card_name,
             group_code = excluded.group_code,
             partner_type = excluded.partner_type,
             status = excluded.status,
             scope = excluded.scope,
             phone = excluded.phone,
             email = excluded.email,
             currency = excluded.currency,
             payment_terms = excluded.payment_terms,
             commodity_strengths = excluded.commodity_strengths,
             mfr_strengths = excluded.mfr_strengths,
             contact_person = excluded.contact_person,
             bill_to_def = excluded.bill_to_def,
             ship_to_def = excluded.ship_to_def,
             source = excluded.source,
             sync_status = excluded.sync_status,
             updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')"
    );
    let mut stmt = tx.prepare(&sql)?;
    execute_partner(&mut stmt, partner)?;
    Ok(())
}

pub(crate) fn insert_partner_if_absent(
    tx: &Transaction<'_>,
    partner: &BusinessPartner,
) -> rusqlite::Result<usize> {
    let sql = INSERT_PARTNER_SQL.replacen("INSERT INTO", "INSERT OR IGNORE INTO", 1);
    let mut stmt = tx.prepare_cached(&sql)?;
    execute_partner(&mut stmt, partner)
}

fn query_live_partner(conn: &Connection, card_code: &str) -> rusqlite::Result<Option<BusinessPartner>> {
    let sql = format!(
        "SELECT {PARTNER_COLUMNS} FROM business_partners
         WHERE card_code = ?1 AND deleted_at IS NULL"
    );
    conn.query_row(&sql, params![card_code], map_partner_row).optional()
}

fn query_partners_by_type(conn: &Connection, card_type: CardType) -> rusqlite::Result<Vec<BusinessPartner>> {
    let sql = format!(
        "SELECT {PARTNER_COLUMNS} FROM business_partners
         WHERE card_type = ?1 AND deleted_at IS NULL
         ORDER BY card_code"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![card_type.as_str()], map_partner_row)?;
    rows.collect()
}

fn execute_partner(stmt: &mut Statement<'_>, partner: &BusinessPartner) -> rusqlite::Result<usize> {
    stmt.execute(params![
        partner.card_code,
        partner.card_name,
        partner.card_type.as_str(),
        partner.group_code,
        partner.partner_type,
        partner.status,
        partner.scope,
        partner.phone,
        partner.email,
        partner.currency,
        partner.payment_terms,
        partner.commodity_strengths,
        partner.mfr_strengths,
        partner.contact_person,
        partner.bill_to_def,
        partner.ship_to_def,
        partner.create_date,
        partner.update_date,
        partner.provenance.source.as_str(),
        partner.provenance.sync_status.as_str(),
    ])
}

pub(crate) fn map_partner_row(row: &Row<'_>) -> rusqlite::Result<BusinessPartner> {
    let card_type: String = row.get(2)?;
    let source: String = row.get(18)?;
    let sync_status: String = row.get(19)?;
    let deleted_at: Option<String> = row.get(20)?;

    let mut partner = BusinessPartner::new(
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        code_from_sql(2, &card_type)?,
    );
    partner.group_code = row.get(3)?;
    partner.partner_type = row.get(4)?;
    partner.status = row.get(5)?;
    partner.scope = row.get(6)?;
    partner.phone = row.get(7)?;
    partner.email = row.get(8)?;
    partner.currency = row.get(9)?;
    partner.payment_terms = row.get(10)?;
    partner.commodity_strengths = row.get(11)?;
    partner.mfr_strengths = row.get(12)?;
    partner.contact_person = row.get(13)?;
    partner.bill_to_def = row.get(14)?;
    partner.ship_to_def = row.get(15)?;
    partner.create_date = row.get(16)?;
    partner.update_date = row.get(17)?;
    partner.provenance.source = code_from_sql(18, &source)?;
    partner.provenance.sync_status = code_from_sql(19, &sync_status)?;
    partner.deleted_at = deleted_at.as_deref().map(|raw| ts_from_sql(20, raw)).transpose()?;
    partner.deleted_by = row.get(21)?;
    Ok(partner)
}

// ============================================================================
// Tests
// ============================================================================
