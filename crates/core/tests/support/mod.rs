//! Shared test helpers for `mdsync-core` integration tests.
//!
//! `MemoryDb` implements every persistence port over in-memory maps so the
//! services can be exercised end to end without SQLite. Failure switches
//! let tests simulate an unreachable store.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mdsync_core::ids::max_address_suffix;
use mdsync_core::import::{ImportCommit, ImportStore, ImportWrite};
use mdsync_core::master::{AddressRepository, ContactRepository, PartnerRepository};
use mdsync_core::sync::{EntityStore, ErpQuery, ErpQueryPort, SyncMetaRepository, SyncWrite};
use mdsync_core::CacheInvalidator;
use mdsync_domain::{
    AddrType, Address, BusinessPartner, CardType, Contact, ExcessManager, MdSyncError,
    ReconcileMode, Result, SyncMeta, SyncScope,
};
use parking_lot::Mutex;
use serde_json::Value;

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// ERP partner row as the query endpoint returns it.
pub fn erp_partner(code: &str, card_type: &str, created: &str, updated: &str) -> Value {
    serde_json::json!({
        "CardCode": code,
        "CardName": format!("{code} name"),
        "CardType": card_type,
        "CreateDate": created,
        "UpdateDate": updated
    })
}

/// ERP address row as the query endpoint returns it.
pub fn erp_address(name: &str, card_code: &str, created: &str, updated: &str) -> Value {
    serde_json::json!({
        "address": name,
        "CardCode": card_code,
        "AdresType": "B",
        "City": "Berlin",
        "CreateDate": created,
        "UpdateDate": updated
    })
}

#[derive(Debug, Default)]
pub struct MemoryState {
    pub partners: BTreeMap<String, BusinessPartner>,
    /// Keyed by `(card_code, id)`.
    pub addresses: BTreeMap<(String, String), Address>,
    pub contacts: BTreeMap<String, Contact>,
    pub sync_meta: BTreeMap<String, SyncMeta>,
    pub excess_managers: Vec<ExcessManager>,
}

/// In-memory implementation of every store port.
#[derive(Debug, Default)]
pub struct MemoryDb {
    pub state: Mutex<MemoryState>,
    pub fail_local_reads: AtomicBool,
    pub fail_checkpoint_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partner(self, partner: BusinessPartner) -> Self {
        self.state.lock().partners.insert(partner.card_code.clone(), partner);
        self
    }

    pub fn with_address(self, address: Address) -> Self {
        self.state.lock().addresses.insert(address_key(&address), address);
        self
    }

    pub fn with_contact(self, contact: Contact) -> Self {
        self.state.lock().contacts.insert(contact.id.clone(), contact);
        self
    }

    pub fn with_checkpoint(self, meta: SyncMeta) -> Self {
        self.state.lock().sync_meta.insert(meta.code.clone(), meta);
        self
    }

    pub fn partner(&self, code: &str) -> Option<BusinessPartner> {
        self.state.lock().partners.get(code).cloned()
    }

    pub fn address(&self, id: &str) -> Option<Address> {
        self.state.lock().addresses.values().find(|a| a.id == id).cloned()
    }

    pub fn checkpoint(&self, code: &str) -> Option<SyncMeta> {
        self.state.lock().sync_meta.get(code).cloned()
    }

    pub fn partner_count(&self) -> usize {
        self.state.lock().partners.len()
    }

    pub fn address_count(&self) -> usize {
        self.state.lock().addresses.len()
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(MdSyncError::Database(format!("{what} failed")));
        }
        Ok(())
    }
}

fn address_key(address: &Address) -> (String, String) {
    (address.card_code.clone(), address.id.clone())
}

fn apply_rows<K: Ord, T: Clone>(
    table: &mut BTreeMap<K, T>,
    rows: Vec<T>,
    mode: ReconcileMode,
    key: impl Fn(&T) -> K,
) -> usize {
    let mut written = 0;
    for row in rows {
        let k = key(&row);
        if mode == ReconcileMode::Bootstrap && table.contains_key(&k) {
            continue;
        }
        table.insert(k, row);
        written += 1;
    }
    written
}

#[async_trait]
impl EntityStore<BusinessPartner> for MemoryDb {
    async fn list_for_scope(&self, scope: &SyncScope) -> Result<Vec<BusinessPartner>> {
        Self::check(&self.fail_local_reads, "local read")?;
        let state = self.state.lock();
        Ok(state
            .partners
            .values()
            .filter(|bp| matches!(scope, SyncScope::Partners(t) if *t == bp.card_type))
            .cloned()
            .collect())
    }

    async fn apply_sync(&self, write: SyncWrite<BusinessPartner>) -> Result<usize> {
        Self::check(&self.fail_writes, "write")?;
        let mut state = self.state.lock();
        let written = apply_rows(&mut state.partners, write.rows, write.mode, |bp| bp.card_code.clone());
        state.sync_meta.insert(write.checkpoint.code.clone(), write.checkpoint);
        Ok(written)
    }
}

#[async_trait]
impl EntityStore<Address> for MemoryDb {
    async fn list_for_scope(&self, scope: &SyncScope) -> Result<Vec<Address>> {
        Self::check(&self.fail_local_reads, "local read")?;
        let state = self.state.lock();
        Ok(state
            .addresses
            .values()
            .filter(|a| matches!(scope, SyncScope::Addresses(code) if *code == a.card_code))
            .cloned()
            .collect())
    }

    async fn apply_sync(&self, write: SyncWrite<Address>) -> Result<usize> {
        Self::check(&self.fail_writes, "write")?;
        let mut state = self.state.lock();
        let written = apply_rows(&mut state.addresses, write.rows, write.mode, address_key);
        state.sync_meta.insert(write.checkpoint.code.clone(), write.checkpoint);
        Ok(written)
    }
}

#[async_trait]
impl SyncMetaRepository for MemoryDb {
    async fn find_by_code(&self, code: &str) -> Result<Option<SyncMeta>> {
        Self::check(&self.fail_checkpoint_reads, "checkpoint read")?;
        Ok(self.state.lock().sync_meta.get(code).cloned())
    }

    async fn upsert(&self, meta: &SyncMeta) -> Result<()> {
        Self::check(&self.fail_writes, "write")?;
        self.state.lock().sync_meta.insert(meta.code.clone(), meta.clone());
        Ok(())
    }
}

#[async_trait]
impl ImportStore for MemoryDb {
    async fn existing_card_codes(&self, codes: &[String]) -> Result<HashSet<String>> {
        let state = self.state.lock();
        Ok(codes
            .iter()
            .filter(|code| state.partners.get(*code).is_some_and(|bp| !bp.is_deleted()))
            .cloned()
            .collect())
    }

    async fn max_address_suffix(&self) -> Result<u64> {
        let state = self.state.lock();
        Ok(max_address_suffix(state.addresses.values().map(|a| a.id.as_str())))
    }

    async fn commit_import(&self, write: &ImportWrite) -> Result<ImportCommit> {
        Self::check(&self.fail_writes, "write")?;
        let mut state = self.state.lock();
        let mut commit = ImportCommit::default();
        for bp in &write.partners {
            if !state.partners.contains_key(&bp.card_code) {
                state.partners.insert(bp.card_code.clone(), bp.clone());
                commit.partners += 1;
            }
        }
        for address in &write.addresses {
            if !state.addresses.contains_key(&address_key(address)) {
                state.addresses.insert(address_key(address), address.clone());
                commit.addresses += 1;
            }
        }
        for link in &write.excess_managers {
            if !state.excess_managers.contains(link) {
                state.excess_managers.push(link.clone());
                commit.excess_managers += 1;
            }
        }
        Ok(commit)
    }
}

#[async_trait]
impl PartnerRepository for MemoryDb {
    async fn find_partner(&self, card_code: &str) -> Result<Option<BusinessPartner>> {
        Ok(self.state.lock().partners.get(card_code).filter(|bp| !bp.is_deleted()).cloned())
    }

    async fn list_partners(&self, card_type: CardType) -> Result<Vec<BusinessPartner>> {
        Ok(self
            .state
            .lock()
            .partners
            .values()
            .filter(|bp| bp.card_type == card_type && !bp.is_deleted())
            .cloned()
            .collect())
    }

    async fn save_partner(&self, partner: &BusinessPartner, new_addresses: &[Address]) -> Result<()> {
        Self::check(&self.fail_writes, "write")?;
        let mut state = self.state.lock();
        state.partners.insert(partner.card_code.clone(), partner.clone());
        for address in new_addresses {
            state.addresses.insert(address_key(address), address.clone());
        }
        Ok(())
    }

    async fn soft_delete_partner(
        &self,
        card_code: &str,
        deleted_by: &str,
        deleted_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut state = self.state.lock();
        match state.partners.get_mut(card_code).filter(|bp| !bp.is_deleted()) {
            Some(bp) => {
                bp.deleted_at = Some(deleted_at);
                bp.deleted_by = Some(deleted_by.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_default_address(&self, card_code: &str, addr_type: AddrType, address_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(bp) = state.partners.get_mut(card_code) {
            match addr_type {
                AddrType::Billing => bp.bill_to_def = Some(address_id.to_string()),
                AddrType::Shipping => bp.ship_to_def = Some(address_id.to_string()),
            }
        }
        Ok(())
    }

    async fn set_default_contact(&self, card_code: &str, contact_name: &str) -> Result<()> {
        if let Some(bp) = self.state.lock().partners.get_mut(card_code) {
            bp.contact_person = Some(contact_name.to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl AddressRepository for MemoryDb {
    async fn find_address(&self, card_code: &str, id: &str) -> Result<Option<Address>> {
        let key = (card_code.to_string(), id.to_string());
        Ok(self.state.lock().addresses.get(&key).cloned())
    }

    async fn list_addresses(&self, card_code: &str) -> Result<Vec<Address>> {
        Ok(self
            .state
            .lock()
            .addresses
            .values()
            .filter(|a| a.card_code == card_code)
            .cloned()
            .collect())
    }

    async fn save_address(&self, address: &Address) -> Result<()> {
        self.state.lock().addresses.insert(address_key(address), address.clone());
        Ok(())
    }

    async fn max_address_suffix(&self) -> Result<u64> {
        let state = self.state.lock();
        Ok(max_address_suffix(state.addresses.values().map(|a| a.id.as_str())))
    }
}

#[async_trait]
impl ContactRepository for MemoryDb {
    async fn find_contact(&self, id: &str) -> Result<Option<Contact>> {
        Ok(self.state.lock().contacts.get(id).cloned())
    }

    async fn find_contact_by_name(&self, card_code: &str, name: &str) -> Result<Option<Contact>> {
        Ok(self
            .state
            .lock()
            .contacts
            .values()
            .find(|c| c.card_code == card_code && c.name == name)
            .cloned())
    }

    async fn list_contacts(&self, card_code: &str) -> Result<Vec<Contact>> {
        Ok(self
            .state
            .lock()
            .contacts
            .values()
            .filter(|c| c.card_code == card_code)
            .cloned()
            .collect())
    }

    async fn save_contact(&self, contact: &Contact) -> Result<()> {
        self.state.lock().contacts.insert(contact.id.clone(), contact.clone());
        Ok(())
    }
}

/// Scripted ERP returning fixed rows, or failing.
#[derive(Debug, Default)]
pub struct MockErp {
    pub rows: Mutex<Vec<Value>>,
    pub fail: AtomicBool,
    pub queries: Mutex<Vec<ErpQuery>>,
}

impl MockErp {
    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self { rows: Mutex::new(rows), ..Self::default() }
    }

    pub fn failing() -> Self {
        let erp = Self::default();
        erp.fail.store(true, Ordering::SeqCst);
        erp
    }
}

#[async_trait]
impl ErpQueryPort for MockErp {
    async fn run_query(&self, query: &ErpQuery) -> Result<Vec<Value>> {
        self.queries.lock().push(query.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(MdSyncError::Network("connection refused".into()));
        }
        Ok(self.rows.lock().clone())
    }
}

/// Records invalidated tags.
#[derive(Debug, Default)]
pub struct RecordingCache {
    pub tags: Mutex<Vec<String>>,
}

impl RecordingCache {
    pub fn tags(&self) -> Vec<String> {
        self.tags.lock().clone()
    }
}

impl CacheInvalidator for RecordingCache {
    fn invalidate_tag(&self, tag: &str) {
        self.tags.lock().push(tag.to_string());
    }
}
