//! Entities the reconciler knows how to mirror

use mdsync_domain::{Address, BusinessPartner, SyncScope};
use serde::de::DeserializeOwned;

use crate::provenance::Provenanced;

/// A master-data entity mirrored from the ERP.
pub trait SyncEntity: Provenanced + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Used in logs and error messages.
    const KIND: &'static str;

    /// Upsert key, unique within one scope only.
    fn natural_key(&self) -> &str;

    /// ERP creation date (`yyyyMMdd`).
    fn create_date(&self) -> Option<&str>;

    /// ERP update date (`yyyyMMdd`).
    fn update_date(&self) -> Option<&str>;

    /// Whether this row belongs to `scope`.
    fn in_scope(&self, scope: &SyncScope) -> bool;
}

impl SyncEntity for BusinessPartner {
    const KIND: &'static str = "business_partner";

    fn natural_key(&self) -> &str {
        &self.card_code
    }

    fn create_date(&self) -> Option<&str> {
        self.create_date.as_deref()
    }

    fn update_date(&self) -> Option<&str> {
        self.update_date.as_deref()
    }

    fn in_scope(&self, scope: &SyncScope) -> bool {
        matches!(scope, SyncScope::Partners(card_type) if *card_type == self.card_type)
    }
}

impl SyncEntity for Address {
    const KIND: &'static str = "address";

    fn natural_key(&self) -> &str {
        &self.id
    }

    fn create_date(&self) -> Option<&str> {
        self.create_date.as_deref()
    }

    fn update_date(&self) -> Option<&str> {
        self.update_date.as_deref()
    }

    fn in_scope(&self, scope: &SyncScope) -> bool {
        matches!(scope, SyncScope::Addresses(card_code) if *card_code == self.card_code)
    }
}
