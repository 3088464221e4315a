//! Sync scopes, checkpoints and reconciliation reports

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::partner::CardType;
use crate::constants::{
    ADDRESS_CACHE_TAG_PREFIX, ADDRESS_SCOPE_PREFIX, BP_CACHE_TAG_PREFIX, DEFAULT_CHECKPOINT_DATE,
};

/// The unit of reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "camelCase")]
pub enum SyncScope {
    /// All business partners of one card type.
    Partners(CardType),
    /// The address set of a single business partner.
    Addresses(String),
}

impl SyncScope {
    /// Checkpoint key: the card type (`C`), or `address-<cardCode>`.
    pub fn code(&self) -> String {
        match self {
            Self::Partners(card_type) => card_type.as_str().to_string(),
            Self::Addresses(card_code) => format!("{ADDRESS_SCOPE_PREFIX}{card_code}"),
        }
    }

    /// Cache tag invalidated after a successful pass.
    pub fn cache_tag(&self) -> String {
        match self {
            Self::Partners(card_type) => partner_cache_tag(*card_type),
            Self::Addresses(card_code) => address_cache_tag(card_code),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Partners(CardType::Customer) => "Customer master sync".to_string(),
            Self::Partners(CardType::Supplier) => "Supplier master sync".to_string(),
            Self::Addresses(card_code) => format!("Address sync for {card_code}"),
        }
    }
}

impl std::fmt::Display for SyncScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code())
    }
}

/// `bp-master-<cardtype>`, lowercased.
pub fn partner_cache_tag(card_type: CardType) -> String {
    format!("{BP_CACHE_TAG_PREFIX}{}", card_type.as_str().to_lowercase())
}

/// `address-master-<cardcode>`, lowercased.
pub fn address_cache_tag(card_code: &str) -> String {
    format!("{ADDRESS_CACHE_TAG_PREFIX}{}", card_code.to_lowercase())
}

/// Per-scope sync checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMeta {
    pub code: String,
    pub description: String,
    pub last_sync_at: DateTime<Utc>,
    pub updated_by: String,
}

impl SyncMeta {
    pub fn for_scope(scope: &SyncScope, last_sync_at: DateTime<Utc>, updated_by: &str) -> Self {
        Self {
            code: scope.code(),
            description: scope.description(),
            last_sync_at,
            updated_by: updated_by.to_string(),
        }
    }
}

/// Checkpoint assumed when a scope has never been synced.
pub fn default_checkpoint() -> DateTime<Utc> {
    NaiveDate::parse_from_str(DEFAULT_CHECKPOINT_DATE, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Which branch a reconciliation pass took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileMode {
    /// No local rows: every ERP row was copied in.
    Bootstrap,
    /// Only rows changed since the checkpoint were upserted.
    Incremental,
}

/// Outcome of a successful reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub scope: String,
    pub mode: ReconcileMode,
    /// Rows returned by the ERP.
    pub fetched: usize,
    /// Rows selected for writing.
    pub selected: usize,
    /// Rows the store reported as inserted or updated.
    pub written: usize,
    pub previous_checkpoint: DateTime<Utc>,
    pub checkpoint: DateTime<Utc>,
}
