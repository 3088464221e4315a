//! Batch import contract
//!
//! The UI parses a spreadsheet client-side and sends it in chunks. Each call
//! carries the running [`ImportStats`] returned by the previous call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::partner::CardType;
use crate::impl_code_conversions;

/// One parsed spreadsheet row: header -> cell value.
pub type ImportRow = BTreeMap<String, serde_json::Value>;

/// Diagnostics for a rejected row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// 1-based spreadsheet row number (header row excluded).
    pub row_number: usize,
    pub entries: Vec<String>,
    pub row: ImportRow,
}

/// Import progress state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    #[default]
    Processing,
    Completed,
}

impl_code_conversions!(ImportStatus {
    Processing => "processing",
    Completed => "completed",
});

/// Progress threaded through successive chunk calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ImportStats {
    pub total: usize,
    pub completed: usize,
    pub progress: f64,
    #[serde(default)]
    pub error: Vec<RowError>,
    #[serde(default)]
    pub status: ImportStatus,
}

/// A code/name pair from a lookup table (groups, terms, currencies, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEntry {
    pub code: String,
    #[serde(default)]
    pub name: String,
}

impl LookupEntry {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self { code: code.into(), name: name.into() }
    }
}

/// Reference data shared by every chunk of one import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportMetaData {
    pub card_type: CardType,
    #[serde(default)]
    pub groups: Vec<LookupEntry>,
    #[serde(default)]
    pub payment_terms: Vec<LookupEntry>,
    #[serde(default)]
    pub currencies: Vec<LookupEntry>,
    #[serde(default)]
    pub item_groups: Vec<LookupEntry>,
    #[serde(default)]
    pub manufacturers: Vec<LookupEntry>,
    /// Known portal user IDs.
    #[serde(default)]
    pub users: Vec<String>,
}

/// One chunk call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatchRequest {
    pub data: Vec<ImportRow>,
    pub total: usize,
    #[serde(default)]
    pub stats: ImportStats,
    #[serde(default)]
    pub is_last_batch: bool,
    pub meta_data: ImportMetaData,
    /// 1-based row number of the first row in `data`.
    #[serde(default)]
    pub offset: Option<usize>,
}

/// Response to a chunk call; `stats` feeds the next call verbatim.
///
/// A failed call echoes the request's stats unchanged so the caller can retry
/// the same chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatchResponse {
    pub error: bool,
    pub status: u16,
    pub message: String,
    pub action: String,
    pub stats: ImportStats,
}

/// Junction row linking a partner to a portal user who manages it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcessManager {
    pub card_code: String,
    pub user_id: String,
}
