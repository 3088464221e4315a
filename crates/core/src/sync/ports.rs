//! Port interfaces for reconciliation

use async_trait::async_trait;
use mdsync_domain::{ReconcileMode, Result, SyncMeta, SyncScope};
use serde_json::Value;

use super::entity::SyncEntity;

/// A named ERP query invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErpQuery {
    /// Saved query code, e.g. `BP_MASTER`.
    pub code: String,
    /// Filter expression passed as the query parameter list.
    pub filter: String,
}

impl ErpQuery {
    pub fn new(code: impl Into<String>, filter: impl Into<String>) -> Self {
        Self { code: code.into(), filter: filter.into() }
    }
}

/// Read-only access to the ERP's saved query endpoint.
#[async_trait]
pub trait ErpQueryPort: Send + Sync {
    /// Run the query and return every row across all result pages.
    async fn run_query(&self, query: &ErpQuery) -> Result<Vec<Value>>;
}

/// Rows and checkpoint written by one reconciliation pass.
#[derive(Debug, Clone)]
pub struct SyncWrite<T> {
    pub scope: SyncScope,
    pub mode: ReconcileMode,
    /// Already stamped `sap`/`synced`.
    pub rows: Vec<T>,
    pub checkpoint: SyncMeta,
}

/// Local persistence for one reconcilable entity.
#[async_trait]
pub trait EntityStore<T: SyncEntity>: Send + Sync {
    /// Every local row in the scope, including soft-deleted ones.
    async fn list_for_scope(&self, scope: &SyncScope) -> Result<Vec<T>>;

    /// Apply the rows and the checkpoint in a single transaction.
    ///
    /// `Bootstrap` inserts and skips existing keys; `Incremental` upserts by
    /// natural key. Returns the number of rows inserted or updated.
    async fn apply_sync(&self, write: SyncWrite<T>) -> Result<usize>;
}

/// Checkpoint storage.
#[async_trait]
pub trait SyncMetaRepository: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<SyncMeta>>;

    async fn upsert(&self, meta: &SyncMeta) -> Result<()>;
}
