//! Reconciliation service
//!
//! Mirrors one scope of ERP master data into the local store. A pass reads
//! the ERP rows, the local rows and the checkpoint concurrently, plans the
//! writes, then applies rows and the advanced checkpoint in one transaction.

use std::sync::Arc;

use mdsync_domain::{
    default_checkpoint, MdSyncError, ReconcileReport, Result, SyncMeta, SyncScope,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::entity::SyncEntity;
use super::locks::ScopeLocks;
use super::plan::{plan_reconciliation, SourceState};
use super::ports::{EntityStore, ErpQuery, ErpQueryPort, SyncMetaRepository, SyncWrite};
use crate::cache_ports::{CacheInvalidator, NoopInvalidator};
use crate::clock::{Clock, SystemClock};
use crate::provenance::stamp_all_erp;

/// Reconciles one entity kind against the ERP.
pub struct Reconciler<T: SyncEntity> {
    erp: Arc<dyn ErpQueryPort>,
    store: Arc<dyn EntityStore<T>>,
    checkpoints: Arc<dyn SyncMetaRepository>,
    query_code: String,
    cache: Arc<dyn CacheInvalidator>,
    clock: Arc<dyn Clock>,
    locks: Option<Arc<ScopeLocks>>,
    updated_by: String,
}

impl<T: SyncEntity> Reconciler<T> {
    pub fn new(
        erp: Arc<dyn ErpQueryPort>,
        store: Arc<dyn EntityStore<T>>,
        checkpoints: Arc<dyn SyncMetaRepository>,
        query_code: impl Into<String>,
    ) -> Self {
        Self {
            erp,
            store,
            checkpoints,
            query_code: query_code.into(),
            cache: Arc::new(NoopInvalidator),
            clock: Arc::new(SystemClock),
            locks: None,
            updated_by: mdsync_domain::constants::SYNC_META_UPDATED_BY.to_string(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheInvalidator>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Serialize passes over the same scope through `locks`.
    ///
    /// Share one `ScopeLocks` between reconcilers that may touch the same
    /// scope codes.
    pub fn with_scope_locks(mut self, locks: Arc<ScopeLocks>) -> Self {
        self.locks = Some(locks);
        self
    }

    pub fn with_updated_by(mut self, updated_by: impl Into<String>) -> Self {
        self.updated_by = updated_by.into();
        self
    }

    /// Run one reconciliation pass for `scope`.
    ///
    /// Fails with `Unavailable` when the ERP cannot be read; in that case
    /// nothing is written and the checkpoint stays where it was.
    pub async fn reconcile(&self, scope: &SyncScope) -> Result<ReconcileReport> {
        let code = scope.code();
        let _guard = match &self.locks {
            Some(locks) => Some(locks.acquire(&code).await),
            None => None,
        };

        let query = self.query_for(scope);
        let (remote, local, checkpoint) = tokio::join!(
            self.erp.run_query(&query),
            self.store.list_for_scope(scope),
            self.checkpoints.find_by_code(&code),
        );

        let remote = match SourceState::from_result(remote) {
            SourceState::Available(rows) => rows,
            SourceState::Unavailable(reason) => {
                warn!(scope = %code, kind = T::KIND, reason = %reason, "reconcile.erp_unavailable");
                return Err(MdSyncError::Unavailable(format!("ERP query {} failed: {reason}", query.code)));
            }
        };

        let local = SourceState::from_result(local);
        if let SourceState::Unavailable(reason) = &local {
            warn!(scope = %code, kind = T::KIND, reason = %reason, "reconcile.local_unavailable");
        }

        let previous_checkpoint = match checkpoint {
            Ok(Some(meta)) => meta.last_sync_at,
            Ok(None) => default_checkpoint(),
            Err(err) => {
                warn!(scope = %code, error = %err, "reconcile.checkpoint_unavailable");
                default_checkpoint()
            }
        };

        let fetched = remote.len();
        let remote = self.decode_rows(scope, remote);
        let plan = plan_reconciliation(remote, &local, previous_checkpoint);
        let selected = plan.rows.len();

        let now = self.clock.now();
        let write = SyncWrite {
            scope: scope.clone(),
            mode: plan.mode,
            rows: stamp_all_erp(plan.rows),
            checkpoint: SyncMeta::for_scope(scope, now, &self.updated_by),
        };
        let written = self.store.apply_sync(write).await?;

        self.cache.invalidate_tag(&scope.cache_tag());

        info!(
            scope = %code,
            kind = T::KIND,
            mode = ?plan.mode,
            fetched,
            selected,
            written,
            "reconcile.complete"
        );

        Ok(ReconcileReport {
            scope: code,
            mode: plan.mode,
            fetched,
            selected,
            written,
            previous_checkpoint,
            checkpoint: now,
        })
    }

    fn query_for(&self, scope: &SyncScope) -> ErpQuery {
        let filter = match scope {
            SyncScope::Partners(card_type) => format!("CardType='{}'", card_type.as_str()),
            SyncScope::Addresses(card_code) => {
                format!("CardCode='{}'", card_code.replace('\'', "''"))
            }
        };
        ErpQuery::new(self.query_code.clone(), filter)
    }

    /// Deserialize ERP rows, dropping malformed rows and rows outside `scope`.
    fn decode_rows(&self, scope: &SyncScope, rows: Vec<Value>) -> Vec<T> {
        rows.into_iter()
            .filter_map(|value| match serde_json::from_value::<T>(value) {
                Ok(row) if row.in_scope(scope) => Some(row),
                Ok(row) => {
                    debug!(scope = %scope, key = row.natural_key(), "reconcile.row_outside_scope");
                    None
                }
                Err(err) => {
                    warn!(scope = %scope, kind = T::KIND, error = %err, "reconcile.row_skipped");
                    None
                }
            })
            .collect()
    }
}
