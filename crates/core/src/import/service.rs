//! Chunked partner import
//!
//! Each call validates one chunk, commits the accepted rows in a single
//! transaction and returns the running stats the caller sends with the next
//! chunk. A bad row is recorded and skipped; it never aborts the chunk.

use std::collections::HashSet;
use std::sync::Arc;

use mdsync_domain::{
    partner_cache_tag, ExcessManagerCheck, ImportBatchRequest, ImportStats, ImportStatus,
    MdSyncError, Result, RowError,
};
use tracing::{debug, info};

use super::builder::build_import_write;
use super::columns::{self, cell};
use super::ports::{ImportCommit, ImportStore};
use super::validator::{Lookups, RowValidator};
use crate::cache_ports::{CacheInvalidator, NoopInvalidator};
use crate::ids::{AddressIdAllocator, IdFormat};

/// Result of one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub stats: ImportStats,
    pub accepted: usize,
    pub rejected: usize,
    pub committed: ImportCommit,
}

pub struct ImportService {
    store: Arc<dyn ImportStore>,
    cache: Arc<dyn CacheInvalidator>,
    max_batch_size: usize,
    manager_check: ExcessManagerCheck,
}

impl ImportService {
    pub fn new(store: Arc<dyn ImportStore>) -> Self {
        Self {
            store,
            cache: Arc::new(NoopInvalidator),
            max_batch_size: mdsync_domain::constants::DEFAULT_IMPORT_MAX_BATCH_SIZE,
            manager_check: ExcessManagerCheck::default(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheInvalidator>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max;
        self
    }

    pub fn with_manager_check(mut self, check: ExcessManagerCheck) -> Self {
        self.manager_check = check;
        self
    }

    /// Validate and commit one chunk.
    ///
    /// Errors only for an oversized chunk or a failed read/commit. Row
    /// failures are reported through `stats.error`.
    pub async fn process_batch(&self, request: ImportBatchRequest) -> Result<ImportOutcome> {
        if request.data.len() > self.max_batch_size {
            return Err(MdSyncError::InvalidInput(format!(
                "batch of {} rows exceeds the limit of {}",
                request.data.len(),
                self.max_batch_size
            )));
        }

        let card_type = request.meta_data.card_type;
        let lookups = Lookups::from_meta(&request.meta_data);
        let codes: Vec<String> = request.data.iter().filter_map(|row| cell(row, columns::CODE)).collect();

        let (existing, max_suffix) = tokio::try_join!(
            self.store.existing_card_codes(&codes),
            self.store.max_address_suffix(),
        )?;

        let previous = &request.stats;
        let first_row = request.offset.unwrap_or(previous.completed + previous.error.len() + 1);

        let validator = RowValidator::new(card_type, &lookups, self.manager_check);
        let mut known: HashSet<String> = existing;
        let mut accepted = Vec::new();
        let mut row_errors = Vec::new();

        for (index, row) in request.data.iter().enumerate() {
            match validator.validate(row, &known) {
                Ok(valid) => {
                    known.insert(valid.card_code.clone());
                    accepted.push(valid);
                }
                Err(entries) => {
                    let row_number = first_row + index;
                    debug!(row_number, reasons = entries.len(), "import.row_rejected");
                    row_errors.push(RowError { row_number, entries, row: row.clone() });
                }
            }
        }

        let accepted_count = accepted.len();
        let rejected_count = row_errors.len();

        let mut allocator = AddressIdAllocator::seeded(max_suffix, IdFormat::padded());
        let write = build_import_write(accepted, card_type, &lookups.users, &mut allocator);

        let committed = if write.is_empty() {
            ImportCommit::default()
        } else {
            let committed = self.store.commit_import(&write).await?;
            self.cache.invalidate_tag(&partner_cache_tag(card_type));
            committed
        };

        let stats = next_stats(&request, accepted_count, row_errors);

        info!(
            card_type = %card_type,
            rows = request.data.len(),
            accepted = accepted_count,
            rejected = rejected_count,
            inserted = committed.partners,
            progress = stats.progress,
            "import.batch_committed"
        );

        Ok(ImportOutcome { stats, accepted: accepted_count, rejected: rejected_count, committed })
    }
}

/// Fold this chunk into the running stats.
fn next_stats(request: &ImportBatchRequest, accepted: usize, new_errors: Vec<RowError>) -> ImportStats {
    let completed = request.stats.completed + accepted;
    let progress = progress_percent(completed, request.total);

    let mut error = request.stats.error.clone();
    error.extend(new_errors);

    let status = if progress >= 100.0 || request.is_last_batch {
        ImportStatus::Completed
    } else {
        ImportStatus::Processing
    };

    ImportStats { total: request.total, completed, progress, error, status }
}

/// `completed / total * 100`, capped at 100; an empty import is complete.
pub fn progress_percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (completed as f64 / total as f64 * 100.0).min(100.0)
}
