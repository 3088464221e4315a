//! Chunked business partner import action

use std::time::Instant;

use mdsync_core::ImportOutcome;
use mdsync_domain::constants::ACTION_IMPORT_PARTNERS;
use mdsync_domain::{ImportBatchRequest, ImportBatchResponse, ImportStatus};

use crate::context::AppContext;
use crate::utils::logging::{log_action_error, log_action_execution};

/// Validate and commit one chunk of spreadsheet rows.
///
/// The returned `stats` must be sent with the next chunk. On failure the
/// request's stats come back unchanged so the same chunk can be retried.
pub async fn import_business_partners(ctx: &AppContext, request: ImportBatchRequest) -> ImportBatchResponse {
    let start = Instant::now();
    let previous = request.stats.clone();

    let result = ctx.import.process_batch(request).await;
    log_action_execution(ACTION_IMPORT_PARTNERS, start.elapsed(), result.is_ok());

    match result {
        Ok(outcome) => ImportBatchResponse {
            error: false,
            status: 200,
            message: batch_message(&outcome),
            action: ACTION_IMPORT_PARTNERS.to_string(),
            stats: outcome.stats,
        },
        Err(err) => {
            log_action_error(ACTION_IMPORT_PARTNERS, &err);
            ImportBatchResponse {
                error: true,
                status: err.status_code(),
                message: err.to_string(),
                action: ACTION_IMPORT_PARTNERS.to_string(),
                stats: previous,
            }
        }
    }
}

fn batch_message(outcome: &ImportOutcome) -> String {
    let mut message = format!("{} rows accepted, {} rejected", outcome.accepted, outcome.rejected);
    if outcome.committed.partners < outcome.accepted {
        message.push_str(&format!(
            " ({} already present)",
            outcome.accepted - outcome.committed.partners
        ));
    }
    if outcome.stats.status == ImportStatus::Completed {
        message.push_str(&format!("; import completed with {} row errors", outcome.stats.error.len()));
    }
    message
}
