//! ERP reconciliation actions

use mdsync_domain::constants::{ACTION_SYNC_ADDRESSES, ACTION_SYNC_PARTNERS};
use mdsync_domain::{ActionResult, CardType, MdSyncError, ReconcileMode, ReconcileReport, SyncScope};

use crate::context::AppContext;
use crate::utils::action_helpers::execute_action;

/// Mirror every partner of `card_type` from the ERP.
pub async fn sync_business_partners(ctx: &AppContext, card_type: CardType) -> ActionResult<ReconcileReport> {
    let scope = SyncScope::Partners(card_type);
    execute_action(ACTION_SYNC_PARTNERS, || ctx.partner_sync.reconcile(&scope), |report| {
        let message = summary("business partners", &report);
        ActionResult::ok(message, report)
    })
    .await
}

/// Mirror the address set of one partner from the ERP.
pub async fn sync_addresses(ctx: &AppContext, card_code: &str) -> ActionResult<ReconcileReport> {
    let card_code = card_code.trim();
    execute_action(
        ACTION_SYNC_ADDRESSES,
        || async move {
            if card_code.is_empty() {
                return Err(MdSyncError::InvalidInput("cardCode is required".into()));
            }
            ctx.address_sync.reconcile(&SyncScope::Addresses(card_code.to_string())).await
        },
        |report| {
            let message = summary("addresses", &report);
            ActionResult::ok(message, report)
        },
    )
    .await
}

fn summary(what: &str, report: &ReconcileReport) -> String {
    match report.mode {
        ReconcileMode::Bootstrap => {
            format!("Imported {} {what} from the ERP", report.written)
        }
        ReconcileMode::Incremental => {
            format!("Updated {} {what}; {} changed since the last sync", report.written, report.selected)
        }
    }
}
