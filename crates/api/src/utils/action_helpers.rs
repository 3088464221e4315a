//! Action boundary helpers
//!
//! Every public action runs through [`execute_action`], which times the
//! call, logs the outcome and turns a domain error into a failure envelope.
//! Nothing past this point returns `Err`.

use std::future::Future;
use std::time::Instant;

use mdsync_domain::{ActionResult, Result as DomainResult};

use crate::utils::logging::{log_action_error, log_action_execution};

/// Run `action_fn` and wrap its outcome in an [`ActionResult`].
///
/// `on_success` builds the success envelope (status and message) from the
/// returned value; the action identifier is attached either way.
///
/// # Example
///
/// ```rust,ignore
/// execute_action(ACTION_SYNC_PARTNERS, || ctx.partner_sync.reconcile(&scope), |report| {
///     ActionResult::ok("Business partners synced", report)
/// })
/// .await
/// ```
pub async fn execute_action<F, Fut, T, U, S>(action: &str, action_fn: F, on_success: S) -> ActionResult<U>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
    S: FnOnce(T) -> ActionResult<U>,
{
    let start = Instant::now();
    let result = action_fn().await;
    log_action_execution(action, start.elapsed(), result.is_ok());

    match result {
        Ok(value) => on_success(value).with_action(action),
        Err(err) => {
            log_action_error(action, &err);
            ActionResult::from_error(&err).with_action(action)
        }
    }
}
