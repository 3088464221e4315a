//! Pure reconciliation planning
//!
//! Given what the ERP returned, what the local store holds and the last
//! checkpoint, decide which rows to write and how. Nothing here performs I/O.

use chrono::{DateTime, Utc};
use mdsync_domain::{parse_erp_date, ReconcileMode, Result};

use super::entity::SyncEntity;

/// Outcome of reading one input of a reconciliation pass.
///
/// A failed read is a distinct state, never an empty result: an unreachable
/// local store must not look like an empty one.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceState<T> {
    Available(T),
    Unavailable(String),
}

impl<T> SourceState<T> {
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Available(value),
            Err(err) => Self::Unavailable(err.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Rows to write and the write mode.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationPlan<T> {
    pub mode: ReconcileMode,
    pub rows: Vec<T>,
}

/// True when the row was created or updated strictly after `since`.
///
/// ERP dates have day granularity and parse to midnight UTC, so a row changed
/// later on the checkpoint's own day is not selected.
pub fn changed_since<T: SyncEntity>(row: &T, since: DateTime<Utc>) -> bool {
    [row.create_date(), row.update_date()]
        .into_iter()
        .flatten()
        .filter_map(parse_erp_date)
        .any(|at| at > since)
}

/// Decide how to apply `remote` rows.
///
/// Bootstrap happens only when the local read succeeded and returned nothing.
/// An unavailable local read falls through to the incremental path so that a
/// transient failure never triggers a full copy over existing data.
pub fn plan_reconciliation<T: SyncEntity>(
    remote: Vec<T>,
    local: &SourceState<Vec<T>>,
    since: DateTime<Utc>,
) -> MutationPlan<T> {
    match local {
        SourceState::Available(rows) if rows.is_empty() => {
            MutationPlan { mode: ReconcileMode::Bootstrap, rows: remote }
        }
        _ => MutationPlan {
            mode: ReconcileMode::Incremental,
            rows: remote.into_iter().filter(|row| changed_since(row, since)).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mdsync_domain::{BusinessPartner, CardType, MdSyncError};

    use super::*;

    fn bp(code: &str, created: &str, updated: &str) -> BusinessPartner {
        let mut bp = BusinessPartner::new(code, code, CardType::Customer);
        bp.create_date = Some(created.to_string());
        bp.update_date = Some(updated.to_string());
        bp
    }

    fn checkpoint() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
    }

    #[test]
    fn empty_local_store_bootstraps_everything() {
        let remote = vec![bp("C100", "20200101", "20200101")];
        let plan = plan_reconciliation(remote, &SourceState::Available(vec![]), checkpoint());

        assert_eq!(plan.mode, ReconcileMode::Bootstrap);
        assert_eq!(plan.rows.len(), 1);
    }

    #[test]
    fn populated_store_keeps_only_rows_after_checkpoint() {
        let remote = vec![bp("C100", "20240101", "20240105"), bp("C200", "20240101", "20240101")];
        let local = SourceState::Available(vec![bp("C100", "20240101", "20240101")]);

        let plan = plan_reconciliation(remote, &local, checkpoint());
        assert_eq!(plan.mode, ReconcileMode::Incremental);
        let codes: Vec<_> = plan.rows.iter().map(|row| row.card_code.as_str()).collect();
        assert_eq!(codes, vec!["C100"]);
    }

    #[test]
    fn unavailable_local_read_never_bootstraps() {
        let remote = vec![bp("C100", "20200101", "20200101"), bp("C300", "20240301", "20240301")];
        let local = SourceState::from_result(Err(MdSyncError::Database("locked".into())));

        let plan = plan_reconciliation(remote, &local, checkpoint());
        assert_eq!(plan.mode, ReconcileMode::Incremental);
        assert_eq!(plan.rows.len(), 1);
        assert_eq!(plan.rows[0].card_code, "C300");
    }

    #[test]
    fn change_on_checkpoint_day_is_not_selected() {
        let row = bp("C100", "20240101", "20240102");
        assert!(!changed_since(&row, checkpoint()));
    }

    #[test]
    fn creation_date_alone_qualifies() {
        let mut row = bp("C100", "20240110", "20240110");
        row.update_date = None;
        assert!(changed_since(&row, checkpoint()));
    }

    #[test]
    fn unparseable_dates_do_not_qualify() {
        let row = bp("C100", "garbage", "");
        assert!(!changed_since(&row, checkpoint()));
    }
}
