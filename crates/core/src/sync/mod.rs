//! ERP-to-local reconciliation

pub mod entity;
pub mod locks;
pub mod plan;
pub mod ports;
pub mod service;

pub use entity::SyncEntity;
pub use locks::{ScopeGuard, ScopeLocks};
pub use plan::{changed_since, plan_reconciliation, MutationPlan, SourceState};
pub use ports::{EntityStore, ErpQuery, ErpQueryPort, SyncMetaRepository, SyncWrite};
pub use service::Reconciler;
