//! # MdSync Core
//!
//! Business logic for mirroring ERP master data and maintaining it from the
//! portal. No database, HTTP or platform code lives here; every external
//! dependency is a trait in one of the `ports` modules.
//!
//! - [`sync`]: ERP-to-local reconciliation per scope
//! - [`import`]: chunked business partner import
//! - [`master`]: portal create/edit of partners, addresses and contacts
//! - [`ids`]: sequential address IDs
//! - [`provenance`]: `sap`/`portal` stamping

pub mod cache_ports;
pub mod clock;
pub mod ids;
pub mod import;
pub mod master;
pub mod provenance;
pub mod sync;

pub use cache_ports::{CacheInvalidator, NoopInvalidator};
pub use clock::{Clock, FixedClock, SystemClock};
pub use ids::{AddressIdAllocator, IdFormat};
pub use import::{ImportCommit, ImportOutcome, ImportService, ImportStore, ImportWrite};
pub use master::{AddressRepository, ContactRepository, MasterDataService, PartnerRepository};
pub use provenance::Provenanced;
pub use sync::{
    EntityStore, ErpQuery, ErpQueryPort, Reconciler, ScopeGuard, ScopeLocks, SourceState, SyncEntity,
    SyncMetaRepository, SyncWrite,
};
