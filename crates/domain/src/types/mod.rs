//! Domain types and models

pub mod address;
pub mod contact;
pub mod forms;
pub mod import;
pub mod partner;
pub mod provenance;
pub mod result;
pub mod sync;

pub use address::{AddrType, Address};
pub use contact::Contact;
pub use forms::{AddressFields, AddressInput, ContactInput, PartnerInput};
pub use import::{
    ExcessManager, ImportBatchRequest, ImportBatchResponse, ImportMetaData, ImportRow,
    ImportStats, ImportStatus, LookupEntry, RowError,
};
pub use partner::{BusinessPartner, CardType};
pub use provenance::{Provenance, Source, SyncStatus};
pub use result::ActionResult;
pub use sync::{
    address_cache_tag, default_checkpoint, partner_cache_tag, ReconcileMode, ReconcileReport,
    SyncMeta, SyncScope,
};
