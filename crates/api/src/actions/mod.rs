//! Public actions
//!
//! Each action takes the [`AppContext`](crate::context::AppContext) plus its
//! input and always returns an envelope; failures are data, never `Err`.

pub mod import;
pub mod master;
pub mod sync;

pub use import::import_business_partners;
pub use master::{
    delete_business_partner, get_default_address, get_default_contact, list_addresses,
    list_business_partners, upsert_address, upsert_business_partner, upsert_contact,
};
pub use sync::{sync_addresses, sync_business_partners};
