//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Sync checkpoint defaults
pub const DEFAULT_CHECKPOINT_DATE: &str = "2020-01-01";
pub const SYNC_META_UPDATED_BY: &str = "system";
pub const ADDRESS_SCOPE_PREFIX: &str = "address-";

// ERP wire formats
pub const ERP_DATE_FORMAT: &str = "%Y%m%d";
pub const ERP_DEFAULT_BP_QUERY: &str = "BP_MASTER";
pub const ERP_DEFAULT_ADDRESS_QUERY: &str = "BP_ADDRESSES";

// Address identifiers
pub const ADDRESS_ID_PREFIX: char = 'A';
pub const PADDED_ADDRESS_ID_WIDTH: usize = 6;

// Cache tags
pub const BP_CACHE_TAG_PREFIX: &str = "bp-master-";
pub const ADDRESS_CACHE_TAG_PREFIX: &str = "address-master-";

// Batch import
pub const DEFAULT_IMPORT_MAX_BATCH_SIZE: usize = 500;
pub const IMPORT_LIST_SEPARATOR: char = ',';

// Action identifiers reported back to the UI
pub const ACTION_SYNC_PARTNERS: &str = "sync-business-partners";
pub const ACTION_SYNC_ADDRESSES: &str = "sync-addresses";
pub const ACTION_IMPORT_PARTNERS: &str = "import-business-partners";
pub const ACTION_UPSERT_PARTNER: &str = "upsert-business-partner";
pub const ACTION_UPSERT_ADDRESS: &str = "upsert-address";
pub const ACTION_UPSERT_CONTACT: &str = "upsert-contact";
pub const ACTION_DELETE_PARTNER: &str = "delete-business-partner";
pub const ACTION_GET_DEFAULT_ADDRESS: &str = "get-default-address";
pub const ACTION_GET_DEFAULT_CONTACT: &str = "get-default-contact";
pub const ACTION_LIST_PARTNERS: &str = "list-business-partners";
pub const ACTION_LIST_ADDRESSES: &str = "list-addresses";
