//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_IMPORT_MAX_BATCH_SIZE, ERP_DEFAULT_ADDRESS_QUERY, ERP_DEFAULT_BP_QUERY,
};
use crate::impl_code_conversions;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub erp: ErpConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
    /// SQLite busy timeout per connection.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "mdsync.db".to_string(), pool_size: 8, busy_timeout_ms: default_busy_timeout_ms() }
    }
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// SAP Service Layer connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ErpConfig {
    /// Base URL including the Service Layer root, e.g. `https://sap:50000/b1s/v1`.
    pub base_url: String,
    pub company_db: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub timeout_secs: u64,
    /// Accept self-signed Service Layer certificates.
    pub accept_invalid_certs: bool,
    /// Named query returning business partners, filtered by `CardType`.
    pub partner_query: String,
    /// Named query returning addresses, filtered by `CardCode`.
    pub address_query: String,
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:50000/b1s/v1".to_string(),
            company_db: String::new(),
            username: String::new(),
            password: String::new(),
            timeout_secs: 30,
            accept_invalid_certs: false,
            partner_query: ERP_DEFAULT_BP_QUERY.to_string(),
            address_query: ERP_DEFAULT_ADDRESS_QUERY.to_string(),
        }
    }
}

/// Reconciliation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    /// Serialize reconciliations of the same scope within this process.
    pub serialize_scopes: bool,
    /// Recorded as `updatedBy` on checkpoints written without a user.
    pub updated_by: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { serialize_scopes: true, updated_by: crate::constants::SYNC_META_UPDATED_BY.to_string() }
    }
}

/// How the customer import treats the excess-manager reference check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExcessManagerCheck {
    /// Reject the row when every referenced manager exists (legacy behavior).
    #[default]
    Literal,
    /// Reject the row when any referenced manager is unknown.
    Intended,
}

impl_code_conversions!(ExcessManagerCheck {
    Literal => "literal",
    Intended => "intended",
});

/// Batch import settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImportConfig {
    pub max_batch_size: usize,
    pub excess_manager_check: ExcessManagerCheck,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_IMPORT_MAX_BATCH_SIZE,
            excess_manager_check: ExcessManagerCheck::default(),
        }
    }
}

/// Tag cache for partner and address reads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300, max_capacity: 1_000 }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
