//! # MdSync Infrastructure
//!
//! Infrastructure implementations of the core ports:
//! - SQLite persistence behind an r2d2 pool
//! - SAP Business One Service Layer client
//! - Tag-invalidated read cache
//! - Configuration loading
//!
//! Everything here performs I/O; the reconciliation and import rules live in
//! `mdsync-core`.

pub mod cache;
pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;

pub use cache::TagCache;
pub use database::{
    DbManager, SqliteAddressRepository, SqliteBusinessPartnerRepository, SqliteContactRepository,
    SqliteImportRepository, SqliteSyncMetaRepository,
};
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::sap::ServiceLayerClient;
