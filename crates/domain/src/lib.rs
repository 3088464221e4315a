//! # MdSync Domain
//!
//! Business domain types for the master-data sync engine.
//!
//! This crate contains:
//! - Master-data entities (business partners, addresses, contacts)
//! - Provenance markers and the sync checkpoint record
//! - Import batch types and the action result envelope
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other MdSync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::erp_date::{format_erp_date, parse_erp_date};
