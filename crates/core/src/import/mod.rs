//! Batch import of business partners

pub mod builder;
pub mod columns;
pub mod ports;
pub mod service;
pub mod validator;

pub use builder::{build_import_write, ImportWrite};
pub use ports::{ImportCommit, ImportStore};
pub use service::{progress_percent, ImportOutcome, ImportService};
pub use validator::{LookupIndex, Lookups, RowValidator, ValidatedRow};
