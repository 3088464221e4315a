//! # MdSync App
//!
//! Application layer: wires the hexagonal crates together and exposes the
//! public actions.
//!
//! This crate contains:
//! - Actions (the "errors are data" boundary the UI calls)
//! - Application context (dependency injection)
//! - Logging bootstrap and health reporting
//!
//! ## Architecture
//! - Depends on `domain`, `core` and `infra`
//! - The `mdsync` binary is a thin command-line shell over the actions

pub mod actions;
pub mod context;
pub mod utils;

pub use actions::*;
pub use context::AppContext;
