//! SAP Business One Service Layer integration

pub mod client;
pub mod errors;

pub use client::ServiceLayerClient;
pub use errors::{SapError, SapErrorCategory};
