//! Domain utilities

pub mod erp_date;
