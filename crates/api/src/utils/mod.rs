pub mod action_helpers;
pub mod health;
pub mod logging;
