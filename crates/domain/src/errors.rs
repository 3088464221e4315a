//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for MdSync
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum MdSyncError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The record is owned by the ERP and cannot be edited from the portal.
    #[error("Read-only record: {0}")]
    ReadOnly(String),

    /// An upstream source could not be reached.
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MdSyncError {
    /// HTTP-style status code reported in action results.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::Auth(_) => 401,
            Self::ReadOnly(_) => 403,
            Self::NotFound(_) => 404,
            Self::Unavailable(_) => 503,
            Self::Database(_) | Self::Config(_) | Self::Network(_) | Self::Internal(_) => 500,
        }
    }

    /// Stable label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::ReadOnly(_) => "read_only",
            Self::Unavailable(_) => "unavailable",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for MdSync operations
pub type Result<T> = std::result::Result<T, MdSyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_taxonomy() {
        assert_eq!(MdSyncError::NotFound("bp".into()).status_code(), 404);
        assert_eq!(MdSyncError::InvalidInput("row".into()).status_code(), 400);
        assert_eq!(MdSyncError::ReadOnly("C100".into()).status_code(), 403);
        assert_eq!(MdSyncError::Unavailable("erp".into()).status_code(), 503);
        assert_eq!(MdSyncError::Database("locked".into()).status_code(), 500);
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(MdSyncError::NotFound("C100".into())).unwrap();
        assert_eq!(json["type"], "NotFound");
        assert_eq!(json["message"], "C100");
    }
}
