//! Service Layer error classification
//!
//! Failures talking to the ERP are classified first, then folded into
//! [`MdSyncError`] at the port boundary.

use std::fmt;

use mdsync_domain::MdSyncError;
use reqwest::StatusCode;

/// Broad cause of a Service Layer failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SapErrorCategory {
    /// Host unreachable or connection refused
    NetworkOffline,

    NetworkTimeout,

    /// 5xx from the Service Layer
    ServerUnavailable,

    /// Login rejected or session expired (401, 403)
    Authentication,

    /// 429
    RateLimited,

    /// Bad query code or filter (4xx except 401, 403, 429)
    Validation,

    /// Unexpected response shape or unclassified failure
    Unknown,
}

impl SapErrorCategory {
    /// Whether a later attempt might succeed. The client itself never retries.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::NetworkOffline | Self::NetworkTimeout | Self::ServerUnavailable | Self::RateLimited
        )
    }

    pub fn user_message(self) -> &'static str {
        match self {
            Self::NetworkOffline => "The ERP Service Layer cannot be reached.",
            Self::NetworkTimeout => "The ERP Service Layer did not respond in time.",
            Self::ServerUnavailable => "The ERP Service Layer is temporarily unavailable.",
            Self::Authentication => "The ERP rejected the configured credentials.",
            Self::RateLimited => "The ERP Service Layer is throttling requests.",
            Self::Validation => "The ERP rejected the query. Check the query code and filter.",
            Self::Unknown => "The ERP Service Layer returned an unexpected response.",
        }
    }
}

impl fmt::Display for SapErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkOffline => write!(f, "Network Offline"),
            Self::NetworkTimeout => write!(f, "Network Timeout"),
            Self::ServerUnavailable => write!(f, "Server Unavailable"),
            Self::Authentication => write!(f, "Authentication Failed"),
            Self::RateLimited => write!(f, "Rate Limited"),
            Self::Validation => write!(f, "Validation Error"),
            Self::Unknown => write!(f, "Unknown Error"),
        }
    }
}

/// Classified Service Layer failure
#[derive(Debug, Clone)]
pub struct SapError {
    category: SapErrorCategory,
    message: String,
    context: Option<String>,
}

impl SapError {
    pub fn new(category: SapErrorCategory, message: impl Into<String>) -> Self {
        Self { category, message: message.into(), context: None }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(SapErrorCategory::Unknown, message)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn category(&self) -> SapErrorCategory {
        self.category
    }

    pub fn user_message(&self) -> String {
        let base = self.category.user_message();
        match &self.context {
            Some(ctx) => format!("{base} Details: {ctx}"),
            None => base.to_string(),
        }
    }

    /// Classify an HTTP status.
    pub fn from_status_code(status: StatusCode) -> Self {
        let category = match status.as_u16() {
            401 | 403 => SapErrorCategory::Authentication,
            429 => SapErrorCategory::RateLimited,
            400..=499 => SapErrorCategory::Validation,
            500..=599 => SapErrorCategory::ServerUnavailable,
            _ => SapErrorCategory::Unknown,
        };

        Self::new(
            category,
            format!("HTTP {}: {}", status.as_u16(), status.canonical_reason().unwrap_or("Unknown")),
        )
    }

    /// Transient failures become `Unavailable` (503) so a sync pass leaves
    /// its checkpoint alone and can simply be run again.
    pub fn into_domain_error(self) -> MdSyncError {
        if self.category.is_transient() {
            return MdSyncError::Unavailable(self.user_message());
        }
        match self.category {
            SapErrorCategory::Authentication => MdSyncError::Auth(self.user_message()),
            SapErrorCategory::Validation => MdSyncError::InvalidInput(self.user_message()),
            _ => MdSyncError::Internal(self.user_message()),
        }
    }
}

impl fmt::Display for SapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, " ({ctx})")?;
        }
        Ok(())
    }
}

impl std::error::Error for SapError {}

impl From<reqwest::Error> for SapError {
    fn from(err: reqwest::Error) -> Self {
        let (category, message) = if err.is_timeout() {
            (SapErrorCategory::NetworkTimeout, "Request timed out".to_string())
        } else if err.is_connect() {
            (SapErrorCategory::NetworkOffline, "Failed to connect to Service Layer".to_string())
        } else if let Some(status) = err.status() {
            return Self::from_status_code(status).with_context(err.to_string());
        } else if err.is_decode() {
            (SapErrorCategory::Unknown, "Response body is not valid JSON".to_string())
        } else {
            (SapErrorCategory::Unknown, "Network error".to_string())
        };

        Self::new(category, message).with_context(err.to_string())
    }
}

impl From<SapError> for MdSyncError {
    fn from(err: SapError) -> Self {
        err.into_domain_error()
    }
}
