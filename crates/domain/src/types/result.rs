//! Action result envelope
//!
//! Public actions never return `Err`. Every outcome is reported as an
//! [`ActionResult`], serialized as `{ error, status, message, action, data }`
//! so the UI can branch on `error`.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::errors::MdSyncError;

/// Success or failure of a public action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult<T> {
    Success { status: u16, message: String, action: Option<String>, data: T },
    Failure { status: u16, message: String, action: Option<String> },
}

impl<T> ActionResult<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::Success { status: 200, message: message.into(), action: None, data }
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::Success { status: 201, message: message.into(), action: None, data }
    }

    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self::Failure { status, message: message.into(), action: None }
    }

    pub fn from_error(err: &MdSyncError) -> Self {
        Self::failure(err.status_code(), err.to_string())
    }

    /// Attach the action identifier the UI uses to route follow-ups.
    #[must_use]
    pub fn with_action(mut self, name: impl Into<String>) -> Self {
        match &mut self {
            Self::Success { action, .. } | Self::Failure { action, .. } => {
                *action = Some(name.into());
            }
        }
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Success { status, .. } | Self::Failure { status, .. } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }

    pub fn action(&self) -> Option<&str> {
        match self {
            Self::Success { action, .. } | Self::Failure { action, .. } => action.as_deref(),
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }
}

impl<T: Serialize> Serialize for ActionResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ActionResult", 5)?;
        state.serialize_field("error", &self.is_error())?;
        state.serialize_field("status", &self.status())?;
        state.serialize_field("message", self.message())?;
        state.serialize_field("action", &self.action())?;
        state.serialize_field("data", &self.data())?;
        state.end()
    }
}
