//! Record provenance markers
//!
//! Every master-data record remembers where it came from (`source`) and
//! whether it mirrors the ERP (`syncStatus`).

use serde::{Deserialize, Serialize};

use crate::impl_code_conversions;

/// Origin of a master-data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Source {
    /// Copied in from the ERP by the reconciler.
    #[serde(rename = "sap")]
    Sap,
    /// Created or edited through a portal form or import.
    #[serde(rename = "portal")]
    #[default]
    Portal,
}

impl_code_conversions!(Source {
    Sap => "sap",
    Portal => "portal",
});

impl Source {
    /// ERP-sourced records are read-only for portal edits.
    pub const fn is_erp_managed(self) -> bool {
        matches!(self, Self::Sap)
    }
}

/// Whether a record is reflected in the ERP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SyncStatus {
    /// Portal-created, not yet reflected upstream.
    #[serde(rename = "pending")]
    #[default]
    Pending,
    /// Mirrors the ERP.
    #[serde(rename = "synced")]
    Synced,
}

impl_code_conversions!(SyncStatus {
    Pending => "pending",
    Synced => "synced",
});

/// Provenance pair carried by partners, addresses and contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Provenance {
    #[serde(default)]
    pub source: Source,
    #[serde(default, rename = "syncStatus")]
    pub sync_status: SyncStatus,
}

impl Provenance {
    /// Stamp used for rows written by the reconciler.
    pub const fn erp() -> Self {
        Self { source: Source::Sap, sync_status: SyncStatus::Synced }
    }

    /// Stamp used for rows created through the portal.
    pub const fn portal() -> Self {
        Self { source: Source::Portal, sync_status: SyncStatus::Pending }
    }
}
