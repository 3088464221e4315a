//! Contact persons attached to a business partner

use serde::{Deserialize, Serialize};

use super::partner::lenient;
use super::provenance::Provenance;

/// A person associated with a business partner via `CardCode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(rename = "CardCode")]
    pub card_code: String,
    /// Display name; the partner's `CntctPrsn` points at this value.
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "FirstName", default, deserialize_with = "lenient::opt_string")]
    pub first_name: Option<String>,
    #[serde(rename = "LastName", default, deserialize_with = "lenient::opt_string")]
    pub last_name: Option<String>,
    #[serde(rename = "Position", default, deserialize_with = "lenient::opt_string")]
    pub position: Option<String>,
    #[serde(rename = "Tel1", default, deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    #[serde(rename = "E_MailL", default, deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub provenance: Provenance,
}

impl Contact {
    pub fn new(id: impl Into<String>, card_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            card_code: card_code.into(),
            name: name.into(),
            first_name: None,
            last_name: None,
            position: None,
            phone: None,
            email: None,
            provenance: Provenance::portal(),
        }
    }
}
