//! Business partner master data
//!
//! Field names on the wire follow the ERP column names so rows returned by
//! the ERP query endpoint deserialize directly into these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::provenance::Provenance;
use crate::impl_code_conversions;

/// Customer or supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    #[serde(rename = "C", alias = "c", alias = "cCustomer")]
    Customer,
    #[serde(rename = "S", alias = "s", alias = "cSupplier")]
    Supplier,
}

impl_code_conversions!(CardType {
    Customer => "C",
    Supplier => "S",
});

/// A customer or supplier record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessPartner {
    #[serde(rename = "CardCode")]
    pub card_code: String,
    #[serde(rename = "CardName", default)]
    pub card_name: String,
    #[serde(rename = "CardType")]
    pub card_type: CardType,
    #[serde(rename = "GroupCode", default, deserialize_with = "lenient::opt_string")]
    pub group_code: Option<String>,
    /// Company/private classification (`CmpPrivate` in the ERP).
    #[serde(rename = "CmpPrivate", default, deserialize_with = "lenient::opt_string")]
    pub partner_type: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,
    #[serde(rename = "Scope", default, deserialize_with = "lenient::opt_string")]
    pub scope: Option<String>,
    #[serde(rename = "Phone1", default, deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    #[serde(rename = "E_Mail", default, deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    #[serde(rename = "Currency", default, deserialize_with = "lenient::opt_string")]
    pub currency: Option<String>,
    #[serde(rename = "GroupNum", default, deserialize_with = "lenient::opt_string")]
    pub payment_terms: Option<String>,
    /// Comma-separated item group codes (suppliers).
    #[serde(rename = "CmdtyStrength", default, deserialize_with = "lenient::opt_string")]
    pub commodity_strengths: Option<String>,
    /// Comma-separated manufacturer codes (suppliers).
    #[serde(rename = "MfrStrength", default, deserialize_with = "lenient::opt_string")]
    pub mfr_strengths: Option<String>,
    /// Default contact name.
    #[serde(rename = "CntctPrsn", default, deserialize_with = "lenient::opt_string")]
    pub contact_person: Option<String>,
    /// Default billing address ID.
    #[serde(rename = "BillToDef", default, deserialize_with = "lenient::opt_string")]
    pub bill_to_def: Option<String>,
    /// Default shipping address ID.
    #[serde(rename = "ShipToDef", default, deserialize_with = "lenient::opt_string")]
    pub ship_to_def: Option<String>,
    /// ERP creation date, `yyyyMMdd`.
    #[serde(rename = "CreateDate", default, deserialize_with = "lenient::opt_string")]
    pub create_date: Option<String>,
    /// ERP update date, `yyyyMMdd`.
    #[serde(rename = "UpdateDate", default, deserialize_with = "lenient::opt_string")]
    pub update_date: Option<String>,
    #[serde(flatten)]
    pub provenance: Provenance,
    #[serde(rename = "deletedAt", default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(rename = "deletedBy", default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
}

impl BusinessPartner {
    /// Minimal record with only the key fields populated.
    pub fn new(card_code: impl Into<String>, card_name: impl Into<String>, card_type: CardType) -> Self {
        Self {
            card_code: card_code.into(),
            card_name: card_name.into(),
            card_type,
            group_code: None,
            partner_type: None,
            status: None,
            scope: None,
            phone: None,
            email: None,
            currency: None,
            payment_terms: None,
            commodity_strengths: None,
            mfr_strengths: None,
            contact_person: None,
            bill_to_def: None,
            ship_to_def: None,
            create_date: None,
            update_date: None,
            provenance: Provenance::portal(),
            deleted_at: None,
            deleted_by: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Serde helpers for ERP payloads, which send codes as either numbers or
/// strings and use empty strings for "no value".
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            Some(other) => Some(other.to_string()),
        })
    }
}
