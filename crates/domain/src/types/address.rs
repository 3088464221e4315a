//! Billing and shipping addresses owned by a business partner

use serde::{Deserialize, Serialize};

use super::partner::lenient;
use super::provenance::Provenance;
use crate::impl_code_conversions;

/// Billing or shipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddrType {
    #[serde(rename = "B", alias = "b", alias = "bo_BillTo")]
    Billing,
    #[serde(rename = "S", alias = "s", alias = "bo_ShipTo")]
    Shipping,
}

impl_code_conversions!(AddrType {
    Billing => "B",
    Shipping => "S",
});

/// An address row.
///
/// `id` is the natural key. Portal-created addresses use the sequential
/// `A000123` form; ERP rows carry their `address` name as the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "id", alias = "address", alias = "Address")]
    pub id: String,
    #[serde(rename = "CardCode")]
    pub card_code: String,
    #[serde(rename = "AdresType", alias = "AddrType", alias = "AddressType")]
    pub addr_type: AddrType,
    #[serde(rename = "Street", default, deserialize_with = "lenient::opt_string")]
    pub street: Option<String>,
    #[serde(rename = "Block", default, deserialize_with = "lenient::opt_string")]
    pub block: Option<String>,
    #[serde(rename = "Building", default, deserialize_with = "lenient::opt_string")]
    pub building: Option<String>,
    #[serde(rename = "City", default, deserialize_with = "lenient::opt_string")]
    pub city: Option<String>,
    #[serde(rename = "ZipCode", default, deserialize_with = "lenient::opt_string")]
    pub zip_code: Option<String>,
    #[serde(rename = "County", default, deserialize_with = "lenient::opt_string")]
    pub county: Option<String>,
    #[serde(rename = "State", default, deserialize_with = "lenient::opt_string")]
    pub state: Option<String>,
    #[serde(rename = "Country", default, deserialize_with = "lenient::opt_string")]
    pub country: Option<String>,
    #[serde(rename = "CreateDate", default, deserialize_with = "lenient::opt_string")]
    pub create_date: Option<String>,
    #[serde(rename = "UpdateDate", default, deserialize_with = "lenient::opt_string")]
    pub update_date: Option<String>,
    #[serde(flatten)]
    pub provenance: Provenance,
}

impl Address {
    pub fn new(id: impl Into<String>, card_code: impl Into<String>, addr_type: AddrType) -> Self {
        Self {
            id: id.into(),
            card_code: card_code.into(),
            addr_type,
            street: None,
            block: None,
            building: None,
            city: None,
            zip_code: None,
            county: None,
            state: None,
            country: None,
            create_date: None,
            update_date: None,
            provenance: Provenance::portal(),
        }
    }
}
