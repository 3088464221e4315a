//! Portal form payloads

use serde::{Deserialize, Serialize};

use super::address::AddrType;
use super::partner::CardType;

/// Address fields entered in a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AddressFields {
    pub street: Option<String>,
    pub block: Option<String>,
    pub building: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Create or edit a business partner from the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerInput {
    pub card_code: String,
    pub card_name: String,
    pub card_type: CardType,
    #[serde(default)]
    pub group_code: Option<String>,
    #[serde(default)]
    pub partner_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    /// Billing address created alongside a new partner.
    #[serde(default)]
    pub billing: Option<AddressFields>,
    /// Shipping address created alongside a new partner.
    #[serde(default)]
    pub shipping: Option<AddressFields>,
}

/// Create or edit a single address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    /// Existing address ID when editing; `None` allocates a new one.
    #[serde(default)]
    pub id: Option<String>,
    pub card_code: String,
    pub addr_type: AddrType,
    #[serde(flatten)]
    pub fields: AddressFields,
    /// Make this the partner's default address for its type.
    #[serde(default)]
    pub set_default: bool,
}

/// Create or edit a contact person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    #[serde(default)]
    pub id: Option<String>,
    pub card_code: String,
    pub name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Make this the partner's `CntctPrsn`.
    #[serde(default)]
    pub set_default: bool,
}
