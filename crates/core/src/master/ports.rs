//! Port interfaces for portal master-data maintenance

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mdsync_domain::{AddrType, Address, BusinessPartner, CardType, Contact, Result};

/// Business partner persistence.
#[async_trait]
pub trait PartnerRepository: Send + Sync {
    /// Non-deleted partner by code.
    async fn find_partner(&self, card_code: &str) -> Result<Option<BusinessPartner>>;

    /// Non-deleted partners of one type, ordered by code.
    async fn list_partners(&self, card_type: CardType) -> Result<Vec<BusinessPartner>>;

    /// Insert or update `partner` and insert `new_addresses` in one
    /// transaction.
    async fn save_partner(&self, partner: &BusinessPartner, new_addresses: &[Address]) -> Result<()>;

    /// Mark the partner deleted. Returns `false` when no live partner matched.
    async fn soft_delete_partner(
        &self,
        card_code: &str,
        deleted_by: &str,
        deleted_at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Point `BillToDef` or `ShipToDef` at `address_id`.
    async fn set_default_address(&self, card_code: &str, addr_type: AddrType, address_id: &str) -> Result<()>;

    /// Point `CntctPrsn` at `contact_name`.
    async fn set_default_contact(&self, card_code: &str, contact_name: &str) -> Result<()>;
}

/// Address persistence.
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Address names are only unique per partner.
    async fn find_address(&self, card_code: &str, id: &str) -> Result<Option<Address>>;

    async fn list_addresses(&self, card_code: &str) -> Result<Vec<Address>>;

    async fn save_address(&self, address: &Address) -> Result<()>;

    /// Largest `A<digits>` suffix, `0` when none.
    async fn max_address_suffix(&self) -> Result<u64>;
}

/// Contact persistence.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn find_contact(&self, id: &str) -> Result<Option<Contact>>;

    async fn find_contact_by_name(&self, card_code: &str, name: &str) -> Result<Option<Contact>>;

    async fn list_contacts(&self, card_code: &str) -> Result<Vec<Contact>>;

    async fn save_contact(&self, contact: &Contact) -> Result<()>;
}
