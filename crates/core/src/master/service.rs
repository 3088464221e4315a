//! Portal master-data maintenance
//!
//! Create and edit partners, addresses and contacts from portal forms.
//! Records owned by the ERP (`source = sap`) are read-only here.

use std::sync::Arc;

use mdsync_domain::{
    address_cache_tag, partner_cache_tag, AddrType, Address, AddressInput, BusinessPartner,
    CardType, Contact, ContactInput, MdSyncError, PartnerInput, Result,
};
use tracing::info;
use uuid::Uuid;

use super::ports::{AddressRepository, ContactRepository, PartnerRepository};
use crate::cache_ports::{CacheInvalidator, NoopInvalidator};
use crate::clock::{Clock, SystemClock};
use crate::ids::{AddressIdAllocator, IdFormat};
use crate::import::builder::{apply_address_fields, new_address};
use crate::provenance::{stamp_portal, Provenanced};

pub struct MasterDataService {
    partners: Arc<dyn PartnerRepository>,
    addresses: Arc<dyn AddressRepository>,
    contacts: Arc<dyn ContactRepository>,
    cache: Arc<dyn CacheInvalidator>,
    clock: Arc<dyn Clock>,
}

impl MasterDataService {
    pub fn new(
        partners: Arc<dyn PartnerRepository>,
        addresses: Arc<dyn AddressRepository>,
        contacts: Arc<dyn ContactRepository>,
    ) -> Self {
        Self {
            partners,
            addresses,
            contacts,
            cache: Arc::new(NoopInvalidator),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheInvalidator>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Create or edit a portal partner.
    ///
    /// Billing/shipping fields create a new address (padded ID) when the
    /// partner has no default of that type yet.
    pub async fn upsert_business_partner(&self, input: PartnerInput) -> Result<BusinessPartner> {
        let card_code = required(&input.card_code, "cardCode")?;
        let card_name = required(&input.card_name, "cardName")?;

        let mut partner = match self.partners.find_partner(&card_code).await? {
            Some(current) => {
                ensure_editable(&current, || format!("business partner {card_code}"))?;
                if current.card_type != input.card_type {
                    return Err(MdSyncError::InvalidInput(format!(
                        "business partner {card_code} is a {} and cannot change type",
                        current.card_type
                    )));
                }
                current
            }
            None => BusinessPartner::new(card_code.clone(), card_name.clone(), input.card_type),
        };

        partner.card_name = card_name;
        partner.group_code = input.group_code;
        partner.partner_type = input.partner_type;
        partner.status = input.status;
        partner.scope = input.scope;
        partner.phone = input.phone;
        partner.email = input.email;
        partner.currency = input.currency;
        partner.payment_terms = input.payment_terms;

        let wanted: Vec<_> = [(AddrType::Billing, input.billing), (AddrType::Shipping, input.shipping)]
            .into_iter()
            .filter_map(|(addr_type, fields)| fields.map(|fields| (addr_type, fields)))
            .filter(|(addr_type, _)| default_pointer(&partner, *addr_type).is_none())
            .collect();

        let mut new_addresses = Vec::with_capacity(wanted.len());
        if !wanted.is_empty() {
            let max = self.addresses.max_address_suffix().await?;
            let mut allocator = AddressIdAllocator::seeded(max, IdFormat::padded());
            for (addr_type, fields) in wanted {
                let address = new_address(&allocator.next_id(), &card_code, addr_type, &fields);
                set_default_pointer(&mut partner, addr_type, address.id.clone());
                new_addresses.push(address);
            }
        }

        let partner = stamp_portal(partner);
        self.partners.save_partner(&partner, &new_addresses).await?;

        self.cache.invalidate_tag(&partner_cache_tag(partner.card_type));
        if !new_addresses.is_empty() {
            self.cache.invalidate_tag(&address_cache_tag(&card_code));
        }

        info!(card_code = %card_code, addresses = new_addresses.len(), "master.partner_saved");
        Ok(partner)
    }

    /// Create or edit a single address. New IDs are unpadded (`A124`).
    pub async fn upsert_address(&self, input: AddressInput) -> Result<Address> {
        let card_code = required(&input.card_code, "cardCode")?;
        let partner = self.require_partner(&card_code).await?;
        if input.set_default {
            ensure_editable(&partner, || format!("business partner {card_code}"))?;
        }

        let address = match input.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                let mut current = self
                    .addresses
                    .find_address(&card_code, id)
                    .await?
                    .ok_or_else(|| MdSyncError::NotFound(format!("address {id} of {card_code}")))?;
                ensure_editable(&current, || format!("address {id}"))?;
                current.addr_type = input.addr_type;
                apply_address_fields(&mut current, &input.fields);
                stamp_portal(current)
            }
            None => {
                let max = self.addresses.max_address_suffix().await?;
                let id = AddressIdAllocator::seeded(max, IdFormat::Unpadded).next_id();
                new_address(&id, &card_code, input.addr_type, &input.fields)
            }
        };

        self.addresses.save_address(&address).await?;
        if input.set_default {
            self.partners.set_default_address(&card_code, address.addr_type, &address.id).await?;
            self.cache.invalidate_tag(&partner_cache_tag(partner.card_type));
        }
        self.cache.invalidate_tag(&address_cache_tag(&card_code));

        info!(card_code = %card_code, address_id = %address.id, "master.address_saved");
        Ok(address)
    }

    /// Create or edit a contact person.
    pub async fn upsert_contact(&self, input: ContactInput) -> Result<Contact> {
        let card_code = required(&input.card_code, "cardCode")?;
        let name = required(&input.name, "name")?;
        let partner = self.require_partner(&card_code).await?;
        if input.set_default {
            ensure_editable(&partner, || format!("business partner {card_code}"))?;
        }

        let mut contact = match input.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                let current = self
                    .contacts
                    .find_contact(id)
                    .await?
                    .ok_or_else(|| MdSyncError::NotFound(format!("contact {id}")))?;
                if current.card_code != card_code {
                    return Err(MdSyncError::InvalidInput(format!(
                        "contact {id} does not belong to {card_code}"
                    )));
                }
                ensure_editable(&current, || format!("contact {id}"))?;
                current
            }
            None => Contact::new(Uuid::new_v4().to_string(), card_code.clone(), name.clone()),
        };

        contact.name = name;
        contact.first_name = input.first_name;
        contact.last_name = input.last_name;
        contact.position = input.position;
        contact.phone = input.phone;
        contact.email = input.email;
        let contact = stamp_portal(contact);

        self.contacts.save_contact(&contact).await?;
        if input.set_default {
            self.partners.set_default_contact(&card_code, &contact.name).await?;
            self.cache.invalidate_tag(&partner_cache_tag(partner.card_type));
        }

        info!(card_code = %card_code, contact_id = %contact.id, "master.contact_saved");
        Ok(contact)
    }

    /// Mark a partner deleted; its rows stay in place.
    pub async fn soft_delete_business_partner(&self, card_code: &str, deleted_by: &str) -> Result<()> {
        let partner = self.require_partner(card_code).await?;
        let deleted = self
            .partners
            .soft_delete_partner(card_code, deleted_by, self.clock.now())
            .await?;
        if !deleted {
            return Err(MdSyncError::NotFound(format!("business partner {card_code}")));
        }

        self.cache.invalidate_tag(&partner_cache_tag(partner.card_type));
        self.cache.invalidate_tag(&address_cache_tag(card_code));
        info!(card_code = %card_code, deleted_by = %deleted_by, "master.partner_deleted");
        Ok(())
    }

    pub async fn get_default_address(&self, card_code: &str, addr_type: AddrType) -> Result<Address> {
        let partner = self.require_partner(card_code).await?;
        let id = default_pointer(&partner, addr_type).ok_or_else(|| {
            MdSyncError::NotFound(format!("default {} address for {card_code}", addr_label(addr_type)))
        })?;

        self.addresses
            .find_address(card_code, id)
            .await?
            .ok_or_else(|| MdSyncError::NotFound(format!("address {id}")))
    }

    pub async fn get_default_contact(&self, card_code: &str) -> Result<Contact> {
        let partner = self.require_partner(card_code).await?;
        let name = partner
            .contact_person
            .as_deref()
            .ok_or_else(|| MdSyncError::NotFound(format!("default contact for {card_code}")))?;

        self.contacts
            .find_contact_by_name(card_code, name)
            .await?
            .ok_or_else(|| MdSyncError::NotFound(format!("contact {name}")))
    }

    pub async fn get_business_partner(&self, card_code: &str) -> Result<BusinessPartner> {
        self.require_partner(card_code).await
    }

    pub async fn list_business_partners(&self, card_type: CardType) -> Result<Vec<BusinessPartner>> {
        self.partners.list_partners(card_type).await
    }

    pub async fn list_addresses(&self, card_code: &str) -> Result<Vec<Address>> {
        self.addresses.list_addresses(card_code).await
    }

    pub async fn list_contacts(&self, card_code: &str) -> Result<Vec<Contact>> {
        self.contacts.list_contacts(card_code).await
    }

    async fn require_partner(&self, card_code: &str) -> Result<BusinessPartner> {
        self.partners
            .find_partner(card_code)
            .await?
            .ok_or_else(|| MdSyncError::NotFound(format!("business partner {card_code}")))
    }
}

fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MdSyncError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn ensure_editable<T: Provenanced>(record: &T, describe: impl FnOnce() -> String) -> Result<()> {
    if record.is_read_only() {
        return Err(MdSyncError::ReadOnly(format!("{} is managed by the ERP", describe())));
    }
    Ok(())
}

fn default_pointer(partner: &BusinessPartner, addr_type: AddrType) -> Option<&str> {
    match addr_type {
        AddrType::Billing => partner.bill_to_def.as_deref(),
        AddrType::Shipping => partner.ship_to_def.as_deref(),
    }
}

fn set_default_pointer(partner: &mut BusinessPartner, addr_type: AddrType, id: String) {
    match addr_type {
        AddrType::Billing => partner.bill_to_def = Some(id),
        AddrType::Shipping => partner.ship_to_def = Some(id),
    }
}

fn addr_label(addr_type: AddrType) -> &'static str {
    match addr_type {
        AddrType::Billing => "billing",
        AddrType::Shipping => "shipping",
    }
}
