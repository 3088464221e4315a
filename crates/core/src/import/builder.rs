//! Turns validated rows into the rows committed by one chunk

use std::collections::HashSet;

use mdsync_domain::{AddrType, Address, AddressFields, BusinessPartner, CardType, ExcessManager};

use super::validator::ValidatedRow;
use crate::ids::AddressIdAllocator;
use crate::provenance::stamp_portal;

/// Everything one chunk writes, committed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportWrite {
    pub partners: Vec<BusinessPartner>,
    pub addresses: Vec<Address>,
    pub excess_managers: Vec<ExcessManager>,
}

impl ImportWrite {
    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}

/// Build partner, address and junction rows for accepted rows.
///
/// Every partner gets a billing and a shipping address whose IDs come from
/// `allocator`, wired into `BillToDef`/`ShipToDef`. Junction rows are only
/// built for managers present in `users`.
pub fn build_import_write(
    rows: Vec<ValidatedRow>,
    card_type: CardType,
    users: &HashSet<String>,
    allocator: &mut AddressIdAllocator,
) -> ImportWrite {
    let mut write = ImportWrite::default();

    for row in rows {
        let bill_id = allocator.next_id();
        let ship_id = allocator.next_id();

        write.addresses.push(new_address(&bill_id, &row.card_code, AddrType::Billing, &row.billing));
        write.addresses.push(new_address(&ship_id, &row.card_code, AddrType::Shipping, &row.shipping));

        write.excess_managers.extend(
            row.excess_managers
                .iter()
                .filter(|id| users.contains(*id))
                .map(|id| ExcessManager { card_code: row.card_code.clone(), user_id: id.clone() }),
        );

        let mut partner = BusinessPartner::new(row.card_code, row.card_name, card_type);
        partner.group_code = row.group_code;
        partner.partner_type = row.partner_type;
        partner.status = row.status;
        partner.scope = row.scope;
        partner.phone = row.phone;
        partner.email = row.email;
        partner.currency = row.currency;
        partner.payment_terms = row.payment_terms;
        partner.commodity_strengths = join_list(&row.commodity_strengths);
        partner.mfr_strengths = join_list(&row.mfr_strengths);
        partner.bill_to_def = Some(bill_id);
        partner.ship_to_def = Some(ship_id);
        write.partners.push(stamp_portal(partner));
    }

    write
}

/// Portal address with the given fields.
pub fn new_address(id: &str, card_code: &str, addr_type: AddrType, fields: &AddressFields) -> Address {
    let mut address = Address::new(id, card_code, addr_type);
    apply_address_fields(&mut address, fields);
    stamp_portal(address)
}

pub fn apply_address_fields(address: &mut Address, fields: &AddressFields) {
    address.street = fields.street.clone();
    address.block = fields.block.clone();
    address.building = fields.building.clone();
    address.city = fields.city.clone();
    address.zip_code = fields.zip_code.clone();
    address.county = fields.county.clone();
    address.state = fields.state.clone();
    address.country = fields.country.clone();
}

fn join_list(items: &[String]) -> Option<String> {
    (!items.is_empty()).then(|| items.join(","))
}
