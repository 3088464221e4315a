//! Portal master-data actions
//!
//! Writes go through `MasterDataService`, which invalidates the cache tags
//! the two list actions read from.

use mdsync_domain::constants::{
    ACTION_DELETE_PARTNER, ACTION_GET_DEFAULT_ADDRESS, ACTION_GET_DEFAULT_CONTACT,
    ACTION_LIST_ADDRESSES, ACTION_LIST_PARTNERS, ACTION_UPSERT_ADDRESS, ACTION_UPSERT_CONTACT,
    ACTION_UPSERT_PARTNER,
};
use mdsync_domain::{
    address_cache_tag, partner_cache_tag, ActionResult, AddrType, Address, AddressInput,
    BusinessPartner, CardType, Contact, ContactInput, PartnerInput,
};

use crate::context::AppContext;
use crate::utils::action_helpers::execute_action;

const LIST_KEY: &str = "list";

pub async fn upsert_business_partner(ctx: &AppContext, input: PartnerInput) -> ActionResult<BusinessPartner> {
    execute_action(ACTION_UPSERT_PARTNER, || ctx.master.upsert_business_partner(input), |partner| {
        ActionResult::ok(format!("Business partner {} saved", partner.card_code), partner)
    })
    .await
}

/// Create or edit an address. New addresses get unpadded IDs (`A124`).
pub async fn upsert_address(ctx: &AppContext, input: AddressInput) -> ActionResult<Address> {
    execute_action(ACTION_UPSERT_ADDRESS, || ctx.master.upsert_address(input), |address| {
        ActionResult::ok(format!("Address {} saved", address.id), address)
    })
    .await
}

pub async fn upsert_contact(ctx: &AppContext, input: ContactInput) -> ActionResult<Contact> {
    execute_action(ACTION_UPSERT_CONTACT, || ctx.master.upsert_contact(input), |contact| {
        ActionResult::ok(format!("Contact {} saved", contact.name), contact)
    })
    .await
}

pub async fn delete_business_partner(ctx: &AppContext, card_code: &str, deleted_by: &str) -> ActionResult<()> {
    execute_action(
        ACTION_DELETE_PARTNER,
        || ctx.master.soft_delete_business_partner(card_code, deleted_by),
        |()| ActionResult::ok(format!("Business partner {card_code} deleted"), ()),
    )
    .await
}

pub async fn get_default_address(ctx: &AppContext, card_code: &str, addr_type: AddrType) -> ActionResult<Address> {
    execute_action(
        ACTION_GET_DEFAULT_ADDRESS,
        || ctx.master.get_default_address(card_code, addr_type),
        |address| ActionResult::ok("Default address found", address),
    )
    .await
}

pub async fn get_default_contact(ctx: &AppContext, card_code: &str) -> ActionResult<Contact> {
    execute_action(
        ACTION_GET_DEFAULT_CONTACT,
        || ctx.master.get_default_contact(card_code),
        |contact| ActionResult::ok("Default contact found", contact),
    )
    .await
}

/// Live partners of one card type, served from the `bp-master-<type>` tag.
pub async fn list_business_partners(ctx: &AppContext, card_type: CardType) -> ActionResult<Vec<BusinessPartner>> {
    let tag = partner_cache_tag(card_type);
    execute_action(
        ACTION_LIST_PARTNERS,
        || ctx.cache.get_or_load(&tag, LIST_KEY, || ctx.master.list_business_partners(card_type)),
        |partners: Vec<BusinessPartner>| {
            ActionResult::ok(format!("{} business partners", partners.len()), partners)
        },
    )
    .await
}

/// Addresses of one partner, served from the `address-master-<code>` tag.
///
/// The tag is lowercased but card codes are case-sensitive, so the entry is
/// keyed by the exact code.
pub async fn list_addresses(ctx: &AppContext, card_code: &str) -> ActionResult<Vec<Address>> {
    let tag = address_cache_tag(card_code);
    execute_action(
        ACTION_LIST_ADDRESSES,
        || ctx.cache.get_or_load(&tag, card_code, || ctx.master.list_addresses(card_code)),
        |addresses: Vec<Address>| ActionResult::ok(format!("{} addresses", addresses.len()), addresses),
    )
    .await
}
