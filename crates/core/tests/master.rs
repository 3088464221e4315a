//! Portal master-data maintenance scenarios.

mod support;

use std::sync::Arc;

use mdsync_core::{FixedClock, MasterDataService};
use mdsync_domain::{
    AddrType, Address, AddressFields, AddressInput, BusinessPartner, CardType, Contact,
    ContactInput, MdSyncError, PartnerInput, Provenance, Source, SyncStatus,
};
use support::{at, MemoryDb, RecordingCache};

fn service(db: &Arc<MemoryDb>) -> MasterDataService {
    MasterDataService::new(db.clone(), db.clone(), db.clone())
}

fn partner_input(code: &str) -> PartnerInput {
    PartnerInput {
        card_code: code.into(),
        card_name: "Acme GmbH".into(),
        card_type: CardType::Customer,
        group_code: Some("100".into()),
        partner_type: None,
        status: Some("Active".into()),
        scope: None,
        phone: None,
        email: None,
        currency: None,
        payment_terms: None,
        billing: Some(AddressFields { city: Some("Berlin".into()), ..Default::default() }),
        shipping: Some(AddressFields::default()),
    }
}

fn address_input(card_code: &str, id: Option<&str>) -> AddressInput {
    AddressInput {
        id: id.map(str::to_string),
        card_code: card_code.into(),
        addr_type: AddrType::Shipping,
        fields: AddressFields { street: Some("Dock 4".into()), ..Default::default() },
        set_default: false,
    }
}

fn contact_input(card_code: &str, name: &str) -> ContactInput {
    ContactInput {
        id: None,
        card_code: card_code.into(),
        name: name.into(),
        first_name: None,
        last_name: None,
        position: None,
        phone: None,
        email: None,
        set_default: false,
    }
}

fn erp_partner(code: &str) -> BusinessPartner {
    let mut bp = BusinessPartner::new(code, "From ERP", CardType::Customer);
    bp.provenance = Provenance::erp();
    bp
}

#[tokio::test]
async fn new_partner_gets_padded_default_addresses() {
    let db = Arc::new(MemoryDb::new().with_address(Address::new("A000007", "X1", AddrType::Billing)));
    let cache = Arc::new(RecordingCache::default());

    let bp = service(&db)
        .with_cache(cache.clone())
        .upsert_business_partner(partner_input("C1"))
        .await
        .unwrap();

    assert_eq!(bp.provenance.source, Source::Portal);
    assert_eq!(bp.provenance.sync_status, SyncStatus::Pending);
    assert_eq!(bp.bill_to_def.as_deref(), Some("A000008"));
    assert_eq!(bp.ship_to_def.as_deref(), Some("A000009"));
    assert_eq!(db.address("A000008").unwrap().city.as_deref(), Some("Berlin"));
    assert_eq!(cache.tags(), vec!["bp-master-c", "address-master-c1"]);
}

#[tokio::test]
async fn editing_partner_keeps_existing_defaults() {
    let db = Arc::new(MemoryDb::new());
    let svc = service(&db);
    svc.upsert_business_partner(partner_input("C1")).await.unwrap();

    let mut edit = partner_input("C1");
    edit.card_name = "Acme AG".into();
    let bp = svc.upsert_business_partner(edit).await.unwrap();

    assert_eq!(bp.card_name, "Acme AG");
    assert_eq!(bp.bill_to_def.as_deref(), Some("A000001"));
    assert_eq!(db.address_count(), 2);
}

#[tokio::test]
async fn erp_partner_is_read_only() {
    let db = Arc::new(MemoryDb::new().with_partner(erp_partner("C100")));

    let err = service(&db).upsert_business_partner(partner_input("C100")).await.unwrap_err();
    assert!(matches!(err, MdSyncError::ReadOnly(_)));
    assert_eq!(err.status_code(), 403);
    assert_eq!(db.partner("C100").unwrap().card_name, "From ERP");
}

#[tokio::test]
async fn blank_card_code_is_invalid() {
    let db = Arc::new(MemoryDb::new());
    let err = service(&db).upsert_business_partner(partner_input("  ")).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
}

// The single-address path allocates without padding while partner creation
// pads; both stay monotonic over the same suffix space.
#[tokio::test]
async fn address_upsert_allocates_unpadded_ids() {
    let db = Arc::new(MemoryDb::new());
    let svc = service(&db);
    svc.upsert_business_partner(partner_input("C1")).await.unwrap();

    let address = svc.upsert_address(address_input("C1", None)).await.unwrap();
    assert_eq!(address.id, "A3");
    assert_eq!(address.provenance, Provenance::portal());

    let mut next = partner_input("C2");
    next.shipping = None;
    let bp = svc.upsert_business_partner(next).await.unwrap();
    assert_eq!(bp.bill_to_def.as_deref(), Some("A000004"));
}

#[tokio::test]
async fn address_upsert_can_become_default() {
    let db = Arc::new(MemoryDb::new());
    let svc = service(&db);
    svc.upsert_business_partner(partner_input("C1")).await.unwrap();

    let mut input = address_input("C1", None);
    input.set_default = true;
    let address = svc.upsert_address(input).await.unwrap();

    let default = svc.get_default_address("C1", AddrType::Shipping).await.unwrap();
    assert_eq!(default.id, address.id);
}

#[tokio::test]
async fn erp_address_cannot_be_edited() {
    let mut erp_address = Address::new("Head Office", "C1", AddrType::Billing);
    erp_address.provenance = Provenance::erp();
    let db = Arc::new(MemoryDb::new().with_address(erp_address));
    let svc = service(&db);
    svc.upsert_business_partner(partner_input("C1")).await.unwrap();

    let err = svc.upsert_address(address_input("C1", Some("Head Office"))).await.unwrap_err();
    assert!(matches!(err, MdSyncError::ReadOnly(_)));
}

#[tokio::test]
async fn shared_address_name_resolves_per_partner() {
    let mut c1_bill = Address::new("Bill To", "C1", AddrType::Billing);
    c1_bill.city = Some("Berlin".into());
    let mut c2_bill = Address::new("Bill To", "C2", AddrType::Billing);
    c2_bill.city = Some("Hamburg".into());
    let db = Arc::new(
        MemoryDb::new()
            .with_address(c1_bill)
            .with_address(c2_bill)
            .with_address(Address::new("Ship To", "C2", AddrType::Shipping)),
    );
    let svc = service(&db);
    svc.upsert_business_partner(partner_input("C1")).await.unwrap();
    svc.upsert_business_partner(partner_input("C2")).await.unwrap();

    let edited = svc.upsert_address(address_input("C2", Some("Bill To"))).await.unwrap();
    assert_eq!(edited.card_code, "C2");
    assert_eq!(edited.street.as_deref(), Some("Dock 4"));

    let c1 = svc.list_addresses("C1").await.unwrap();
    let c1_bill = c1.iter().find(|a| a.id == "Bill To").unwrap();
    assert_eq!(c1_bill.city.as_deref(), Some("Berlin"));
    assert_eq!(c1_bill.street, None);

    let err = svc.upsert_address(address_input("C1", Some("Ship To"))).await.unwrap_err();
    assert!(matches!(err, MdSyncError::NotFound(msg) if msg.contains("Ship To")));
}

#[tokio::test]
async fn address_for_unknown_partner_is_not_found() {
    let db = Arc::new(MemoryDb::new());
    let err = service(&db).upsert_address(address_input("NOPE", None)).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn default_contact_follows_contact_person() {
    let db = Arc::new(MemoryDb::new());
    let svc = service(&db);
    svc.upsert_business_partner(partner_input("C1")).await.unwrap();

    let missing = svc.get_default_contact("C1").await.unwrap_err();
    assert_eq!(missing.status_code(), 404);

    let mut input = contact_input("C1", "Jane Roe");
    input.set_default = true;
    let contact = svc.upsert_contact(input).await.unwrap();

    assert_eq!(db.partner("C1").unwrap().contact_person.as_deref(), Some("Jane Roe"));
    assert_eq!(svc.get_default_contact("C1").await.unwrap().id, contact.id);
}

#[tokio::test]
async fn dangling_default_pointer_is_not_found() {
    let mut bp = BusinessPartner::new("C1", "Acme", CardType::Customer);
    bp.bill_to_def = Some("A999".into());
    let db = Arc::new(MemoryDb::new().with_partner(bp));

    let err = service(&db).get_default_address("C1", AddrType::Billing).await.unwrap_err();
    assert!(matches!(err, MdSyncError::NotFound(msg) if msg.contains("A999")));

    let err = service(&db).get_default_address("C1", AddrType::Shipping).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn erp_contact_cannot_be_edited() {
    let mut contact = Contact::new("K1", "C1", "Max Mustermann");
    contact.provenance = Provenance::erp();
    let db = Arc::new(MemoryDb::new().with_contact(contact));
    let svc = service(&db);
    svc.upsert_business_partner(partner_input("C1")).await.unwrap();

    let mut input = contact_input("C1", "Max M.");
    input.id = Some("K1".into());
    let err = svc.upsert_contact(input).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn soft_delete_hides_partner() {
    let db = Arc::new(MemoryDb::new());
    let cache = Arc::new(RecordingCache::default());
    let svc = service(&db).with_cache(cache.clone()).with_clock(Arc::new(FixedClock(at(2024, 9, 1))));
    svc.upsert_business_partner(partner_input("C1")).await.unwrap();

    svc.soft_delete_business_partner("C1", "u1").await.unwrap();

    let stored = db.partner("C1").unwrap();
    assert_eq!(stored.deleted_at, Some(at(2024, 9, 1)));
    assert_eq!(stored.deleted_by.as_deref(), Some("u1"));
    assert!(svc.list_business_partners(CardType::Customer).await.unwrap().is_empty());
    assert_eq!(svc.get_business_partner("C1").await.unwrap_err().status_code(), 404);
    assert_eq!(svc.soft_delete_business_partner("C1", "u1").await.unwrap_err().status_code(), 404);
}
