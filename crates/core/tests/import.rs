//! Chunked import scenarios.

mod support;

use std::sync::Arc;

use mdsync_core::ImportService;
use mdsync_domain::{
    AddrType, Address, BusinessPartner, CardType, ExcessManagerCheck, ImportBatchRequest,
    ImportMetaData, ImportRow, ImportStats, ImportStatus, LookupEntry, MdSyncError, Provenance,
};
use serde_json::json;
use support::{MemoryDb, RecordingCache};

fn meta() -> ImportMetaData {
    ImportMetaData {
        card_type: CardType::Customer,
        groups: vec![LookupEntry::new("100", "Domestic")],
        payment_terms: vec![],
        currencies: vec![],
        item_groups: vec![],
        manufacturers: vec![],
        users: vec!["u1".into()],
    }
}

fn customer(code: &str) -> ImportRow {
    serde_json::from_value(json!({
        "Code": code,
        "CompanyName": format!("{code} GmbH"),
        "Group": "100",
        "Type": "C",
        "Status": "Active"
    }))
    .unwrap()
}

fn incomplete(code: &str) -> ImportRow {
    serde_json::from_value(json!({ "Code": code, "CompanyName": "No Group Inc" })).unwrap()
}

fn request(data: Vec<ImportRow>, total: usize, stats: ImportStats) -> ImportBatchRequest {
    ImportBatchRequest { data, total, stats, is_last_batch: false, meta_data: meta(), offset: None }
}

#[tokio::test]
async fn one_bad_row_and_one_good_row() {
    let db = Arc::new(MemoryDb::new());
    let service = ImportService::new(db.clone());

    let outcome = service
        .process_batch(request(vec![incomplete("C1"), customer("C2")], 4, ImportStats::default()))
        .await
        .unwrap();

    assert_eq!(outcome.accepted, 1);
    assert_eq!(outcome.rejected, 1);
    assert_eq!(outcome.stats.completed, 1);
    assert_eq!(outcome.stats.error.len(), 1);
    assert_eq!(outcome.stats.error[0].row_number, 1);
    assert_eq!(outcome.stats.error[0].entries, vec!["Group is required", "Type is required", "Status is required"]);
    assert_eq!(outcome.stats.progress, 25.0);
    assert_eq!(outcome.stats.status, ImportStatus::Processing);

    let bp = db.partner("C2").unwrap();
    assert_eq!(bp.provenance, Provenance::portal());
    assert_eq!(bp.bill_to_def.as_deref(), Some("A000001"));
    assert_eq!(bp.ship_to_def.as_deref(), Some("A000002"));
    assert_eq!(db.address("A000001").unwrap().addr_type, AddrType::Billing);
}

#[tokio::test]
async fn stats_thread_through_successive_chunks() {
    let db = Arc::new(MemoryDb::new());
    let service = ImportService::new(db.clone());

    let first = service
        .process_batch(request(vec![customer("C1"), incomplete("C2")], 4, ImportStats::default()))
        .await
        .unwrap();

    let mut second_request = request(vec![customer("C3"), customer("C4")], 4, first.stats);
    second_request.is_last_batch = true;
    let second = service.process_batch(second_request).await.unwrap();

    assert_eq!(second.stats.completed, 3);
    assert_eq!(second.stats.error.len(), 1);
    assert_eq!(second.stats.progress, 75.0);
    assert_eq!(second.stats.status, ImportStatus::Completed);

    // A000001/2 went to C1; the second chunk continues from the stored max.
    assert_eq!(db.partner("C3").unwrap().bill_to_def.as_deref(), Some("A000003"));
    assert_eq!(db.partner("C4").unwrap().ship_to_def.as_deref(), Some("A000006"));
}

#[tokio::test]
async fn row_numbers_continue_from_previous_chunks() {
    let service = ImportService::new(Arc::new(MemoryDb::new()));
    let previous = ImportStats { total: 10, completed: 4, progress: 40.0, error: vec![], status: ImportStatus::Processing };

    let outcome = service
        .process_batch(request(vec![customer("C5"), incomplete("C6")], 10, previous))
        .await
        .unwrap();
    assert_eq!(outcome.stats.error[0].row_number, 6);

    let mut with_offset = request(vec![incomplete("C7")], 10, ImportStats::default());
    with_offset.offset = Some(8);
    let outcome = service.process_batch(with_offset).await.unwrap();
    assert_eq!(outcome.stats.error[0].row_number, 8);
}

#[tokio::test]
async fn resubmitting_a_committed_chunk_creates_no_duplicates() {
    let db = Arc::new(MemoryDb::new());
    let service = ImportService::new(db.clone());
    let rows = vec![customer("C1"), customer("C2")];

    service.process_batch(request(rows.clone(), 2, ImportStats::default())).await.unwrap();
    let retry = service.process_batch(request(rows, 2, ImportStats::default())).await.unwrap();

    assert_eq!(retry.accepted, 0);
    assert_eq!(retry.stats.error.len(), 2);
    assert_eq!(db.partner_count(), 2);
    assert_eq!(db.address_count(), 4);
}

#[tokio::test]
async fn duplicate_codes_within_a_chunk_keep_the_first() {
    let db = Arc::new(MemoryDb::new());
    let outcome = ImportService::new(db.clone())
        .process_batch(request(vec![customer("C1"), customer("C1")], 2, ImportStats::default()))
        .await
        .unwrap();

    assert_eq!(outcome.accepted, 1);
    assert_eq!(outcome.stats.error[0].row_number, 2);
    assert_eq!(outcome.stats.error[0].entries, vec!["Code C1 already exists"]);
}

#[tokio::test]
async fn existing_address_ids_seed_the_allocator_once() {
    let db = Arc::new(
        MemoryDb::new()
            .with_address(Address::new("A000041", "X1", AddrType::Billing))
            .with_address(Address::new("Head Office", "X1", AddrType::Shipping)),
    );

    ImportService::new(db.clone())
        .process_batch(request(vec![customer("C1"), customer("C2"), customer("C3")], 3, ImportStats::default()))
        .await
        .unwrap();

    let ids: Vec<String> = ["C1", "C2", "C3"]
        .iter()
        .flat_map(|code| {
            let bp = db.partner(code).unwrap();
            [bp.bill_to_def.unwrap(), bp.ship_to_def.unwrap()]
        })
        .collect();
    assert_eq!(ids, vec!["A000042", "A000043", "A000044", "A000045", "A000046", "A000047"]);
}

#[tokio::test]
async fn deleted_partner_code_can_be_reimported() {
    let mut deleted = BusinessPartner::new("C1", "Gone", CardType::Customer);
    deleted.deleted_at = Some(support::at(2024, 1, 1));
    let db = Arc::new(MemoryDb::new().with_partner(deleted));

    let outcome = ImportService::new(db)
        .process_batch(request(vec![customer("C1")], 1, ImportStats::default()))
        .await
        .unwrap();
    assert_eq!(outcome.accepted, 1);
}

#[tokio::test]
async fn oversized_chunk_is_rejected_before_any_work() {
    let db = Arc::new(MemoryDb::new());
    let service = ImportService::new(db.clone()).with_max_batch_size(1);

    let err = service
        .process_batch(request(vec![customer("C1"), customer("C2")], 2, ImportStats::default()))
        .await
        .unwrap_err();

    assert!(matches!(err, MdSyncError::InvalidInput(_)));
    assert_eq!(db.partner_count(), 0);
}

#[tokio::test]
async fn empty_import_reports_complete() {
    let outcome = ImportService::new(Arc::new(MemoryDb::new()))
        .process_batch(request(vec![], 0, ImportStats::default()))
        .await
        .unwrap();

    assert_eq!(outcome.stats.progress, 100.0);
    assert_eq!(outcome.stats.status, ImportStatus::Completed);
}

#[tokio::test]
async fn intended_manager_check_links_known_managers() {
    let db = Arc::new(MemoryDb::new());
    let cache = Arc::new(RecordingCache::default());
    let service = ImportService::new(db.clone())
        .with_manager_check(ExcessManagerCheck::Intended)
        .with_cache(cache.clone());

    let mut row = customer("C1");
    row.insert("ExcessManagers".into(), json!("u1"));
    let outcome = service.process_batch(request(vec![row], 1, ImportStats::default())).await.unwrap();

    assert_eq!(outcome.committed.excess_managers, 1);
    assert_eq!(cache.tags(), vec!["bp-master-c"]);
}

#[tokio::test]
async fn failed_commit_surfaces_as_error() {
    let db = Arc::new(MemoryDb::new());
    db.fail_writes.store(true, std::sync::atomic::Ordering::SeqCst);

    let err = ImportService::new(db)
        .process_batch(request(vec![customer("C1")], 1, ImportStats::default()))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 500);
}
