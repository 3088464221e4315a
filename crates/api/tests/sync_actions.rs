//! Reconciliation actions end to end: mocked ERP, real SQLite store.

mod support;

use chrono::{TimeZone, Utc};
use mdsync_app::actions;
use mdsync_core::{PartnerRepository, SyncMetaRepository};
use mdsync_domain::{CardType, ReconcileMode, Source, SyncMeta, SyncScope, SyncStatus};
use mdsync_infra::{SqliteBusinessPartnerRepository, SqliteSyncMetaRepository};
use support::{erp_address, erp_partner, TestApp, PARTNER_QUERY_PATH};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test(flavor = "multi_thread")]
async fn first_sync_copies_c100_and_creates_checkpoint() {
    let app = TestApp::start().await;
    app.mount_login().await;
    app.mount_customers(vec![erp_partner("C100", "20240101", "20240101")], 1).await;
    let started = Utc::now();

    let result = actions::sync_business_partners(&app.ctx, CardType::Customer).await;

    assert!(!result.is_error(), "sync failed: {}", result.message());
    assert_eq!(result.action(), Some("sync-business-partners"));
    let report = result.data().unwrap();
    assert_eq!(report.mode, ReconcileMode::Bootstrap);
    assert_eq!(report.written, 1);

    let partners = SqliteBusinessPartnerRepository::new(app.ctx.db.clone());
    let c100 = partners.find_partner("C100").await.unwrap().unwrap();
    assert_eq!(c100.provenance.source, Source::Sap);
    assert_eq!(c100.provenance.sync_status, SyncStatus::Synced);

    let checkpoints = SqliteSyncMetaRepository::new(app.ctx.db.clone());
    let meta = checkpoints.find_by_code("C").await.unwrap().unwrap();
    assert!(meta.last_sync_at >= started - chrono::Duration::seconds(1));
    assert_eq!(meta.updated_by, "tests");
}

#[tokio::test(flavor = "multi_thread")]
async fn later_sync_only_writes_rows_changed_after_checkpoint() {
    let app = TestApp::start().await;
    app.mount_login().await;
    app.mount_customers(vec![erp_partner("C100", "20240101", "20240101")], 1).await;
    assert!(!actions::sync_business_partners(&app.ctx, CardType::Customer).await.is_error());

    let checkpoints = SqliteSyncMetaRepository::new(app.ctx.db.clone());
    let june = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let scope = SyncScope::Partners(CardType::Customer);
    checkpoints.upsert(&SyncMeta::for_scope(&scope, june, "tests")).await.unwrap();

    let mut renamed = erp_partner("C100", "20240101", "20240701");
    renamed["CardName"] = "C100 renamed".into();
    app.mount_customers(vec![renamed, erp_partner("C200", "20240101", "20240501")], 10).await;

    let result = actions::sync_business_partners(&app.ctx, CardType::Customer).await;
    let report = result.data().unwrap();
    assert_eq!(report.mode, ReconcileMode::Incremental);
    assert_eq!(report.fetched, 2);
    assert_eq!(report.written, 1);
    assert_eq!(report.previous_checkpoint, june);

    let partners = SqliteBusinessPartnerRepository::new(app.ctx.db.clone());
    assert_eq!(partners.find_partner("C100").await.unwrap().unwrap().card_name, "C100 renamed");
    assert!(partners.find_partner("C200").await.unwrap().is_none());

    // Nothing new upstream: no writes, checkpoint still moves.
    let before = checkpoints.find_by_code("C").await.unwrap().unwrap().last_sync_at;
    let again = actions::sync_business_partners(&app.ctx, CardType::Customer).await;
    assert_eq!(again.data().unwrap().written, 0);
    let after = checkpoints.find_by_code("C").await.unwrap().unwrap().last_sync_at;
    assert!(after >= before);
}

#[tokio::test(flavor = "multi_thread")]
async fn erp_outage_is_a_503_envelope_and_keeps_checkpoint() {
    let app = TestApp::start().await;
    app.mount_login().await;
    Mock::given(method("GET"))
        .and(path(PARTNER_QUERY_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.server)
        .await;

    let result = actions::sync_business_partners(&app.ctx, CardType::Customer).await;

    assert!(result.is_error());
    assert_eq!(result.status(), 503);
    assert_eq!(result.action(), Some("sync-business-partners"));

    let checkpoints = SqliteSyncMetaRepository::new(app.ctx.db.clone());
    assert!(checkpoints.find_by_code("C").await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn cached_partner_list_is_refreshed_by_sync() {
    let app = TestApp::start().await;
    app.mount_login().await;

    let empty = actions::list_business_partners(&app.ctx, CardType::Customer).await;
    assert_eq!(empty.data().map(Vec::len), Some(0));

    app.mount_customers(vec![erp_partner("C100", "20240101", "20240101")], 1).await;
    assert!(!actions::sync_business_partners(&app.ctx, CardType::Customer).await.is_error());

    let listed = actions::list_business_partners(&app.ctx, CardType::Customer).await;
    let codes: Vec<_> = listed.data().unwrap().iter().map(|p| p.card_code.clone()).collect();
    assert_eq!(codes, vec!["C100".to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn address_sync_mirrors_one_partner() {
    let app = TestApp::start().await;
    app.mount_login().await;
    app.mount_addresses("C100", vec![erp_address("Bill To", "C100", "B"), erp_address("Ship To", "C100", "S")])
        .await;

    let result = actions::sync_addresses(&app.ctx, "C100").await;

    assert!(!result.is_error(), "sync failed: {}", result.message());
    assert_eq!(result.action(), Some("sync-addresses"));
    assert_eq!(result.data().unwrap().written, 2);

    let listed = actions::list_addresses(&app.ctx, "C100").await;
    assert_eq!(listed.data().map(Vec::len), Some(2));
}

#[tokio::test(flavor = "multi_thread")]
async fn address_sync_requires_card_code() {
    let app = TestApp::start().await;

    let result = actions::sync_addresses(&app.ctx, "  ").await;

    assert!(result.is_error());
    assert_eq!(result.status(), 400);
    assert_eq!(app.server.received_requests().await.map(|r| r.len()), Some(0));
}
