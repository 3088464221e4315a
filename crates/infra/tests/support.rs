//! Shared fixtures for infra integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use mdsync_domain::ErpConfig;
use mdsync_infra::database::DbManager;
use mdsync_infra::integrations::sap::ServiceLayerClient;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SESSION_ID: &str = "session-1";

/// Migrated throwaway database; the directory lives as long as this value.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let manager = DbManager::new(temp_dir.path().join("mdsync-test.db"), 4)
            .expect("db manager should be created");
        manager.run_migrations().expect("migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }
}

pub fn erp_config(server: &MockServer) -> ErpConfig {
    ErpConfig {
        base_url: format!("{}/b1s/v1", server.uri()),
        company_db: "SBODEMO".into(),
        username: "manager".into(),
        password: "secret".into(),
        timeout_secs: 5,
        ..ErpConfig::default()
    }
}

pub fn sap_client(server: &MockServer) -> Arc<ServiceLayerClient> {
    Arc::new(ServiceLayerClient::from_config(&erp_config(server)).expect("client should build"))
}

pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/b1s/v1/Login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "SessionId": SESSION_ID, "SessionTimeout": 30 })),
        )
        .mount(server)
        .await;
}

pub fn page(rows: Vec<Value>) -> Value {
    json!({ "value": rows })
}

pub fn erp_partner(code: &str, card_type: &str, created: &str, updated: &str) -> Value {
    json!({
        "CardCode": code,
        "CardName": format!("{code} name"),
        "CardType": card_type,
        "CreateDate": created,
        "UpdateDate": updated,
    })
}

pub fn erp_address(name: &str, card_code: &str, addr_type: &str, updated: &str) -> Value {
    json!({
        "address": name,
        "CardCode": card_code,
        "AdresType": addr_type,
        "City": "Berlin",
        "CreateDate": "20240101",
        "UpdateDate": updated,
    })
}
