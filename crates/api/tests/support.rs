//! Shared fixtures for action-level tests.

#![allow(dead_code)]

use mdsync_app::AppContext;
use mdsync_domain::{Config, DatabaseConfig, ErpConfig, SyncConfig};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PARTNER_QUERY_PATH: &str = "/b1s/v1/SQLQueries('BP_MASTER')/List";
pub const ADDRESS_QUERY_PATH: &str = "/b1s/v1/SQLQueries('BP_ADDRESSES')/List";

/// An application context over a throwaway database and a mocked Service Layer.
pub struct TestApp {
    pub ctx: AppContext,
    pub server: MockServer,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().expect("temp dir should be created");

        let config = Config {
            database: DatabaseConfig {
                path: temp_dir.path().join("mdsync-app.db").to_string_lossy().into_owned(),
                pool_size: 4,
                ..DatabaseConfig::default()
            },
            erp: ErpConfig {
                base_url: format!("{}/b1s/v1", server.uri()),
                company_db: "SBODEMO".into(),
                username: "manager".into(),
                password: "secret".into(),
                timeout_secs: 5,
                ..ErpConfig::default()
            },
            sync: SyncConfig { serialize_scopes: true, updated_by: "tests".into() },
            ..Config::default()
        };

        let ctx = AppContext::from_config(config).expect("context should initialise");
        Self { ctx, server, _temp_dir: temp_dir }
    }

    pub async fn mount_login(&self) {
        Mock::given(method("POST"))
            .and(path("/b1s/v1/Login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "SessionId": "session-1" })))
            .mount(&self.server)
            .await;
    }

    /// Serve `rows` for the customer partner query, at most `times` times.
    pub async fn mount_customers(&self, rows: Vec<Value>, times: u64) {
        Mock::given(method("GET"))
            .and(path(PARTNER_QUERY_PATH))
            .and(query_param("ParamList", "CardType='C'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": rows })))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_addresses(&self, card_code: &str, rows: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(ADDRESS_QUERY_PATH))
            .and(query_param("ParamList", format!("CardCode='{card_code}'")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": rows })))
            .mount(&self.server)
            .await;
    }
}

pub fn erp_partner(code: &str, created: &str, updated: &str) -> Value {
    json!({
        "CardCode": code,
        "CardName": format!("{code} name"),
        "CardType": "C",
        "CreateDate": created,
        "UpdateDate": updated,
    })
}

pub fn erp_address(name: &str, card_code: &str, addr_type: &str) -> Value {
    json!({
        "address": name,
        "CardCode": card_code,
        "AdresType": addr_type,
        "City": "Hamburg",
        "CreateDate": "20240101",
        "UpdateDate": "20240101",
    })
}
