//! SAP Business One Service Layer client
//!
//! Runs named SQL queries (`SQLQueries('<code>')/List`) on behalf of the
//! reconciler. The session is opened lazily and reopened once when the
//! Service Layer answers `401`. Query failures are never retried.

use std::time::Duration;

use async_trait::async_trait;
use mdsync_core::{ErpQuery, ErpQueryPort};
use mdsync_domain::{ErpConfig, MdSyncError, Result};
use parking_lot::Mutex;
use reqwest::header::COOKIE;
use reqwest::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::errors::{SapError, SapErrorCategory};
use crate::http::HttpClient;

/// Upper bound on followed `nextLink`s for one query.
const MAX_PAGES: usize = 10_000;

#[derive(Serialize)]
struct LoginRequest<'a> {
    #[serde(rename = "CompanyDB")]
    company_db: &'a str,
    #[serde(rename = "UserName")]
    user_name: &'a str,
    #[serde(rename = "Password")]
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(rename = "SessionId")]
    session_id: String,
}

#[derive(Deserialize)]
struct QueryPage {
    #[serde(default)]
    value: Vec<Value>,
    #[serde(rename = "odata.nextLink", alias = "@odata.nextLink", default)]
    next_link: Option<String>,
}

/// Service Layer error body: `{ "error": { "code": .., "message": { "value": .. } } }`
#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<ErrorMessage>,
}

#[derive(Deserialize)]
struct ErrorMessage {
    #[serde(default)]
    value: String,
}

/// Sent on every Service Layer request.
pub const USER_AGENT: &str = concat!("mdsync/", env!("CARGO_PKG_VERSION"));

/// Named-query client implementing [`ErpQueryPort`]
pub struct ServiceLayerClient {
    base_url: Url,
    company_db: String,
    username: String,
    password: String,
    http_client: HttpClient,
    session: Mutex<Option<String>>,
}

impl ServiceLayerClient {
    pub fn from_config(config: &ErpConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Self::with_http_client(config, http_client)
    }

    pub fn with_http_client(config: &ErpConfig, http_client: HttpClient) -> Result<Self> {
        Ok(Self {
            base_url: service_root(&config.base_url)?,
            company_db: config.company_db.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            http_client,
            session: Mutex::new(None),
        })
    }

    /// Open a session if none is cached.
    pub async fn ensure_session(&self) -> std::result::Result<String, SapError> {
        let cached = self.session.lock().clone();
        match cached {
            Some(session) => Ok(session),
            None => self.login().await,
        }
    }

    /// Succeeds when the configured credentials open a session.
    pub async fn health_check(&self) -> Result<()> {
        self.ensure_session().await.map(|_| ()).map_err(MdSyncError::from)
    }

    async fn login(&self) -> std::result::Result<String, SapError> {
        let url = self.endpoint("Login")?;
        let body = LoginRequest {
            company_db: &self.company_db,
            user_name: &self.username,
            password: &self.password,
        };

        let response = self
            .http_client
            .send(self.http_client.request(Method::POST, url).json(&body))
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;

        let login: LoginResponse = response.json().await.map_err(SapError::from)?;
        *self.session.lock() = Some(login.session_id.clone());

        info!(company_db = %self.company_db, "erp.session_opened");
        Ok(login.session_id)
    }

    async fn fetch_page(&self, url: &Url) -> std::result::Result<QueryPage, SapError> {
        let session = self.ensure_session().await?;
        let response = self.get_with_session(url, &session).await?;

        let response = if response.status() == StatusCode::UNAUTHORIZED {
            warn!("erp.session_expired");
            self.session.lock().take();
            let session = self.login().await?;
            self.get_with_session(url, &session).await?
        } else {
            response
        };

        let response = check_status(response).await?;
        response.json::<QueryPage>().await.map_err(SapError::from)
    }

    async fn get_with_session(&self, url: &Url, session: &str) -> std::result::Result<Response, SapError> {
        let request = self
            .http_client
            .request(Method::GET, url.clone())
            .header(COOKIE, format!("B1SESSION={session}"));
        self.http_client.send(request).await.map_err(transport_error)
    }

    /// `SQLQueries('<code>')/List?ParamList=<filter>`
    fn query_url(&self, query: &ErpQuery) -> std::result::Result<Url, SapError> {
        let code = query.code.replace('\'', "''");
        let mut path = format!("SQLQueries('{}')/List", urlencoding::encode(&code));
        if !query.filter.is_empty() {
            path.push_str("?ParamList=");
            path.push_str(&urlencoding::encode(&query.filter));
        }
        self.endpoint(&path)
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, SapError> {
        self.base_url.join(path).map_err(|err| {
            SapError::new(SapErrorCategory::Validation, "invalid Service Layer URL").with_context(err.to_string())
        })
    }

    async fn run(&self, query: &ErpQuery) -> std::result::Result<Vec<Value>, SapError> {
        let mut url = self.query_url(query)?;
        let mut rows = Vec::new();

        for page in 1..=MAX_PAGES {
            let QueryPage { value, next_link } = self.fetch_page(&url).await?;
            debug!(query = %query.code, page, rows = value.len(), "erp.page_fetched");
            rows.extend(value);

            match next_link {
                Some(link) if !link.is_empty() => url = self.endpoint(&link)?,
                _ => return Ok(rows),
            }
        }

        Err(SapError::unknown(format!("query {} exceeded {MAX_PAGES} pages", query.code)))
    }
}

#[async_trait]
impl ErpQueryPort for ServiceLayerClient {
    async fn run_query(&self, query: &ErpQuery) -> Result<Vec<Value>> {
        match self.run(query).await {
            Ok(rows) => {
                info!(query = %query.code, rows = rows.len(), "erp.query_complete");
                Ok(rows)
            }
            Err(err) => {
                warn!(query = %query.code, error = %err, "erp.query_failed");
                Err(err.into())
            }
        }
    }
}

/// The base URL is a directory; `join` must append to it.
fn service_root(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim();
    let with_slash =
        if trimmed.ends_with('/') { trimmed.to_string() } else { format!("{trimmed}/") };
    Url::parse(&with_slash)
        .map_err(|err| MdSyncError::Config(format!("invalid ERP base URL {base_url:?}: {err}")))
}

async fn check_status(response: Response) -> std::result::Result<Response, SapError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.error.message)
        .map(|message| message.value)
        .filter(|value| !value.is_empty());

    let err = SapError::from_status_code(status);
    Err(match detail {
        Some(detail) => err.with_context(detail),
        None => err,
    })
}

fn transport_error(err: MdSyncError) -> SapError {
    let category = match &err {
        MdSyncError::Network(message) if message.contains("timed out") => SapErrorCategory::NetworkTimeout,
        MdSyncError::Network(_) => SapErrorCategory::NetworkOffline,
        _ => SapErrorCategory::Unknown,
    };
    SapError::new(category, err.to_string())
}
