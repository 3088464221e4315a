//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Read a `.env` file if present (`dotenvy`)
//! 2. Load from `MDSYNC_*` environment variables
//! 3. If a required variable is missing, fall back to a config file
//!
//! ## Environment Variables
//! Required: `MDSYNC_DB_PATH`, `MDSYNC_ERP_BASE_URL`.
//!
//! Optional: `MDSYNC_DB_POOL_SIZE`, `MDSYNC_DB_BUSY_TIMEOUT_MS`,
//! `MDSYNC_ERP_COMPANY_DB`, `MDSYNC_ERP_USERNAME`, `MDSYNC_ERP_PASSWORD`,
//! `MDSYNC_ERP_TIMEOUT_SECS`, `MDSYNC_ERP_ACCEPT_INVALID_CERTS`,
//! `MDSYNC_ERP_BP_QUERY`, `MDSYNC_ERP_ADDRESS_QUERY`,
//! `MDSYNC_SYNC_SERIALIZE_SCOPES`, `MDSYNC_SYNC_UPDATED_BY`,
//! `MDSYNC_IMPORT_MAX_BATCH_SIZE`, `MDSYNC_IMPORT_EXCESS_MANAGER_CHECK`,
//! `MDSYNC_CACHE_TTL_SECS`, `MDSYNC_CACHE_MAX_CAPACITY`, `MDSYNC_LOG_LEVEL`,
//! `MDSYNC_LOG_JSON`.
//!
//! ## File Locations
//! Probed in order, in the working directory and then next to the executable:
//! `config.toml`, `mdsync.toml`, `config.json`, `mdsync.json`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use mdsync_domain::{Config, ExcessManagerCheck, MdSyncError, Result};

const CONFIG_FILE_NAMES: [&str; 4] = ["config.toml", "mdsync.toml", "config.json", "mdsync.json"];

/// Load configuration, preferring the environment over files.
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from `MDSYNC_*` variables.
///
/// Unset optional variables keep their [`Config::default`] values.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.database.path = env_var("MDSYNC_DB_PATH")?;
    config.erp.base_url = env_var("MDSYNC_ERP_BASE_URL")?;

    if let Some(size) = env_parse::<u32>("MDSYNC_DB_POOL_SIZE")? {
        config.database.pool_size = size;
    }
    if let Some(timeout) = env_parse::<u64>("MDSYNC_DB_BUSY_TIMEOUT_MS")? {
        config.database.busy_timeout_ms = timeout;
    }

    if let Some(company_db) = env_opt("MDSYNC_ERP_COMPANY_DB") {
        config.erp.company_db = company_db;
    }
    if let Some(username) = env_opt("MDSYNC_ERP_USERNAME") {
        config.erp.username = username;
    }
    if let Some(password) = env_opt("MDSYNC_ERP_PASSWORD") {
        config.erp.password = password;
    }
    if let Some(timeout) = env_parse::<u64>("MDSYNC_ERP_TIMEOUT_SECS")? {
        config.erp.timeout_secs = timeout;
    }
    config.erp.accept_invalid_certs =
        env_bool("MDSYNC_ERP_ACCEPT_INVALID_CERTS", config.erp.accept_invalid_certs);
    if let Some(query) = env_opt("MDSYNC_ERP_BP_QUERY") {
        config.erp.partner_query = query;
    }
    if let Some(query) = env_opt("MDSYNC_ERP_ADDRESS_QUERY") {
        config.erp.address_query = query;
    }

    config.sync.serialize_scopes =
        env_bool("MDSYNC_SYNC_SERIALIZE_SCOPES", config.sync.serialize_scopes);
    if let Some(updated_by) = env_opt("MDSYNC_SYNC_UPDATED_BY") {
        config.sync.updated_by = updated_by;
    }

    if let Some(size) = env_parse::<usize>("MDSYNC_IMPORT_MAX_BATCH_SIZE")? {
        config.import.max_batch_size = size;
    }
    if let Some(check) = env_opt("MDSYNC_IMPORT_EXCESS_MANAGER_CHECK") {
        config.import.excess_manager_check = ExcessManagerCheck::from_str(&check)
            .map_err(|e| MdSyncError::Config(format!("Invalid excess manager check: {e}")))?;
    }

    if let Some(ttl) = env_parse::<u64>("MDSYNC_CACHE_TTL_SECS")? {
        config.cache.ttl_secs = ttl;
    }
    if let Some(capacity) = env_parse::<u64>("MDSYNC_CACHE_MAX_CAPACITY")? {
        config.cache.max_capacity = capacity;
    }

    if let Some(level) = env_opt("MDSYNC_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("MDSYNC_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file, probing the standard locations when
/// `path` is `None`. The format follows the extension (`.toml` or `.json`).
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MdSyncError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            MdSyncError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MdSyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MdSyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MdSyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MdSyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file in the working directory, then next to the
/// executable.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir);
    }

    probe_in(&dirs)
}

fn probe_in(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| MdSyncError::Config(format!("Missing required environment variable: {key}")))
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| MdSyncError::Config(format!("Invalid {key}: {e}")))
        })
        .transpose()
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
