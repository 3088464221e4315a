//! `mdsync` - headless entry point
//!
//! ```text
//! mdsync sync-partners <C|S>
//! mdsync sync-addresses <CardCode>
//! mdsync import <file.json>
//! mdsync health
//! ```
//!
//! Prints the JSON action envelope to stdout; logs go to stderr.

use std::str::FromStr;

use anyhow::{bail, Context, Result};
use mdsync_app::{actions, utils::logging::init_tracing, AppContext};
use mdsync_domain::{CardType, ImportBatchRequest};
use serde::Serialize;

const USAGE: &str = "usage: mdsync <sync-partners <C|S> | sync-addresses <CardCode> | import <file.json> | health>";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let config = mdsync_infra::config::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let ctx = AppContext::from_config(config).context("failed to initialise application context")?;
    tracing::info!(command = command.name(), "mdsync starting");

    let failed = match command {
        Command::SyncPartners(card_type) => {
            emit(&actions::sync_business_partners(&ctx, card_type).await)?
        }
        Command::SyncAddresses(card_code) => emit(&actions::sync_addresses(&ctx, &card_code).await)?,
        Command::Import(request) => emit(&actions::import_business_partners(&ctx, *request).await)?,
        Command::Health => {
            let health = ctx.health_check().await;
            let unhealthy = !health.is_healthy;
            print_json(&health)?;
            unhealthy
        }
    };

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

enum Command {
    SyncPartners(CardType),
    SyncAddresses(String),
    Import(Box<ImportBatchRequest>),
    Health,
}

impl Command {
    fn parse(args: &[String]) -> Result<Self> {
        match args {
            [cmd, card_type] if cmd == "sync-partners" => {
                let card_type = CardType::from_str(card_type)
                    .map_err(|err| anyhow::anyhow!("invalid card type {card_type:?}: {err}"))?;
                Ok(Self::SyncPartners(card_type))
            }
            [cmd, card_code] if cmd == "sync-addresses" => Ok(Self::SyncAddresses(card_code.clone())),
            [cmd, path] if cmd == "import" => {
                let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
                let request: ImportBatchRequest =
                    serde_json::from_str(&raw).with_context(|| format!("{path} is not a batch request"))?;
                Ok(Self::Import(Box::new(request)))
            }
            [cmd] if cmd == "health" => Ok(Self::Health),
            _ => bail!(USAGE),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::SyncPartners(_) => "sync-partners",
            Self::SyncAddresses(_) => "sync-addresses",
            Self::Import(_) => "import",
            Self::Health => "health",
        }
    }
}

/// Print an envelope and report whether it carries an error.
fn emit<T: Serialize>(envelope: &T) -> Result<bool> {
    let value = serde_json::to_value(envelope)?;
    let failed = value.get("error").and_then(serde_json::Value::as_bool).unwrap_or(false);
    print_json(&value)?;
    Ok(failed)
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
