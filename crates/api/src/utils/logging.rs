use std::time::Duration;

use mdsync_domain::{LoggingConfig, MdSyncError};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.level`. Calling this twice is harmless; the
/// second call leaves the first subscriber in place.
pub fn init_tracing(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Log the outcome of an action with structured fields.
///
/// `action` is one of the `ACTION_*` identifiers and must not carry user data.
#[inline]
pub fn log_action_execution(action: &str, elapsed: Duration, success: bool) {
    let duration_ms = elapsed.as_millis() as u64;

    if success {
        info!(action, duration_ms, "action_execution_success");
    } else {
        warn!(action, duration_ms, "action_execution_failure");
    }
}

/// Log why an action failed; the message itself goes back to the caller.
#[inline]
pub fn log_action_error(action: &str, error: &MdSyncError) {
    warn!(action, error_type = error.label(), status = error.status_code(), error = %error, "action_error");
}
