//! Conversions from external infrastructure errors into domain errors.

use mdsync_domain::MdSyncError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub MdSyncError);

impl From<InfraError> for MdSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<MdSyncError> for InfraError {
    fn from(value: MdSyncError) -> Self {
        InfraError(value)
    }
}

trait IntoMdSyncError {
    fn into_mdsync(self) -> MdSyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → MdSyncError */
/* -------------------------------------------------------------------------- */

impl IntoMdSyncError for SqlError {
    fn into_mdsync(self) -> MdSyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => MdSyncError::Database("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        MdSyncError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        MdSyncError::Database(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        MdSyncError::Database("foreign key constraint violation".into())
                    }
                    _ => MdSyncError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => MdSyncError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                MdSyncError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                MdSyncError::Database(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => {
                MdSyncError::Database(format!("invalid database path: {}", path.to_string_lossy()))
            }
            other => MdSyncError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_mdsync())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → MdSyncError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(MdSyncError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → MdSyncError */
/* -------------------------------------------------------------------------- */

impl IntoMdSyncError for HttpError {
    fn into_mdsync(self) -> MdSyncError {
        if self.is_timeout() {
            return MdSyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return MdSyncError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => MdSyncError::Auth(message),
                404 => MdSyncError::NotFound(message),
                400..=499 if code != 429 => MdSyncError::InvalidInput(message),
                _ => MdSyncError::Network(message),
            };
        }

        if self.is_decode() {
            return MdSyncError::Network(format!("invalid response body: {self}"));
        }

        MdSyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_mdsync())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → MdSyncError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(MdSyncError::Internal(format!("JSON error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
