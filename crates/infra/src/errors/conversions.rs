//! Conversions from external infrastructure errors into domain errors.

use dayline_common::storage::StorageError;
use dayline_common::CommonError;
use dayline_domain::DaylineError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DaylineError);

impl From<InfraError> for DaylineError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DaylineError> for InfraError {
    fn from(value: DaylineError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoDaylineError {
    fn into_dayline(self) -> DaylineError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → DaylineError */
/* -------------------------------------------------------------------------- */

impl IntoDaylineError for SqlError {
    fn into_dayline(self) -> DaylineError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => DaylineError::Database("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        DaylineError::Database("database is locked".into())
                    }
                    ErrorCode::ConstraintViolation => {
                        DaylineError::Database(format!("constraint violation: {message}"))
                    }
                    _ => DaylineError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => DaylineError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                DaylineError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                DaylineError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => DaylineError::Database("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidQuery => DaylineError::Database("invalid SQL query".into()),
            other => DaylineError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_dayline())
    }
}

/* -------------------------------------------------------------------------- */
/* StorageError → DaylineError */
/* -------------------------------------------------------------------------- */

impl IntoDaylineError for StorageError {
    fn into_dayline(self) -> DaylineError {
        match self {
            StorageError::Rusqlite(inner) => inner.into_dayline(),
            StorageError::Timeout(secs) => {
                DaylineError::Database(format!("connection timeout after {secs}s"))
            }
            other => DaylineError::Database(other.to_string()),
        }
    }
}

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        InfraError(value.into_dayline())
    }
}

/* -------------------------------------------------------------------------- */
/* CommonError → DaylineError */
/* -------------------------------------------------------------------------- */

impl IntoDaylineError for CommonError {
    fn into_dayline(self) -> DaylineError {
        match self {
            CommonError::InvalidKey(msg) => DaylineError::CryptoKey(msg),
            CommonError::Encryption(msg) => DaylineError::Encryption(msg),
            CommonError::Decryption(msg) => DaylineError::Decryption(msg),
            CommonError::Crypto(msg) | CommonError::Serialization(msg) => {
                DaylineError::Internal(msg)
            }
        }
    }
}

impl From<CommonError> for InfraError {
    fn from(value: CommonError) -> Self {
        InfraError(value.into_dayline())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → DaylineError */
/* -------------------------------------------------------------------------- */

impl IntoDaylineError for HttpError {
    fn into_dayline(self) -> DaylineError {
        if self.is_timeout() {
            return DaylineError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return DaylineError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return DaylineError::InvalidUrl(self.to_string());
        }

        if self.is_decode() {
            return DaylineError::Parse(format!("failed to decode response body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message = status.canonical_reason().unwrap_or("unknown status").to_string();

            return match code {
                401 | 403 => DaylineError::AuthRequired(format!("HTTP {code} {message}")),
                404 => DaylineError::NotFound(format!("HTTP {code} {message}")),
                _ => DaylineError::Api { status: code, message },
            };
        }

        DaylineError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_dayline())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use rusqlite::ffi::{Error as FfiError, ErrorCode};
    use rusqlite::Error as SqlError;

    use super::*;

    #[test]
    fn sqlite_busy_maps_to_database_error() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        let mapped: DaylineError = InfraError::from(err).into();
        match mapped {
            DaylineError::Database(msg) => {
                assert!(msg.contains("busy") || msg.contains("locked"));
            }
            other => panic!("expected database error, got {other:?}"),
        }
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let mapped: DaylineError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(mapped, DaylineError::NotFound(_)));
    }

    #[test]
    fn decryption_failure_keeps_its_kind() {
        let mapped: DaylineError =
            InfraError::from(CommonError::Decryption("tag mismatch".into())).into();
        assert!(matches!(mapped, DaylineError::Decryption(_)));
    }

    #[test]
    fn invalid_key_maps_to_crypto_key() {
        let mapped: DaylineError =
            InfraError::from(CommonError::InvalidKey("bad length".into())).into();
        assert!(matches!(mapped, DaylineError::CryptoKey(_)));
    }
}
