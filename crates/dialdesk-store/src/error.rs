use dialdesk_core::{CoreError, DialRecordId};
use rusqlite::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sql(rusqlite::Error),
    #[error("store unavailable: {0}")]
    Unavailable(rusqlite::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid id string: {0}")]
    InvalidId(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("record {0} not found or not leased by this agent")]
    NotFoundOrNotOwned(DialRecordId),
    #[error("migration error: {0}")]
    Migration(String),
    #[error("invalid data path: {0}")]
    InvalidDataPath(PathBuf),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                StoreError::Unavailable(err)
            }
            _ => StoreError::Sql(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Io,
    Sql,
    Unavailable,
    Core,
    MissingHomeDir,
    InvalidId,
    NotFound,
    NotFoundOrNotOwned,
    Migration,
    InvalidDataPath,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Io(_) => StoreErrorKind::Io,
            StoreError::Sql(_) => StoreErrorKind::Sql,
            StoreError::Unavailable(_) => StoreErrorKind::Unavailable,
            StoreError::Core(_) => StoreErrorKind::Core,
            StoreError::MissingHomeDir => StoreErrorKind::MissingHomeDir,
            StoreError::InvalidId(_) => StoreErrorKind::InvalidId,
            StoreError::NotFound(_) => StoreErrorKind::NotFound,
            StoreError::NotFoundOrNotOwned(_) => StoreErrorKind::NotFoundOrNotOwned,
            StoreError::Migration(_) => StoreErrorKind::Migration,
            StoreError::InvalidDataPath(_) => StoreErrorKind::InvalidDataPath,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreError, StoreErrorKind};
    use rusqlite::ffi;

    fn sqlite_failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(code), None)
    }

    #[test]
    fn busy_and_locked_map_to_unavailable() {
        let busy: StoreError = sqlite_failure(ffi::SQLITE_BUSY).into();
        let locked: StoreError = sqlite_failure(ffi::SQLITE_LOCKED).into();
        assert_eq!(busy.kind(), StoreErrorKind::Unavailable);
        assert_eq!(locked.kind(), StoreErrorKind::Unavailable);
    }

    #[test]
    fn other_failures_stay_sql() {
        let err: StoreError = sqlite_failure(ffi::SQLITE_CONSTRAINT).into();
        assert_eq!(err.kind(), StoreErrorKind::Sql);
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err.kind(), StoreErrorKind::Sql);
    }
}
