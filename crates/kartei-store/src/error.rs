use kartei_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no such record: {0}")]
    NotFound(String),
    #[error("not a valid id: {0}")]
    InvalidId(String),
    #[error("phone number already registered: {0}")]
    DuplicatePhone(String),
    #[error("backup target overlaps the live database: {0}")]
    InvalidBackupPath(PathBuf),
    #[error("unusable data path: {0}")]
    InvalidDataPath(PathBuf),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error("home directory could not be determined")]
    MissingHomeDir,
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Payload-free mirror of [`StoreError`], for callers that route on the
/// variant alone (exit codes, HTTP statuses).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    NotFound,
    InvalidId,
    DuplicatePhone,
    InvalidBackupPath,
    InvalidDataPath,
    Migration,
    MissingHomeDir,
    Core,
    Sql,
    Io,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::NotFound(_) => StoreErrorKind::NotFound,
            StoreError::InvalidId(_) => StoreErrorKind::InvalidId,
            StoreError::DuplicatePhone(_) => StoreErrorKind::DuplicatePhone,
            StoreError::InvalidBackupPath(_) => StoreErrorKind::InvalidBackupPath,
            StoreError::InvalidDataPath(_) => StoreErrorKind::InvalidDataPath,
            StoreError::Migration(_) => StoreErrorKind::Migration,
            StoreError::MissingHomeDir => StoreErrorKind::MissingHomeDir,
            StoreError::Core(_) => StoreErrorKind::Core,
            StoreError::Sql(_) => StoreErrorKind::Sql,
            StoreError::Io(_) => StoreErrorKind::Io,
        }
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    let rusqlite::Error::SqliteFailure(failure, _) = err else {
        return false;
    };
    failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
}
