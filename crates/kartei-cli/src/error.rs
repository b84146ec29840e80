use anyhow::Error;
use kartei_config::ConfigError;
use kartei_core::CoreError;
use kartei_import::ImportError;
use kartei_store::error::{StoreError, StoreErrorKind};
use std::process::ExitCode;
use thiserror::Error as ThisError;

/// 2 is reserved for lookups that found nothing, 3 for rejected input.
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    CliError::NotFound(message.into()).into()
}

// {:#} prints the whole context chain on one line.
pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {err:#}");
    } else {
        eprintln!("error: {err}");
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    ExitCode::from(code_for(err))
}

/// Walks the cause chain so codes survive `anyhow` context wrapping.
fn code_for(err: &Error) -> u8 {
    err.chain().find_map(classify).unwrap_or(EXIT_FAILURE)
}

fn classify(cause: &(dyn std::error::Error + 'static)) -> Option<u8> {
    if let Some(err) = cause.downcast_ref::<CliError>() {
        return Some(match err {
            CliError::InvalidInput(_) => EXIT_INVALID_INPUT,
            CliError::NotFound(_) => EXIT_NOT_FOUND,
        });
    }
    if let Some(err) = cause.downcast_ref::<StoreError>() {
        return Some(store_exit_code(err));
    }
    if let Some(err) = cause.downcast_ref::<ConfigError>() {
        return Some(config_exit_code(err));
    }
    if let Some(err) = cause.downcast_ref::<ImportError>() {
        return Some(import_exit_code(err));
    }
    cause
        .downcast_ref::<CoreError>()
        .map(|_| EXIT_INVALID_INPUT)
}

fn store_exit_code(err: &StoreError) -> u8 {
    match err.kind() {
        StoreErrorKind::NotFound => EXIT_NOT_FOUND,
        StoreErrorKind::InvalidId
        | StoreErrorKind::DuplicatePhone
        | StoreErrorKind::InvalidBackupPath
        | StoreErrorKind::InvalidDataPath
        | StoreErrorKind::Core => EXIT_INVALID_INPUT,
        StoreErrorKind::Migration
        | StoreErrorKind::MissingHomeDir
        | StoreErrorKind::Sql
        | StoreErrorKind::Io => EXIT_FAILURE,
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidCountryCode(_)
        | ConfigError::InvalidChunkSize(_)
        | ConfigError::InvalidListenAddr(_)
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}

fn import_exit_code(err: &ImportError) -> u8 {
    match err {
        ImportError::Csv(_) => EXIT_INVALID_INPUT,
        ImportError::Store(inner) => store_exit_code(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_survives_context_wrapping() {
        let err =
            anyhow::Error::from(StoreError::NotFound("+491512345678".into())).context("show");
        assert_eq!(code_for(&err), EXIT_NOT_FOUND);
    }

    #[test]
    fn duplicate_phone_rejects_as_invalid_input() {
        let err = anyhow::Error::from(StoreError::DuplicatePhone("+491512345678".into()));
        assert_eq!(code_for(&err), EXIT_INVALID_INPUT);
    }

    #[test]
    fn unclassified_errors_fall_back_to_generic_failure() {
        assert_eq!(code_for(&anyhow::anyhow!("boom")), EXIT_FAILURE);
    }
}
