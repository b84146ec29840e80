use anyhow::Result;
use kartei_config::AppConfig;
use kartei_store::Store;
use serde::Serialize;

pub mod backup;
pub mod completions;
pub mod contacts;
pub mod import;
pub mod labels;
pub mod locations;
pub mod serve;

/// Shared handle passed to every store-backed command.
pub struct Context<'a> {
    pub store: &'a Store,
    pub json: bool,
    pub config: &'a AppConfig,
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
