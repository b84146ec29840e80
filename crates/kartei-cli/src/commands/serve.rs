use anyhow::{Context as _, Result};
use clap::Args;
use kartei_api::AppState;
use kartei_config as config;
use kartei_store::{paths, Store};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub listen: Option<SocketAddr>,
}

/// The server owns the store for its whole lifetime, so this runs before the
/// shared command `Context` is built.
pub fn serve(
    db_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    args: ServeArgs,
) -> Result<()> {
    let app_config = config::load(config_path).with_context(|| "load config")?;
    let db_path = paths::resolve_db_path(db_path.or_else(|| app_config.db_path.clone()))
        .with_context(|| "resolve database path")?;
    let store =
        Store::open(&db_path).with_context(|| format!("open database {}", db_path.display()))?;
    store.migrate().with_context(|| "run migrations")?;

    let addr = args.listen.unwrap_or(app_config.server.listen_addr);
    let state = AppState::new(
        store,
        app_config.server.auth_token.clone(),
        app_config.country_code.clone(),
    );

    let runtime = Runtime::new().with_context(|| "start async runtime")?;
    runtime
        .block_on(kartei_api::serve(state, addr))
        .with_context(|| format!("serve api on {addr}"))?;
    Ok(())
}
