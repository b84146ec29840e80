mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{backup, completions, contacts, import, labels, locations, serve, Context};
use crate::error::{exit_code_for, report_error};
use kartei_config as config;
use kartei_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "kartei", version, about = "tattoo studio contact management")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a contact
    #[command(name = "add-contact")]
    AddContact(contacts::AddContactArgs),
    Show(contacts::ShowArgs),
    List(contacts::ListArgs),
    Delete(contacts::DeleteArgs),
    #[command(subcommand)]
    Label(labels::LabelCommand),
    #[command(subcommand)]
    Location(locations::LocationCommand),
    /// Preview or apply a spreadsheet import
    #[command(subcommand)]
    Import(import::ImportCommand),
    Backup(backup::BackupArgs),
    /// Run the HTTP API server
    Serve(serve::ServeArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    // Serve and completions manage their own setup; everything else gets an
    // opened, migrated store.
    match command {
        Command::Serve(args) => serve::serve(db_path, config_path, args),
        Command::Completions(args) => completions::emit(args),
        command => {
            let app_config = load_app_config(config_path, verbose)?;
            let store = open_store(db_path, &app_config, verbose)?;
            let ctx = Context {
                store: &store,
                json,
                config: &app_config,
            };
            dispatch(&ctx, command)
        }
    }
}

fn dispatch(ctx: &Context<'_>, command: Command) -> Result<()> {
    match command {
        Command::AddContact(args) => contacts::add_contact(ctx, args),
        Command::Show(args) => contacts::show_contact(ctx, args),
        Command::List(args) => contacts::list_contacts(ctx, args),
        Command::Delete(args) => contacts::delete_contact(ctx, args),
        Command::Label(cmd) => match cmd {
            labels::LabelCommand::Ls(args) => labels::list_labels(ctx, args),
        },
        Command::Location(cmd) => match cmd {
            locations::LocationCommand::Ls(args) => locations::list_locations(ctx, args),
        },
        Command::Import(cmd) => match cmd {
            import::ImportCommand::Preview(args) => import::preview_sheet(ctx, args),
            import::ImportCommand::Confirm(args) => import::confirm_sheet(ctx, args),
        },
        Command::Backup(args) => backup::backup(ctx, args),
        Command::Serve(_) | Command::Completions(_) => {
            unreachable!("dispatched before the store opens")
        }
    }
}

fn load_app_config(config_path: Option<PathBuf>, verbose: bool) -> Result<config::AppConfig> {
    let app_config = config::load(config_path.clone()).with_context(|| "read configuration")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) if path.exists() => debug!(path = %path.display(), "using config"),
            Ok(path) => debug!(path = %path.display(), "no config file, defaults in effect"),
            Err(err) => debug!(error = %err, "config path unavailable"),
        }
    }
    Ok(app_config)
}

fn open_store(
    db_path: Option<PathBuf>,
    app_config: &config::AppConfig,
    verbose: bool,
) -> Result<Store> {
    let db_path = paths::resolve_db_path(db_path.or_else(|| app_config.db_path.clone()))
        .with_context(|| "locate database")?;
    if verbose {
        debug!(path = %db_path.display(), "database path resolved");
    }
    let store = Store::open(&db_path).with_context(|| format!("open {}", db_path.display()))?;
    store.migrate().with_context(|| "apply migrations")?;
    Ok(store)
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}
