//! inventory-cli
//!
//! Manages product images for an inventory kept in a spreadsheet: rows are read
//! through the sheets API, images live in an upload service and every change is
//! authorised by an identity provider.

mod api;
mod cli;
mod config;
mod services;
mod tui;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use is_terminal::IsTerminal;
use once_cell::sync::OnceCell;

use api::ClientManager;
use cli::{Cli, Commands};
use config::Config;

static CONFIG: OnceCell<Config> = OnceCell::new();
static CLIENTS: OnceCell<ClientManager> = OnceCell::new();

/// Process-wide configuration, available once `main` has loaded it
pub fn global_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| anyhow!("Configuration has not been loaded"))
}

/// Service clients, built from the settings on first use
pub fn client_manager() -> Result<&'static ClientManager> {
    CLIENTS.get_or_try_init(|| ClientManager::from_settings(&global_config()?.settings))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    init_logging(cli.verbose, matches!(cli.command, Commands::Tui))?;

    let config = Config::load().await?;
    if CONFIG.set(config).is_err() {
        return Err(anyhow!("Configuration loaded twice"));
    }

    match cli.command {
        Commands::List(args) => cli::commands::inventory::handle_list_command(args).await,
        Commands::Show(args) => cli::commands::inventory::handle_show_command(args).await,
        Commands::Image(command) => cli::commands::image::handle_image_command(command).await,
        Commands::Auth(command) => cli::commands::auth::handle_auth_command(command).await,
        Commands::Config(command) => cli::commands::config::handle_config_command(command).await,
        Commands::Tui => tui::run().await,
    }
}

/// `RUST_LOG` wins over the defaults; the TUI logs to a file so the screen stays clean
fn init_logging(verbose: bool, to_file: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if to_file {
        let path = config::log_path()?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}
