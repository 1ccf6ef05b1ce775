//! Config inspection and initialisation

use anyhow::{Context, Result, bail};
use colored::*;

use super::ConfigCommands;
use crate::config::{Settings, config_path};

pub async fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            let path = config_path()?;
            let note = if path.exists() { "" } else { " (not created yet)" };
            println!("{}{}", path.display(), note.dimmed());
        }
        ConfigCommands::Show => {
            let settings = masked(&crate::global_config()?.settings);
            let rendered =
                toml::to_string_pretty(&settings).context("Failed to render settings")?;
            println!("{}", rendered.trim_end());
        }
        ConfigCommands::Validate => {
            crate::global_config()?.settings.validate()?;
            println!("{}", "Configuration is complete".green());
        }
        ConfigCommands::Init { force } => {
            let path = config_path()?;
            if path.exists() && !force {
                bail!("{} already exists; pass --force to overwrite", path.display());
            }
            Settings::default().save_to(&path)?;
            println!("Wrote {}", path.display().to_string().bright_green());
        }
    }
    Ok(())
}

/// Copy of `settings` safe to print
fn masked(settings: &Settings) -> Settings {
    let mut copy = settings.clone();
    for secret in [
        &mut copy.google.client_secret,
        &mut copy.google.refresh_token,
        &mut copy.upload.secret,
    ] {
        if !secret.is_empty() {
            *secret = "***".to_string();
        }
    }
    copy
}
