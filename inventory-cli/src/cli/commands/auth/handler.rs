//! Session login, logout and status

use anyhow::{Context, Result, bail};
use colored::*;

use super::AuthCommands;
use crate::api::identity::{IdentityClient, IdentityProvider, SessionToken};
use crate::api::manager::build_http_client;
use crate::config::Config;

pub async fn handle_auth_command(command: AuthCommands) -> Result<()> {
    let config = crate::global_config()?;
    match command {
        AuthCommands::Login { token } => login(config, token).await,
        AuthCommands::Logout => logout(config).await,
        AuthCommands::Status => status(config).await,
    }
}

fn identity_client(config: &Config) -> Result<IdentityClient> {
    let api_url = &config.settings.identity.api_url;
    if api_url.trim().is_empty() {
        bail!("identity.api_url is not configured (set IDENTITY_API_URL)");
    }
    let http = build_http_client(&config.settings)?;
    Ok(IdentityClient::new(http, api_url))
}

async fn login(config: &Config, token: Option<String>) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => rpassword::prompt_password("Session token: ")
            .context("Failed to read session token")?,
    };
    let token = token.trim();
    if token.is_empty() {
        bail!("Session token cannot be empty");
    }
    let token = SessionToken::new(token);

    let identity = identity_client(config)?;
    let Some(user) = identity.verify(&token).await? else {
        bail!("The identity provider rejected this session token");
    };

    config.save_session(&token, &user).await?;
    log::info!("Stored session for {}", user);
    println!("Signed in as {}", user.to_string().bright_green().bold());
    Ok(())
}

async fn logout(config: &Config) -> Result<()> {
    if config.clear_session().await? {
        println!("Signed out");
    } else {
        println!("{}", "No session stored".dimmed());
    }
    Ok(())
}

async fn status(config: &Config) -> Result<()> {
    let Some(session) = config.current_session().await? else {
        println!("{}", "Not signed in".yellow());
        return Ok(());
    };

    println!(
        "Signed in as {} since {}",
        session.user_id.to_string().bold(),
        session.created_at.format("%Y-%m-%d %H:%M UTC")
    );

    let identity = identity_client(config)?;
    match identity.verify(&session.token).await {
        Ok(Some(user)) if user == session.user_id => {
            println!("Session is {}", "valid".green());
        }
        Ok(Some(user)) => {
            println!(
                "Session now belongs to {}; run `auth login` again",
                user.to_string().yellow()
            );
        }
        Ok(None) => {
            println!("Session is {}; run `auth login` again", "no longer valid".red());
        }
        Err(e) => {
            println!("{} {:#}", "Could not verify session:".yellow(), e);
        }
    }
    Ok(())
}
