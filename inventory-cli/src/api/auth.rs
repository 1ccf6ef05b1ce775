//! OAuth access tokens for the spreadsheet API
//!
//! Exchanges a long-lived refresh token for short-lived access tokens and keeps
//! the current one until shortly before it expires.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

/// Scope requested for spreadsheet access
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Tokens are refreshed this long before their reported expiry
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Longest lifetime accepted from the token endpoint
const MAX_EXPIRES_IN_SECS: i64 = 86_400;

#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenInfo {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// OAuth client credentials plus the refresh token granted to them
#[derive(Debug, Clone)]
pub struct CredentialSet {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub token_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
struct TokenError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

pub struct AuthManager {
    http: reqwest::Client,
    credentials: CredentialSet,
    token: Mutex<Option<TokenInfo>>,
}

impl AuthManager {
    pub fn new(http: reqwest::Client, credentials: CredentialSet) -> Self {
        Self {
            http,
            credentials,
            token: Mutex::new(None),
        }
    }

    /// A valid access token, refreshed if the cached one is missing or about to expire
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.access_token.clone());
            }
            log::debug!("Access token expires at {}, refreshing", token.expires_at);
        }

        let token = self.refresh().await?;
        let access = token.access_token.clone();
        *cached = Some(token);
        Ok(access)
    }

    async fn refresh(&self) -> Result<TokenInfo> {
        log::debug!("Requesting access token from {}", self.credentials.token_url);
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
            ("scope", SHEETS_SCOPE),
        ];

        let response = self
            .http
            .post(&self.credentials.token_url)
            .form(&params)
            .send()
            .await
            .context("Failed to reach OAuth token endpoint")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read OAuth token response")?;

        if !status.is_success() {
            let detail = serde_json::from_str::<TokenError>(&body)
                .map(|e| match e.error_description {
                    Some(description) => format!("{}: {}", e.error, description),
                    None => e.error,
                })
                .unwrap_or(body);
            bail!("Token refresh failed ({}): {}", status, detail);
        }

        let parsed: TokenResponse =
            serde_json::from_str(&body).context("Failed to parse OAuth token response")?;
        let expires_at = expiry_from(Utc::now(), parsed.expires_in)?;
        log::info!("Obtained access token valid until {}", expires_at);

        Ok(TokenInfo {
            access_token: parsed.access_token,
            expires_at,
        })
    }
}

/// Expiry instant for a token issued at `now` lasting `expires_in` seconds.
///
/// The reported lifetime is clamped to `0..=MAX_EXPIRES_IN_SECS`.
fn expiry_from(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>> {
    let lifetime = expires_in.clamp(0, MAX_EXPIRES_IN_SECS);
    if lifetime != expires_in {
        log::warn!(
            "Token endpoint reported expires_in={}, using {}",
            expires_in,
            lifetime
        );
    }
    Duration::try_seconds(lifetime)
        .and_then(|d| now.checked_add_signed(d))
        .with_context(|| format!("Invalid token lifetime {}s", expires_in))
}
