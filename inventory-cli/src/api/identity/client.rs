//! Identity provider REST client

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{IdentityProvider, SessionToken, UserId};

#[derive(Debug, Deserialize)]
struct CurrentUser {
    id: String,
}

pub struct IdentityClient {
    http: reqwest::Client,
    api_url: String,
}

impl IdentityClient {
    pub fn new(http: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    async fn verify(&self, token: &SessionToken) -> Result<Option<UserId>> {
        let response = self
            .http
            .get(format!("{}/v1/me", self.api_url))
            .bearer_auth(token.as_str())
            .send()
            .await
            .context("Failed to reach identity provider")?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                log::debug!("Identity provider rejected session");
                Ok(None)
            }
            status if status.is_success() => {
                let user: CurrentUser = response
                    .json()
                    .await
                    .context("Failed to parse identity provider response")?;
                if user.id.is_empty() {
                    return Ok(None);
                }
                Ok(Some(UserId(user.id)))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                bail!("Identity provider returned {}: {}", status, body)
            }
        }
    }
}
