//! Builds the service clients from settings and hands out the services using them

use anyhow::{Context, Result};
use std::sync::Arc;

use super::auth::{AuthManager, CredentialSet};
use super::identity::{IdentityClient, IdentityProvider};
use super::sheets::{SheetStore, SheetsClient};
use super::upload::{AssetStore, UploadClient};
use crate::config::Settings;
use crate::services::images::ImageService;
use crate::services::inventory::InventoryQueryService;

pub struct ClientManager {
    sheet_name: String,
    sheets: Arc<dyn SheetStore>,
    image_service: Arc<ImageService>,
}

impl ClientManager {
    /// Validate `settings` and construct every client with a shared HTTP pool
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let http = build_http_client(settings)?;

        let auth = Arc::new(AuthManager::new(
            http.clone(),
            CredentialSet {
                client_id: settings.google.client_id.clone(),
                client_secret: settings.google.client_secret.clone(),
                refresh_token: settings.google.refresh_token.clone(),
                token_url: settings.google.token_url.clone(),
            },
        ));
        let sheets: Arc<dyn SheetStore> = Arc::new(SheetsClient::new(
            http.clone(),
            auth,
            &settings.google.api_url,
            &settings.sheet.id,
        ));
        let assets: Arc<dyn AssetStore> = Arc::new(UploadClient::new(
            http.clone(),
            &settings.upload.api_url,
            &settings.upload.file_url_base,
            &settings.upload.secret,
        ));
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(IdentityClient::new(http, &settings.identity.api_url));

        let image_service = ImageService::new(
            sheets.clone(),
            assets,
            identity,
            &settings.sheet.name,
        )
        .with_limits(settings.upload.limits()?)
        .with_register_write(settings.sheet.register_write);

        log::debug!(
            "Clients ready for sheet {} (timeout {}s)",
            settings.sheet.name,
            settings.http.timeout_secs
        );

        Ok(Self {
            sheet_name: settings.sheet.name.clone(),
            sheets,
            image_service: Arc::new(image_service),
        })
    }

    pub fn query_service(&self) -> InventoryQueryService {
        InventoryQueryService::new(self.sheets.clone(), &self.sheet_name)
    }

    pub fn image_service(&self) -> Arc<ImageService> {
        self.image_service.clone()
    }
}

/// HTTP client shared by every service client, with the configured timeout
pub fn build_http_client(settings: &Settings) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(settings.http_timeout())
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}
