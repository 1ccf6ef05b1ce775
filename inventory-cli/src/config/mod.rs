//! Configuration and local state
//!
//! Settings come from a TOML file, then `.env` / process environment overrides
//! for secrets. Local state (the operator session) lives in a SQLite database
//! under the data directory.

pub mod repository;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::api::identity::{SessionToken, UserId};
use crate::services::images::routes::{ACCEPTED_IMAGE_TYPES, UploadLimits, parse_file_size};
use crate::services::images::RegisterWrite;
use repository::session::{self, StoredSession};

pub const APP_NAME: &str = "inventory-cli";

/// Environment variable pointing at an alternative config file
pub const CONFIG_PATH_ENV: &str = "INVENTORY_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSettings {
    /// Spreadsheet id
    pub id: String,
    /// Sheet (tab) holding the inventory
    pub name: String,
    pub register_write: RegisterWrite,
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: "inventory".to_string(),
            register_write: RegisterWrite::Update,
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub token_url: String,
    pub api_url: String,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            api_url: "https://sheets.googleapis.com".to_string(),
        }
    }
}

impl std::fmt::Debug for GoogleSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &mask(&self.client_secret))
            .field("refresh_token", &mask(&self.refresh_token))
            .field("token_url", &self.token_url)
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub api_url: String,
    pub file_url_base: String,
    pub secret: String,
    /// Per-file limit such as `4MB`
    pub max_file_size: String,
    pub accepted_types: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.uploadthing.com".to_string(),
            file_url_base: "https://utfs.io/f".to_string(),
            secret: String::new(),
            max_file_size: "4MB".to_string(),
            accepted_types: ACCEPTED_IMAGE_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl std::fmt::Debug for UploadSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSettings")
            .field("api_url", &self.api_url)
            .field("file_url_base", &self.file_url_base)
            .field("secret", &mask(&self.secret))
            .field("max_file_size", &self.max_file_size)
            .field("accepted_types", &self.accepted_types)
            .finish()
    }
}

impl UploadSettings {
    pub fn limits(&self) -> Result<UploadLimits> {
        let max_file_size = parse_file_size(&self.max_file_size)
            .with_context(|| format!("Invalid upload.max_file_size '{}'", self.max_file_size))?;
        Ok(UploadLimits {
            max_file_size,
            accepted_types: self.accepted_types.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    pub api_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Everything read from the config file and environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sheet: SheetSettings,
    pub google: GoogleSettings,
    pub upload: UploadSettings,
    pub identity: IdentitySettings,
    pub http: HttpSettings,
}

impl Settings {
    /// Read settings from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    /// Apply secret overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`; empty values are ignored
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let targets: [(&str, &mut String); 6] = [
            ("SHEET_ID", &mut self.sheet.id),
            ("GOOGLE_CLIENT_ID", &mut self.google.client_id),
            ("GOOGLE_CLIENT_SECRET", &mut self.google.client_secret),
            ("GOOGLE_REFRESH_TOKEN", &mut self.google.refresh_token),
            ("UPLOADTHING_SECRET", &mut self.upload.secret),
            ("IDENTITY_API_URL", &mut self.identity.api_url),
        ];
        for (key, target) in targets {
            if let Some(value) = get(key) {
                log::debug!("Using {} from environment", key);
                *target = value;
            }
        }
    }

    /// Check that every value the services need is present and well-formed
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        let required = [
            ("sheet.id (SHEET_ID)", &self.sheet.id),
            ("sheet.name", &self.sheet.name),
            ("google.client_id (GOOGLE_CLIENT_ID)", &self.google.client_id),
            ("google.client_secret (GOOGLE_CLIENT_SECRET)", &self.google.client_secret),
            ("google.refresh_token (GOOGLE_REFRESH_TOKEN)", &self.google.refresh_token),
            ("upload.secret (UPLOADTHING_SECRET)", &self.upload.secret),
            ("identity.api_url (IDENTITY_API_URL)", &self.identity.api_url),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        if !missing.is_empty() {
            bail!("Missing configuration: {}", missing.join(", "));
        }

        for (name, url) in [
            ("google.token_url", &self.google.token_url),
            ("google.api_url", &self.google.api_url),
            ("upload.api_url", &self.upload.api_url),
            ("upload.file_url_base", &self.upload.file_url_base),
            ("identity.api_url", &self.identity.api_url),
        ] {
            reqwest::Url::parse(url).with_context(|| format!("Invalid URL for {}: '{}'", name, url))?;
        }

        self.upload.limits()?;
        if self.upload.accepted_types.is_empty() {
            bail!("upload.accepted_types must list at least one MIME type");
        }
        if self.http.timeout_secs == 0 {
            bail!("http.timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "***" }
}

/// Loaded settings plus the local state database
pub struct Config {
    pub settings: Settings,
    pub pool: SqlitePool,
}

impl Config {
    /// Load `.env`, the config file and the environment, and open the state database
    pub async fn load() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env loaded: {}", e);
        }

        let path = config_path()?;
        let mut settings = Settings::load_from(&path)?;
        settings.apply_env();

        let db_path = data_dir()?.join(format!("{}.db", APP_NAME));
        let url = format!("sqlite://{}", db_path.display());
        let pool = connect_pool(&url).await?;

        Ok(Self { settings, pool })
    }

    pub async fn save_session(&self, token: &SessionToken, user_id: &UserId) -> Result<()> {
        session::save_session(&self.pool, token, user_id).await
    }

    pub async fn current_session(&self) -> Result<Option<StoredSession>> {
        session::get_session(&self.pool).await
    }

    pub async fn clear_session(&self) -> Result<bool> {
        session::clear_session(&self.pool).await
    }
}

/// Open (creating if needed) a SQLite database and run the embedded migrations
pub async fn connect_pool(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("Invalid database URL {}", url))?
        .create_if_missing(true);

    // An in-memory database lives only as long as its single connection
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database {}", url))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

/// Config file location, honouring `INVENTORY_CONFIG`
pub fn config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(dir.join(APP_NAME).join("config.toml"))
}

/// Directory for local state and logs, created on demand
pub fn data_dir() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .context("Could not determine data directory")?
        .join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir)
}

pub fn log_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(format!("{}.log", APP_NAME)))
}
