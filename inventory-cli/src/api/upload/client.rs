//! Upload service REST client
//!
//! Uploads are two-phase: request a presigned URL for the file, then `PUT` the
//! bytes there. The public URL is derived from the returned key.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AssetStore, UploadFile, UploadedFile};

/// Header carrying the service secret
pub const API_KEY_HEADER: &str = "x-uploadthing-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest<'a> {
    files: Vec<FileDescriptor<'a>>,
    acl: &'a str,
    content_disposition: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileDescriptor<'a> {
    name: &'a str,
    size: u64,
    #[serde(rename = "type")]
    content_type: &'a str,
    custom_id: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: Vec<PresignedFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresignedFile {
    key: String,
    /// Presigned destination for the bytes
    url: String,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    file_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest<'a> {
    file_keys: &'a [String],
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    success: bool,
}

pub struct UploadClient {
    http: reqwest::Client,
    api_url: String,
    file_url_base: String,
    secret: String,
}

impl UploadClient {
    pub fn new(
        http: reqwest::Client,
        api_url: impl Into<String>,
        file_url_base: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            file_url_base: file_url_base.into().trim_end_matches('/').to_string(),
            secret: secret.into(),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.file_url_base, key)
    }

    async fn request_presigned(&self, file: &UploadFile) -> Result<PresignedFile> {
        let body = UploadRequest {
            files: vec![FileDescriptor {
                name: &file.name,
                size: file.size(),
                content_type: &file.content_type,
                custom_id: uuid::Uuid::new_v4().to_string(),
            }],
            acl: "public-read",
            content_disposition: "inline",
        };

        let response = self
            .http
            .post(format!("{}/v6/uploadFiles", self.api_url))
            .header(API_KEY_HEADER, &self.secret)
            .json(&body)
            .send()
            .await
            .context("Failed to reach upload service")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Upload service rejected {} ({}): {}", file.name, status, text);
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .context("Failed to parse upload service response")?;
        parsed
            .data
            .into_iter()
            .next()
            .context("Upload service returned no presigned URL")
    }
}

#[async_trait]
impl AssetStore for UploadClient {
    async fn upload(&self, file: UploadFile) -> Result<UploadedFile> {
        let presigned = self.request_presigned(&file).await?;
        log::debug!("Uploading {} as key {}", file.name, presigned.key);

        let response = self
            .http
            .put(&presigned.url)
            .header(reqwest::header::CONTENT_TYPE, &file.content_type)
            .body(file.bytes)
            .send()
            .await
            .with_context(|| format!("Failed to upload {}", file.name))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Storage rejected {} ({}): {}", file.name, status, text);
        }

        let url = presigned
            .file_url
            .unwrap_or_else(|| self.public_url(&presigned.key));
        Ok(UploadedFile {
            name: presigned.file_name.unwrap_or(file.name),
            key: presigned.key,
            url,
        })
    }

    async fn delete_files(&self, keys: &[String]) -> Result<()> {
        log::debug!("Deleting assets {:?}", keys);
        let response = self
            .http
            .post(format!("{}/v6/deleteFiles", self.api_url))
            .header(API_KEY_HEADER, &self.secret)
            .json(&DeleteRequest { file_keys: keys })
            .send()
            .await
            .context("Failed to reach upload service")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Upload service refused deletion ({}): {}", status, text);
        }

        let parsed: DeleteResponse = response
            .json()
            .await
            .context("Failed to parse deletion response")?;
        if !parsed.success {
            bail!("Upload service reported deletion of {} as unsuccessful", keys.join(", "));
        }
        Ok(())
    }
}
