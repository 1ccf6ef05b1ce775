//! Hosted file-upload service
//!
//! Stores product images and hands back a public URL for each. Assets are
//! addressed by key (the last path segment of their URL) for deletion.

pub mod client;
#[cfg(test)]
pub mod memory;

pub use client::UploadClient;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A file ready to be sent to the upload service
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Name the service should store the file under
    pub name: String,
    /// MIME type declared for the upload
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A file the upload service has accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub key: String,
    pub name: String,
    pub url: String,
}

/// Storage for uploaded assets
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Upload a single file and return where it ended up
    async fn upload(&self, file: UploadFile) -> Result<UploadedFile>;

    /// Delete assets by key
    async fn delete_files(&self, keys: &[String]) -> Result<()>;
}
