//! In-memory asset store used by tests

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{AssetStore, UploadFile, UploadedFile};

pub const BASE_URL: &str = "https://files.test/f";

/// Assets keyed by name, with switches to simulate upstream failures
#[derive(Debug, Default)]
pub struct MemoryAssets {
    assets: Mutex<BTreeMap<String, Vec<u8>>>,
    log: Mutex<Vec<String>>,
    fail_uploads: Mutex<bool>,
    fail_deletes: Mutex<bool>,
    /// Name reported back instead of the requested one
    rename_to: Mutex<Option<String>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset(self, key: &str) -> Self {
        self.assets.lock().unwrap().insert(key.to_string(), Vec::new());
        self
    }

    pub fn fail_uploads(&self, fail: bool) {
        *self.fail_uploads.lock().unwrap() = fail;
    }

    pub fn fail_deletes(&self, fail: bool) {
        *self.fail_deletes.lock().unwrap() = fail;
    }

    pub fn rename_uploads_to(&self, name: &str) {
        *self.rename_to.lock().unwrap() = Some(name.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.assets.lock().unwrap().contains_key(key)
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetStore for MemoryAssets {
    async fn upload(&self, file: UploadFile) -> Result<UploadedFile> {
        self.log.lock().unwrap().push(format!("upload {}", file.name));
        if *self.fail_uploads.lock().unwrap() {
            bail!("simulated upload failure");
        }
        let name = self
            .rename_to
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| file.name.clone());
        let key = format!("k-{}", name);
        self.assets.lock().unwrap().insert(key.clone(), file.bytes);
        Ok(UploadedFile {
            url: format!("{}/{}", BASE_URL, key),
            key,
            name,
        })
    }

    async fn delete_files(&self, keys: &[String]) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("delete {}", keys.join(",")));
        if *self.fail_deletes.lock().unwrap() {
            bail!("simulated delete failure");
        }
        let mut assets = self.assets.lock().unwrap();
        for key in keys {
            assets.remove(key);
        }
        Ok(())
    }
}
