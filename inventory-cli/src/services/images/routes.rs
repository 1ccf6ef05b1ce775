//! Upload routes and their limits
//!
//! Two routes exist: one for rows that have no image yet and one that swaps an
//! existing image. Both accept a single image within the configured size and
//! type limits.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::outcome::MutationError;
use crate::api::identity::UserId;
use crate::api::upload::UploadFile;
use crate::services::inventory::RowIndex;

/// Default per-file limit: 4 MB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 4 * 1024 * 1024;

/// Image types accepted by default
pub const ACCEPTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "camelCase")]
pub enum UploadRoute {
    /// First image for a row; completion registers the URL
    ImageUploader,
    /// Replacement image; completion deletes `previous_key` and overwrites the URL
    #[serde(rename_all = "camelCase")]
    UpdateImage { previous_key: String },
}

impl UploadRoute {
    pub fn slug(&self) -> &'static str {
        match self {
            UploadRoute::ImageUploader => "imageUploader",
            UploadRoute::UpdateImage { .. } => "updateImage",
        }
    }
}

/// Data carried from the authorization step to the completion hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub user_id: UserId,
    pub row: RowIndex,
    pub route: UploadRoute,
}

/// Size and type limits applied before any bytes leave the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_file_size: u64,
    pub accepted_types: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            accepted_types: ACCEPTED_IMAGE_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl UploadLimits {
    pub fn validate(&self, file: &UploadFile) -> Result<(), MutationError> {
        if file.bytes.is_empty() {
            return Err(MutationError::InvalidUpload("file is empty".to_string()));
        }
        if file.size() > self.max_file_size {
            return Err(MutationError::InvalidUpload(format!(
                "{} is {} but the limit is {}",
                file.name,
                format_file_size(file.size()),
                format_file_size(self.max_file_size)
            )));
        }
        let accepted = self
            .accepted_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&file.content_type));
        if !accepted {
            return Err(MutationError::InvalidUpload(format!(
                "type {} is not accepted (expected one of {})",
                file.content_type,
                self.accepted_types.join(", ")
            )));
        }
        Ok(())
    }
}

/// MIME type guessed from a file extension
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "avif" => Some("image/avif"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Parse sizes such as `4MB`, `512KB`, `1.5 MB` or a plain byte count.
/// Units are binary (1KB = 1024 bytes).
pub fn parse_file_size(value: &str) -> Option<u64> {
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f64 = number.parse().ok()?;
    let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1u64,
        "KB" => 1024,
        "MB" => 1024 * 1024,
        "GB" => 1024 * 1024 * 1024,
        _ => return None,
    };
    let bytes = number * multiplier as f64;
    if !bytes.is_finite() || bytes < 0.0 {
        return None;
    }
    Some(bytes.round() as u64)
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}B", bytes)
    } else {
        format!("{:.1}{}", size, UNITS[unit])
    }
}
