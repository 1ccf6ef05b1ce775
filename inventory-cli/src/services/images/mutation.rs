//! Image mutations against the sheet and the upload service
//!
//! Every entry point authorizes the session first. After that, steps run one
//! at a time and each step's result is recorded in a [`MutationReport`];
//! nothing is rolled back and nothing is retried.

use std::sync::Arc;

use super::outcome::{FilenameMismatch, MutationError, MutationKind, MutationReport, MutationStep};
use super::routes::{UploadLimits, UploadMetadata, UploadRoute};
use crate::api::identity::{IdentityProvider, SessionToken, UserId};
use crate::api::sheets::{A1Range, SheetStore, single_cell};
use crate::api::upload::{AssetStore, UploadFile, UploadedFile};
use crate::services::inventory::addressing::{self, IMAGE_COLUMN};
use crate::services::inventory::models::{asset_key_from_url, image_filename};
use crate::services::inventory::{InventoryRecord, RowIndex};

/// How a freshly uploaded URL is written into the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterWrite {
    /// Overwrite the row's image cell
    #[default]
    Update,
    /// Append at the row's image cell, letting the datastore pick the first free row
    Append,
}

/// Image bytes picked by the operator, not yet named or uploaded
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct ImageService {
    sheets: Arc<dyn SheetStore>,
    assets: Arc<dyn AssetStore>,
    identity: Arc<dyn IdentityProvider>,
    sheet: String,
    limits: UploadLimits,
    register_write: RegisterWrite,
}

impl ImageService {
    pub fn new(
        sheets: Arc<dyn SheetStore>,
        assets: Arc<dyn AssetStore>,
        identity: Arc<dyn IdentityProvider>,
        sheet: impl Into<String>,
    ) -> Self {
        Self {
            sheets,
            assets,
            identity,
            sheet: sheet.into(),
            limits: UploadLimits::default(),
            register_write: RegisterWrite::default(),
        }
    }

    pub fn with_limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_register_write(mut self, mode: RegisterWrite) -> Self {
        self.register_write = mode;
        self
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Resolve the session to a user, rejecting missing or invalid sessions
    pub async fn authorize(&self, session: Option<&SessionToken>) -> Result<UserId, MutationError> {
        let token = session.ok_or_else(|| {
            MutationError::Unauthorized("no session; run `inventory-cli auth login`".to_string())
        })?;
        match self.identity.verify(token).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(MutationError::Unauthorized(
                "session expired or revoked".to_string(),
            )),
            Err(e) => {
                log::error!("Identity provider check failed: {:#}", e);
                Err(MutationError::Unauthorized(format!(
                    "could not verify session: {}",
                    e
                )))
            }
        }
    }

    /// Write the URL of an already uploaded image into the row's image cell
    pub async fn register(
        &self,
        session: Option<&SessionToken>,
        row: RowIndex,
        url: &str,
    ) -> Result<MutationReport, MutationError> {
        let user = self.authorize(session).await?;
        log::info!("{} registering image for row index {}", user, row);
        Ok(self.write_registered(row, url).await)
    }

    /// Delete the previous asset, then overwrite the image cell with `new_url`.
    /// The cell is written even when the deletion fails.
    pub async fn replace(
        &self,
        session: Option<&SessionToken>,
        row: RowIndex,
        previous_url: &str,
        new_url: &str,
    ) -> Result<MutationReport, MutationError> {
        let user = self.authorize(session).await?;
        log::info!("{} replacing image for row index {}", user, row);
        let previous_key = asset_key_from_url(previous_url).unwrap_or(previous_url);
        Ok(self.write_replaced(row, previous_key, new_url).await)
    }

    /// Delete the asset, then clear the image cell.
    /// The cell is left alone when the deletion fails.
    pub async fn delete(
        &self,
        session: Option<&SessionToken>,
        row: RowIndex,
        url: &str,
    ) -> Result<MutationReport, MutationError> {
        let user = self.authorize(session).await?;
        log::info!("{} deleting image for row index {}", user, row);

        let cell = self.image_cell(row);
        let mut report = MutationReport::new(MutationKind::Delete, cell_row(&cell));
        let key = asset_key_from_url(url).unwrap_or(url).to_string();
        let clear = MutationStep::ClearCell {
            range: cell.to_string(),
        };

        match self.assets.delete_files(std::slice::from_ref(&key)).await {
            Ok(()) => report.complete(MutationStep::DeleteAsset { key }),
            Err(e) => {
                log::error!("Failed to delete asset {}: {:#}", key, e);
                report.fail(MutationStep::DeleteAsset { key }, &e);
                report.skip(clear);
                return Ok(report);
            }
        }

        match self.sheets.write(&cell, single_cell("")).await {
            Ok(()) => report.complete(clear),
            Err(e) => {
                log::error!(
                    "Asset deleted but {} still references it: {:#}",
                    cell,
                    e
                );
                report.fail(clear, &e);
            }
        }
        Ok(report)
    }

    /// Authorize, validate and upload an image for `record`, then run the
    /// completion hook for `route`.
    ///
    /// The upload is named after the record's own name and timestamp, so the
    /// stored URL and the derived filename agree.
    pub async fn upload_image(
        &self,
        session: Option<&SessionToken>,
        route: UploadRoute,
        record: &InventoryRecord,
        source: ImageSource,
    ) -> Result<MutationReport, MutationError> {
        let user = self.authorize(session).await?;
        let row = RowIndex::from_position(record.position).ok_or_else(|| {
            MutationError::InvalidUpload(format!("invalid record position {}", record.position))
        })?;

        let expected_name = upload_name(record);
        let file = UploadFile {
            name: expected_name.clone(),
            content_type: source.content_type,
            bytes: source.bytes,
        };
        self.limits.validate(&file)?;

        let metadata = UploadMetadata {
            user_id: user,
            row,
            route,
        };

        log::info!(
            "Uploading {} ({} bytes) via {} for {}",
            file.name,
            file.size(),
            metadata.route.slug(),
            metadata.user_id
        );
        let uploaded = match self.assets.upload(file).await {
            Ok(uploaded) => uploaded,
            Err(e) => {
                log::error!("Upload of {} failed: {:#}", expected_name, e);
                let kind = match metadata.route {
                    UploadRoute::ImageUploader => MutationKind::Register,
                    UploadRoute::UpdateImage { .. } => MutationKind::Replace,
                };
                let mut report = MutationReport::new(kind, addressing::image_cell_row(row));
                report.fail(MutationStep::UploadAsset { name: expected_name }, &e);
                return Ok(report);
            }
        };

        let mut report = self.on_upload_complete(metadata, uploaded.clone()).await;
        report
            .completed
            .insert(0, MutationStep::UploadAsset { name: uploaded.name.clone() });
        if uploaded.name != expected_name {
            log::warn!(
                "Upload service stored {} as {}; derived filename no longer matches",
                expected_name,
                uploaded.name
            );
            report.filename_mismatch = Some(FilenameMismatch {
                expected: expected_name,
                actual: uploaded.name,
            });
        }
        Ok(report)
    }

    /// Completion hook: runs after the upload service accepted a file.
    /// Authorization already happened when the upload was requested.
    pub async fn on_upload_complete(
        &self,
        metadata: UploadMetadata,
        file: UploadedFile,
    ) -> MutationReport {
        log::info!(
            "Upload complete for {} at row index {}: {}",
            metadata.user_id,
            metadata.row,
            file.url
        );
        match metadata.route {
            UploadRoute::ImageUploader => self.write_registered(metadata.row, &file.url).await,
            UploadRoute::UpdateImage { previous_key } => {
                self.write_replaced(metadata.row, &previous_key, &file.url)
                    .await
            }
        }
    }

    async fn write_registered(&self, row: RowIndex, url: &str) -> MutationReport {
        let cell = self.image_cell(row);
        let mut report = MutationReport::new(MutationKind::Register, cell_row(&cell));
        let step = MutationStep::WriteCell {
            range: cell.to_string(),
        };

        let result = match self.register_write {
            RegisterWrite::Update => self.sheets.write(&cell, single_cell(url)).await,
            RegisterWrite::Append => self.sheets.append(&cell, single_cell(url)).await,
        };
        match result {
            Ok(()) => {
                report.complete(step);
                report.url = Some(url.to_string());
            }
            Err(e) => {
                log::error!("Failed to write {} to {}: {:#}", url, cell, e);
                report.fail(step, &e);
            }
        }
        report
    }

    async fn write_replaced(&self, row: RowIndex, previous_key: &str, url: &str) -> MutationReport {
        let cell = self.image_cell(row);
        let mut report = MutationReport::new(MutationKind::Replace, cell_row(&cell));
        let key = previous_key.to_string();

        match self.assets.delete_files(std::slice::from_ref(&key)).await {
            Ok(()) => report.complete(MutationStep::DeleteAsset { key }),
            Err(e) => {
                log::warn!(
                    "Failed to delete previous asset {}, writing new URL anyway: {:#}",
                    key,
                    e
                );
                report.fail(MutationStep::DeleteAsset { key }, &e);
            }
        }

        let step = MutationStep::WriteCell {
            range: cell.to_string(),
        };
        match self.sheets.write(&cell, single_cell(url)).await {
            Ok(()) => {
                report.complete(step);
                report.url = Some(url.to_string());
            }
            Err(e) => {
                log::error!("Failed to write {} to {}: {:#}", url, cell, e);
                report.fail(step, &e);
            }
        }
        report
    }

    fn image_cell(&self, row: RowIndex) -> A1Range {
        A1Range::cell(&self.sheet, IMAGE_COLUMN, addressing::image_cell_row(row))
    }
}

fn cell_row(cell: &A1Range) -> crate::services::inventory::SheetRow {
    cell.start
        .as_ref()
        .map(|start| start.row)
        .unwrap_or(crate::services::inventory::SheetRow(0))
}

/// Filename an upload for `record` is stored under.
///
/// Uses the record's stored timestamp. Only a record without one falls back to
/// the current Unix time, which the display side cannot reproduce.
pub fn upload_name(record: &InventoryRecord) -> String {
    if record.time_stamp.trim().is_empty() {
        let now = chrono::Utc::now().timestamp().to_string();
        log::warn!(
            "Record {} has no timestamp; naming its image with {} which will not round-trip",
            record.position,
            now
        );
        image_filename(&record.name, &now)
    } else {
        record.image_filename()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::identity::memory::StaticIdentity;
    use crate::api::sheets::memory::MemorySheet;
    use crate::api::upload::memory::{BASE_URL, MemoryAssets};
    use crate::services::images::outcome::Outcome;
    use crate::services::inventory::SheetRow;

    const TOKEN: &str = "sess_valid";

    struct Fixture {
        sheet: Arc<MemorySheet>,
        assets: Arc<MemoryAssets>,
        identity: Arc<StaticIdentity>,
        service: ImageService,
    }

    fn fixture() -> Fixture {
        let sheet = Arc::new(MemorySheet::from_strings(
            "inventory",
            &[
                &["name", "category", "price", "rating", "review", "quantity", "description", "timeStamp", "image"],
                &["Widget", "A", "9.99", "4.5", "ok", "10", "desc", "111", "https://x/a.jpg"],
                &["Gadget", "B", "1", "1", "no", "0", "d", "222", ""],
            ],
        ));
        let assets = Arc::new(MemoryAssets::new().with_asset("a.jpg"));
        let identity = Arc::new(StaticIdentity::new().with_session(TOKEN, "user_1"));
        let service = ImageService::new(
            sheet.clone(),
            assets.clone(),
            identity.clone(),
            "inventory",
        );
        Fixture {
            sheet,
            assets,
            identity,
            service,
        }
    }

    fn session() -> SessionToken {
        SessionToken::new(TOKEN)
    }

    fn gadget() -> InventoryRecord {
        crate::services::inventory::mapper::map_row(
            &["Gadget", "B", "1", "1", "no", "0", "d", "222"]
                .iter()
                .map(|c| Some(c.to_string()))
                .collect::<Vec<_>>(),
            2,
        )
    }

    fn jpeg() -> ImageSource {
        ImageSource {
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[tokio::test]
    async fn test_missing_session_is_rejected_before_side_effects() {
        let f = fixture();

        let err = f
            .service
            .delete(None, RowIndex(0), "https://x/a.jpg")
            .await
            .unwrap_err();

        assert!(matches!(err, MutationError::Unauthorized(_)));
        assert!(f.sheet.calls().is_empty());
        assert!(f.assets.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session_is_rejected_before_side_effects() {
        let f = fixture();
        let stranger = SessionToken::new("sess_unknown");

        let err = f
            .service
            .register(Some(&stranger), RowIndex(1), "https://x/b.jpg")
            .await
            .unwrap_err();

        assert!(matches!(err, MutationError::Unauthorized(_)));
        assert!(f.sheet.calls().is_empty());
    }

    #[tokio::test]
    async fn test_identity_outage_fails_closed() {
        let f = fixture();
        f.identity.set_unavailable(true);

        let result = f
            .service
            .upload_image(Some(&session()), UploadRoute::ImageUploader, &gadget(), jpeg())
            .await;

        assert!(matches!(result, Err(MutationError::Unauthorized(_))));
        assert!(f.assets.calls().is_empty());
    }

    #[tokio::test]
    async fn test_register_writes_image_cell() {
        let f = fixture();

        let report = f
            .service
            .register(Some(&session()), RowIndex(1), "https://x/b.jpg")
            .await
            .unwrap();

        assert_eq!(report.outcome(), Outcome::Succeeded);
        assert_eq!(report.row, SheetRow(3));
        assert_eq!(f.sheet.cell("I", 3).as_deref(), Some("https://x/b.jpg"));
    }

    #[tokio::test]
    async fn test_register_append_mode() {
        let f = fixture();
        let service = ImageService::new(
            f.sheet.clone(),
            f.assets.clone(),
            f.identity.clone(),
            "inventory",
        )
        .with_register_write(RegisterWrite::Append);

        let report = service
            .register(Some(&session()), RowIndex(1), "https://x/b.jpg")
            .await
            .unwrap();

        assert!(report.is_success());
        assert!(f.sheet.calls()[0].starts_with("append inventory!I3"));
        assert_eq!(f.sheet.cell("I", 3).as_deref(), Some("https://x/b.jpg"));
    }

    #[tokio::test]
    async fn test_register_write_failure_is_failed() {
        let f = fixture();
        f.sheet.fail_writes(true);

        let report = f
            .service
            .register(Some(&session()), RowIndex(1), "https://x/b.jpg")
            .await
            .unwrap();

        assert_eq!(report.outcome(), Outcome::Failed);
        assert_eq!(report.url, None);
    }

    #[tokio::test]
    async fn test_delete_for_row_index_one_targets_sheet_row_three() {
        let f = fixture();

        let report = f
            .service
            .delete(Some(&session()), RowIndex(1), "https://x/a.jpg")
            .await
            .unwrap();

        assert_eq!(report.row, SheetRow(3));
        assert!(
            f.sheet
                .calls()
                .iter()
                .any(|c| c.starts_with("write inventory!I3"))
        );
    }

    #[tokio::test]
    async fn test_delete_removes_asset_and_clears_cell() {
        let f = fixture();

        let report = f
            .service
            .delete(Some(&session()), RowIndex(0), "https://x/a.jpg")
            .await
            .unwrap();

        assert_eq!(report.outcome(), Outcome::Succeeded);
        assert!(!f.assets.contains("a.jpg"));
        assert_eq!(f.assets.calls(), vec!["delete a.jpg"]);
        assert_eq!(f.sheet.cell("I", 2), Some(String::new()));
    }

    #[tokio::test]
    async fn test_delete_skips_clear_when_asset_deletion_fails() {
        let f = fixture();
        f.assets.fail_deletes(true);

        let report = f
            .service
            .delete(Some(&session()), RowIndex(0), "https://x/a.jpg")
            .await
            .unwrap();

        assert_eq!(report.outcome(), Outcome::Failed);
        assert_eq!(report.skipped.len(), 1);
        assert!(f.sheet.calls().is_empty());
        assert_eq!(f.sheet.cell("I", 2).as_deref(), Some("https://x/a.jpg"));
    }

    #[tokio::test]
    async fn test_delete_with_failed_clear_is_partial() {
        let f = fixture();
        f.sheet.fail_writes(true);

        let report = f
            .service
            .delete(Some(&session()), RowIndex(0), "https://x/a.jpg")
            .await
            .unwrap();

        assert_eq!(report.outcome(), Outcome::PartiallySucceeded);
        assert!(!f.assets.contains("a.jpg"));
    }

    #[tokio::test]
    async fn test_replace_writes_cell_even_when_asset_deletion_fails() {
        let f = fixture();
        f.assets.fail_deletes(true);

        let report = f
            .service
            .replace(
                Some(&session()),
                RowIndex(0),
                "https://x/a.jpg",
                "https://x/new.jpg",
            )
            .await
            .unwrap();

        assert_eq!(report.outcome(), Outcome::PartiallySucceeded);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(
            report.completed,
            vec![MutationStep::WriteCell {
                range: "inventory!I2".to_string()
            }]
        );
        assert_eq!(f.sheet.cell("I", 2).as_deref(), Some("https://x/new.jpg"));
    }

    #[tokio::test]
    async fn test_replace_deletes_previous_asset_by_key() {
        let f = fixture();

        let report = f
            .service
            .replace(
                Some(&session()),
                RowIndex(0),
                "https://x/a.jpg",
                "https://x/new.jpg",
            )
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(f.assets.calls(), vec!["delete a.jpg"]);
    }

    #[tokio::test]
    async fn test_upload_image_registers_url() {
        let f = fixture();

        let report = f
            .service
            .upload_image(Some(&session()), UploadRoute::ImageUploader, &gadget(), jpeg())
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(f.assets.calls(), vec!["upload gadget-222.jpg"]);
        let expected_url = format!("{}/k-gadget-222.jpg", BASE_URL);
        assert_eq!(report.url.as_deref(), Some(expected_url.as_str()));
        assert_eq!(f.sheet.cell("I", 3).as_deref(), Some(expected_url.as_str()));
        assert!(report.filename_mismatch.is_none());
    }

    #[tokio::test]
    async fn test_upload_image_replace_route() {
        let f = fixture();
        let route = UploadRoute::UpdateImage {
            previous_key: "a.jpg".to_string(),
        };
        let mut widget = gadget();
        widget.position = 1;

        let report = f
            .service
            .upload_image(Some(&session()), route, &widget, jpeg())
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.kind, MutationKind::Replace);
        assert!(!f.assets.contains("a.jpg"));
        assert_eq!(report.completed.len(), 3);
    }

    #[tokio::test]
    async fn test_upload_image_rejects_oversized_file_before_upload() {
        let f = fixture();
        let source = ImageSource {
            content_type: "image/png".to_string(),
            bytes: vec![0u8; 5 * 1024 * 1024],
        };

        let result = f
            .service
            .upload_image(Some(&session()), UploadRoute::ImageUploader, &gadget(), source)
            .await;

        assert!(matches!(result, Err(MutationError::InvalidUpload(_))));
        assert!(f.assets.calls().is_empty());
        assert!(f.sheet.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_leaves_sheet_untouched() {
        let f = fixture();
        f.assets.fail_uploads(true);

        let report = f
            .service
            .upload_image(Some(&session()), UploadRoute::ImageUploader, &gadget(), jpeg())
            .await
            .unwrap();

        assert_eq!(report.outcome(), Outcome::Failed);
        assert!(f.sheet.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upload_flags_filename_mismatch() {
        let f = fixture();
        f.assets.rename_uploads_to("renamed.jpg");

        let report = f
            .service
            .upload_image(Some(&session()), UploadRoute::ImageUploader, &gadget(), jpeg())
            .await
            .unwrap();

        let mismatch = report.filename_mismatch.unwrap();
        assert_eq!(mismatch.expected, "gadget-222.jpg");
        assert_eq!(mismatch.actual, "renamed.jpg");
    }

    #[test]
    fn test_upload_name_uses_record_timestamp() {
        assert_eq!(upload_name(&gadget()), "gadget-222.jpg");
    }

    #[test]
    fn test_upload_name_without_timestamp_uses_current_time() {
        let mut record = gadget();
        record.time_stamp = String::new();
        let name = upload_name(&record);
        assert!(name.starts_with("gadget-"));
        assert!(name.ends_with(".jpg"));
        assert_ne!(name, "gadget-.jpg");
    }
}
