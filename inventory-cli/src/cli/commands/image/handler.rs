//! Image command handler

use anyhow::{Context, Result, bail};
use colored::*;
use dialoguer::Confirm;
use is_terminal::IsTerminal;
use std::path::Path;

use super::ImageCommands;
use crate::api::identity::SessionToken;
use crate::cli::output::format_report;
use crate::services::images::routes::content_type_for;
use crate::services::images::{ImageSource, MutationReport, Outcome, UploadRoute};
use crate::services::inventory::{InventoryRecord, RowIndex};

pub async fn handle_image_command(command: ImageCommands) -> Result<()> {
    let manager = crate::client_manager()?;
    let query = manager.query_service();
    let images = manager.image_service();
    let session = stored_session().await?;

    let report = match command {
        ImageCommands::Upload { position, file } => {
            let record = load_record(&query, position).await?;
            if let Some(url) = &record.image {
                bail!(
                    "Item {} already has an image ({}); use `image replace`",
                    position,
                    url
                );
            }
            let source = read_image(&file)?;
            images
                .upload_image(session.as_ref(), UploadRoute::ImageUploader, &record, source)
                .await?
        }
        ImageCommands::Replace { position, file } => {
            let record = load_record(&query, position).await?;
            let Some(previous_key) = record.image_key().map(str::to_string) else {
                bail!("Item {} has no image to replace; use `image upload`", position);
            };
            let source = read_image(&file)?;
            let route = UploadRoute::UpdateImage { previous_key };
            images
                .upload_image(session.as_ref(), route, &record, source)
                .await?
        }
        ImageCommands::Delete { position, yes } => {
            let record = load_record(&query, position).await?;
            let Some(url) = record.image.clone() else {
                bail!("Item {} has no image", position);
            };
            if !yes && !confirm_delete(&record)? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            let row = RowIndex::from_position(record.position)
                .with_context(|| format!("Invalid position {}", record.position))?;
            images.delete(session.as_ref(), row, &url).await?
        }
    };

    finish(report)
}

async fn stored_session() -> Result<Option<SessionToken>> {
    let config = crate::global_config()?;
    Ok(config.current_session().await?.map(|s| s.token))
}

async fn load_record(
    query: &crate::services::inventory::InventoryQueryService,
    position: u32,
) -> Result<InventoryRecord> {
    query
        .get_one(position)
        .await
        .with_context(|| format!("No item at position {}", position))
}

fn read_image(path: &Path) -> Result<ImageSource> {
    let content_type = content_type_for(path)
        .with_context(|| format!("Cannot tell the image type of {}", path.display()))?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image file {}", path.display()))?;
    Ok(ImageSource {
        content_type: content_type.to_string(),
        bytes,
    })
}

fn confirm_delete(record: &InventoryRecord) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        bail!("Refusing to delete without confirmation; pass --yes");
    }
    Confirm::new()
        .with_prompt(format!(
            "Delete the image of '{}' (position {})?",
            record.name, record.position
        ))
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

fn finish(report: MutationReport) -> Result<()> {
    println!("{}", format_report(&report));
    match report.outcome() {
        Outcome::Succeeded => Ok(()),
        outcome => bail!("Image {} {}", report.kind, outcome),
    }
}
