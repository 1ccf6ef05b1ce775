//! Read-side access to the inventory sheet

use std::sync::Arc;

use super::addressing::{self, FIRST_COLUMN, IMAGE_COLUMN};
use super::mapper;
use super::models::{InventoryRecord, InventorySummary};
use crate::api::sheets::{A1Range, SheetStore};

/// Which records a caller may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Every record, with or without an image
    Admin,
    /// Only records that already have an image
    Public,
}

impl Audience {
    pub fn is_admin(self) -> bool {
        matches!(self, Audience::Admin)
    }
}

/// Fetches inventory records. Every call goes to the datastore; nothing is cached.
#[derive(Clone)]
pub struct InventoryQueryService {
    store: Arc<dyn SheetStore>,
    sheet: String,
}

impl InventoryQueryService {
    pub fn new(store: Arc<dyn SheetStore>, sheet: impl Into<String>) -> Self {
        Self {
            store,
            sheet: sheet.into(),
        }
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// All records visible to `audience`, or an empty list when the sheet is
    /// empty or cannot be read
    pub async fn get_all(&self, audience: Audience) -> Vec<InventoryRecord> {
        let range = A1Range::sheet(&self.sheet);
        match self.store.read(&range).await {
            Ok(rows) if rows.is_empty() => {
                log::debug!("Sheet {} is empty", self.sheet);
                Vec::new()
            }
            Ok(rows) => {
                let records = mapper::map_rows(&rows, audience.is_admin());
                log::debug!(
                    "Loaded {} records from {} rows ({:?} view)",
                    records.len(),
                    rows.len().saturating_sub(1),
                    audience
                );
                records
            }
            Err(e) => {
                log::error!("Failed to read inventory sheet {}: {:#}", self.sheet, e);
                Vec::new()
            }
        }
    }

    /// The record at `position`, or `None` when the row is empty or unreadable
    pub async fn get_one(&self, position: u32) -> Option<InventoryRecord> {
        if position == 0 {
            return None;
        }
        let row = addressing::record_row(position);
        let range = A1Range::row_span(&self.sheet, FIRST_COLUMN, IMAGE_COLUMN, row);

        let rows = match self.store.read(&range).await {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("Failed to read {}: {:#}", range, e);
                return None;
            }
        };

        let cells = rows.into_iter().next()?;
        if cells.is_empty() {
            return None;
        }
        Some(mapper::map_row(&cells, position))
    }

    /// Counters for a result set: total items and items without an image
    pub fn summary(records: &[InventoryRecord]) -> InventorySummary {
        InventorySummary::from_records(records)
    }
}
