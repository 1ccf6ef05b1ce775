//! Spreadsheet rows → inventory records
//!
//! Columns are read by fixed position. Missing cells default, numeric cells are
//! parsed leniently and never produce an error.

use once_cell::sync::Lazy;
use regex::Regex;

use super::models::InventoryRecord;
use crate::api::sheets::Row;

/// Fixed column order of the inventory sheet
pub mod columns {
    pub const NAME: usize = 0;
    pub const CATEGORY: usize = 1;
    pub const PRICE: usize = 2;
    pub const RATING: usize = 3;
    pub const REVIEW: usize = 4;
    pub const QUANTITY: usize = 5;
    pub const DESCRIPTION: usize = 6;
    pub const TIME_STAMP: usize = 7;
    pub const IMAGE: usize = 8;
}

static FLOAT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("static pattern is valid")
});

static INT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+").expect("static pattern is valid"));

/// Map a full sheet (header first) to records.
///
/// Positions are assigned before visibility filtering, so a record keeps the
/// same position in the admin and public views.
pub fn map_rows(rows: &[Row], admin_view: bool) -> Vec<InventoryRecord> {
    rows.iter()
        .skip(1)
        .enumerate()
        .map(|(idx, row)| map_row(row, idx as u32 + 1))
        .filter(|record| admin_view || record.has_image())
        .collect()
}

/// Map a single data row that sits at `position`
pub fn map_row(row: &[Option<String>], position: u32) -> InventoryRecord {
    InventoryRecord {
        name: text(row, columns::NAME),
        category: text(row, columns::CATEGORY),
        price: parse_float(cell(row, columns::PRICE)),
        rating: parse_float(cell(row, columns::RATING)),
        review: text(row, columns::REVIEW),
        quantity: parse_int(cell(row, columns::QUANTITY)),
        description: text(row, columns::DESCRIPTION),
        time_stamp: text(row, columns::TIME_STAMP),
        position,
        image: image_url(cell(row, columns::IMAGE), position),
    }
}

fn cell(row: &[Option<String>], index: usize) -> Option<&str> {
    row.get(index).and_then(|c| c.as_deref())
}

fn text(row: &[Option<String>], index: usize) -> String {
    cell(row, index).unwrap_or_default().to_string()
}

/// Longest leading float, 0 when there is none
pub fn parse_float(value: Option<&str>) -> f64 {
    value
        .map(str::trim)
        .and_then(|v| FLOAT_PREFIX.find(v))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|f| f.is_finite())
        .unwrap_or(0.0)
}

/// Longest leading integer, 0 when there is none or it overflows
pub fn parse_int(value: Option<&str>) -> i64 {
    value
        .map(str::trim)
        .and_then(|v| INT_PREFIX.find(v))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(0)
}

fn image_url(value: Option<&str>, position: u32) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    match reqwest::Url::parse(value) {
        Ok(_) => Some(value.to_string()),
        Err(e) => {
            log::warn!(
                "Ignoring image cell of record {}: '{}' is not a URL ({})",
                position,
                value,
                e
            );
            None
        }
    }
}
