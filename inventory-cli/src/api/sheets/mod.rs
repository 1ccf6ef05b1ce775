//! Spreadsheet datastore
//!
//! The inventory lives in a single sheet. Everything above this module talks to
//! it through [`SheetStore`], which reads and writes rectangular ranges of
//! optional text addressed in A1 notation.

pub mod client;
#[cfg(test)]
pub mod memory;
pub mod range;

pub use client::SheetsClient;
pub use range::{A1Range, CellRef};

use anyhow::Result;
use async_trait::async_trait;

/// One row of cells; `None` marks a cell the datastore did not return
pub type Row = Vec<Option<String>>;

/// Rows in sheet order
pub type Rows = Vec<Row>;

/// Tabular storage addressed by A1 ranges
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Read every populated row of `range`
    async fn read(&self, range: &A1Range) -> Result<Rows>;

    /// Overwrite the cells of `range` with `rows`
    async fn write(&self, range: &A1Range, rows: Rows) -> Result<()>;

    /// Add `rows` after the last populated row of the table found at `range`
    async fn append(&self, range: &A1Range, rows: Rows) -> Result<()>;
}

/// Build a single-cell row set
pub fn single_cell(value: impl Into<String>) -> Rows {
    vec![vec![Some(value.into())]]
}
