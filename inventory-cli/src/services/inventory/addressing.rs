//! Translation between record positions and sheet rows
//!
//! The sheet has one header row. Records are numbered by `position` (1-based,
//! header excluded), while upload and delete flows carry a 0-based row index.
//! Every sheet row used for reads or writes is computed here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of header rows above the first record
pub const HEADER_ROWS: u32 = 1;

/// Offset from a 0-based row index to the sheet row holding its image cell
pub const IMAGE_ROW_OFFSET: u32 = 2;

/// Column holding the record name (first mapped column)
pub const FIRST_COLUMN: &str = "A";

/// Column holding the image URL (last mapped column)
pub const IMAGE_COLUMN: &str = "I";

/// 1-based row number within the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SheetRow(pub u32);

impl fmt::Display for SheetRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 0-based index of a record within the header-excluded rows.
///
/// This is the opaque per-row key that travels with an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowIndex(pub u32);

impl RowIndex {
    /// Row index of the record at `position`. Positions start at 1.
    pub fn from_position(position: u32) -> Option<Self> {
        position.checked_sub(1).map(RowIndex)
    }

    pub fn position(self) -> u32 {
        self.0 + 1
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sheet row holding the record at `position` (direct addressing)
pub fn record_row(position: u32) -> SheetRow {
    SheetRow(position + HEADER_ROWS)
}

/// Sheet row whose image cell an upload, replace or delete targets.
///
/// The row index is 0-based, so index 1 is the second record (position 2)
/// and lands on sheet row 3: `index + 2` equals `record_row(index + 1)`.
pub fn image_cell_row(index: RowIndex) -> SheetRow {
    SheetRow(index.0 + IMAGE_ROW_OFFSET)
}
