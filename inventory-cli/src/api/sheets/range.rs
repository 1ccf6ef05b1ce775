//! A1-notation ranges

use std::fmt;

use crate::services::inventory::addressing::SheetRow;

/// A cell reference such as `I3`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub column: String,
    pub row: SheetRow,
}

impl CellRef {
    pub fn new(column: impl Into<String>, row: SheetRow) -> Self {
        Self {
            column: column.into(),
            row,
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// A rectangular range in A1 notation, always scoped to one sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: String,
    pub start: Option<CellRef>,
    pub end: Option<CellRef>,
}

impl A1Range {
    /// The whole sheet
    pub fn sheet(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            start: None,
            end: None,
        }
    }

    /// A single cell, e.g. `inventory!I3`
    pub fn cell(sheet: impl Into<String>, column: impl Into<String>, row: SheetRow) -> Self {
        Self {
            sheet: sheet.into(),
            start: Some(CellRef::new(column, row)),
            end: None,
        }
    }

    /// Columns `first..=last` of one row, e.g. `inventory!A2:I2`
    pub fn row_span(
        sheet: impl Into<String>,
        first: impl Into<String>,
        last: impl Into<String>,
        row: SheetRow,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            start: Some(CellRef::new(first, row)),
            end: Some(CellRef::new(last, row)),
        }
    }

    /// Sheet name quoted when it contains characters A1 notation reserves
    fn quoted_sheet(&self) -> String {
        let plain = self
            .sheet
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if plain {
            self.sheet.clone()
        } else {
            format!("'{}'", self.sheet.replace('\'', "''"))
        }
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sheet = self.quoted_sheet();
        match (&self.start, &self.end) {
            (None, _) => write!(f, "{}", sheet),
            (Some(start), None) => write!(f, "{}!{}", sheet, start),
            (Some(start), Some(end)) => write!(f, "{}!{}:{}", sheet, start, end),
        }
    }
}

/// Convert a column name (`A`, `I`, `AA`) to its 0-based offset
pub fn column_offset(column: &str) -> Option<usize> {
    if column.is_empty() {
        return None;
    }
    let mut value = 0usize;
    for c in column.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        value = value * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(value - 1)
}
