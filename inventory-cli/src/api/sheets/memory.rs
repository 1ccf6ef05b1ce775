//! In-memory sheet used by tests

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::Mutex;

use super::range::column_offset;
use super::{A1Range, Rows, SheetStore};

/// A single sheet held in memory, with switches to simulate upstream failures
#[derive(Debug, Default)]
pub struct MemorySheet {
    name: String,
    grid: Mutex<Rows>,
    log: Mutex<Vec<String>>,
    fail_reads: Mutex<bool>,
    fail_writes: Mutex<bool>,
}

impl MemorySheet {
    pub fn new(name: impl Into<String>, rows: Rows) -> Self {
        Self {
            name: name.into(),
            grid: Mutex::new(rows),
            ..Default::default()
        }
    }

    /// Build from plain string rows; empty strings become empty cells
    pub fn from_strings(name: impl Into<String>, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|c| Some(c.to_string())).collect())
            .collect();
        Self::new(name, rows)
    }

    pub fn fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    /// Calls made so far, formatted as `read inventory`, `write inventory!I3 = [..]`
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Value of a cell, `None` when the cell is outside the grid or empty
    pub fn cell(&self, column: &str, row: u32) -> Option<String> {
        let col = column_offset(column)?;
        let grid = self.grid.lock().unwrap();
        grid.get(row.checked_sub(1)? as usize)
            .and_then(|r| r.get(col).cloned())
            .flatten()
    }

    fn check_sheet(&self, range: &A1Range) -> Result<()> {
        if range.sheet != self.name {
            bail!("Unable to parse range: {}", range);
        }
        Ok(())
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn put(grid: &mut Rows, row: usize, col: usize, value: Option<String>) {
        if grid.len() <= row {
            grid.resize_with(row + 1, Vec::new);
        }
        let cells = &mut grid[row];
        if cells.len() <= col {
            cells.resize(col + 1, None);
        }
        cells[col] = value;
    }

    fn start_of(range: &A1Range) -> Result<(usize, usize)> {
        let Some(start) = &range.start else {
            return Ok((0, 0));
        };
        let col = column_offset(&start.column)
            .ok_or_else(|| anyhow::anyhow!("Invalid column in range {}", range))?;
        let row = start
            .row
            .0
            .checked_sub(1)
            .ok_or_else(|| anyhow::anyhow!("Invalid row in range {}", range))?;
        Ok((row as usize, col))
    }
}

/// Trailing empty cells and rows are dropped, as the hosted API does
fn trim(mut rows: Rows) -> Rows {
    for row in rows.iter_mut() {
        while matches!(row.last(), Some(None)) || matches!(row.last(), Some(Some(s)) if s.is_empty()) {
            row.pop();
        }
    }
    while matches!(rows.last(), Some(r) if r.is_empty()) {
        rows.pop();
    }
    rows
}

#[async_trait]
impl SheetStore for MemorySheet {
    async fn read(&self, range: &A1Range) -> Result<Rows> {
        self.record(format!("read {}", range));
        if *self.fail_reads.lock().unwrap() {
            bail!("simulated read failure");
        }
        self.check_sheet(range)?;

        let grid = self.grid.lock().unwrap().clone();
        let (start_row, start_col) = Self::start_of(range)?;
        let rows: Rows = match (&range.start, &range.end) {
            (None, _) => grid,
            (Some(_), end) => {
                let (end_row, end_col) = match end {
                    Some(end) => {
                        let col = column_offset(&end.column)
                            .ok_or_else(|| anyhow::anyhow!("Invalid column in range {}", range))?;
                        (end.row.0.saturating_sub(1) as usize, col)
                    }
                    None => (start_row, start_col),
                };
                grid.iter()
                    .skip(start_row)
                    .take(end_row.saturating_sub(start_row) + 1)
                    .map(|row| {
                        row.iter()
                            .skip(start_col)
                            .take(end_col.saturating_sub(start_col) + 1)
                            .cloned()
                            .collect()
                    })
                    .collect()
            }
        };
        Ok(trim(rows))
    }

    async fn write(&self, range: &A1Range, rows: Rows) -> Result<()> {
        self.record(format!("write {} = {:?}", range, rows));
        if *self.fail_writes.lock().unwrap() {
            bail!("simulated write failure");
        }
        self.check_sheet(range)?;

        let (start_row, start_col) = Self::start_of(range)?;
        let mut grid = self.grid.lock().unwrap();
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                Self::put(&mut grid, start_row + r, start_col + c, value);
            }
        }
        Ok(())
    }

    async fn append(&self, range: &A1Range, rows: Rows) -> Result<()> {
        self.record(format!("append {} = {:?}", range, rows));
        if *self.fail_writes.lock().unwrap() {
            bail!("simulated write failure");
        }
        self.check_sheet(range)?;

        let (mut row, col) = Self::start_of(range)?;
        let mut grid = self.grid.lock().unwrap();
        while grid
            .get(row)
            .and_then(|cells| cells.get(col))
            .is_some_and(|cell| cell.as_deref().is_some_and(|s| !s.is_empty()))
        {
            row += 1;
        }
        for (r, values) in rows.into_iter().enumerate() {
            for (c, value) in values.into_iter().enumerate() {
                Self::put(&mut grid, row + r, col + c, value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::sheets::single_cell;
    use crate::services::inventory::addressing::SheetRow;

    #[tokio::test]
    async fn test_write_then_read_cell() {
        let sheet = MemorySheet::from_strings("inventory", &[&["name"], &["Widget"]]);
        let cell = A1Range::cell("inventory", "I", SheetRow(2));

        sheet.write(&cell, single_cell("https://x/a.jpg")).await.unwrap();

        assert_eq!(sheet.cell("I", 2).as_deref(), Some("https://x/a.jpg"));
        let rows = sheet.read(&cell).await.unwrap();
        assert_eq!(rows, single_cell("https://x/a.jpg"));
    }

    #[tokio::test]
    async fn test_read_trims_trailing_empty_cells() {
        let sheet = MemorySheet::from_strings("inventory", &[&["name", "", ""]]);
        let rows = sheet.read(&A1Range::sheet("inventory")).await.unwrap();
        assert_eq!(rows, vec![vec![Some("name".to_string())]]);
    }

    #[tokio::test]
    async fn test_append_lands_after_populated_cells() {
        let sheet = MemorySheet::from_strings(
            "inventory",
            &[&["a", "url-1"], &["b", "url-2"], &["c", ""]],
        );
        let range = A1Range::cell("inventory", "B", SheetRow(1));

        sheet.append(&range, single_cell("url-3")).await.unwrap();

        assert_eq!(sheet.cell("B", 3).as_deref(), Some("url-3"));
    }

    #[tokio::test]
    async fn test_unknown_sheet_is_an_error() {
        let sheet = MemorySheet::new("inventory", Vec::new());
        assert!(sheet.read(&A1Range::sheet("other")).await.is_err());
    }
}
