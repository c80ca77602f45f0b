//! Worksheet type

use ahash::AHashMap;

use crate::cell::{CellAddress, CellValue};
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

static EMPTY: CellValue = CellValue::Empty;

/// A worksheet (single named grid in a workbook)
///
/// Cells are stored sparsely; any position never written reads as
/// [`CellValue::Empty`].
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Non-empty cells keyed by (row, col)
    cells: AHashMap<(u32, u16), CellValue>,
    /// Highest row index ever written
    max_row: Option<u32>,
    /// Highest column index ever written
    max_col: Option<u16>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    // === Cell Access ===

    /// Get a cell value by row and column indices (0-based)
    pub fn value_at(&self, row: u32, col: u16) -> &CellValue {
        self.cells.get(&(row, col)).unwrap_or(&EMPTY)
    }

    /// Get a cell value by address string (e.g., "W2")
    pub fn value(&self, address: &str) -> Result<&CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.value_at(addr.row, addr.col))
    }

    /// Number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the sheet holds no values
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Highest row index that has held a value
    pub fn max_row(&self) -> Option<u32> {
        self.max_row
    }

    /// Highest column index that has held a value
    pub fn max_col(&self) -> Option<u16> {
        self.max_col
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices
    ///
    /// Writing [`CellValue::Empty`] clears the cell.
    pub fn set_value_at<V: Into<CellValue>>(&mut self, row: u32, col: u16, value: V) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col as u32, MAX_COLS - 1));
        }

        let value = value.into();
        if value.is_empty() {
            self.cells.remove(&(row, col));
            return Ok(());
        }

        self.max_row = Some(self.max_row.map_or(row, |m| m.max(row)));
        self.max_col = Some(self.max_col.map_or(col, |m| m.max(col)));
        self.cells.insert((row, col), value);
        Ok(())
    }

    /// Fill one row starting at `start_col` with consecutive values
    pub fn set_row<V: Into<CellValue>, I: IntoIterator<Item = V>>(
        &mut self,
        row: u32,
        start_col: u16,
        values: I,
    ) -> Result<()> {
        for (offset, value) in values.into_iter().enumerate() {
            let col = start_col as u32 + offset as u32;
            if col >= MAX_COLS as u32 {
                return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
            }
            self.set_value_at(row, col as u16, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_cells_read_empty() {
        let sheet = Worksheet::new("Material");
        assert_eq!(sheet.value_at(10, 22), &CellValue::Empty);
        assert!(sheet.is_empty());
        assert_eq!(sheet.max_row(), None);
    }

    #[test]
    fn test_set_and_get() {
        let mut sheet = Worksheet::new("CNC");
        sheet.set_value("W2", "برش").unwrap();
        sheet.set_value_at(1, 23, 150000.0).unwrap();

        assert_eq!(sheet.value("W2").unwrap(), &CellValue::string("برش"));
        assert_eq!(sheet.value_at(1, 23), &CellValue::Number(150000.0));
        assert_eq!(sheet.max_row(), Some(1));
        assert_eq!(sheet.max_col(), Some(23));
        assert_eq!(sheet.cell_count(), 2);
    }

    #[test]
    fn test_set_empty_clears() {
        let mut sheet = Worksheet::new("CNC");
        sheet.set_value_at(0, 0, "x").unwrap();
        sheet.set_value_at(0, 0, CellValue::Empty).unwrap();
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_set_row() {
        let mut sheet = Worksheet::new("Fittings");
        sheet
            .set_row(
                3,
                1,
                vec![
                    CellValue::string("F-01"),
                    CellValue::string("لولا"),
                    CellValue::string("عدد"),
                    CellValue::Number(85000.0),
                ],
            )
            .unwrap();
        assert_eq!(sheet.value("B4").unwrap(), &CellValue::string("F-01"));
        assert_eq!(sheet.value("E4").unwrap(), &CellValue::Number(85000.0));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut sheet = Worksheet::new("x");
        assert!(sheet.set_value_at(MAX_ROWS, 0, 1.0).is_err());
        assert!(sheet.set_value_at(0, MAX_COLS, 1.0).is_err());
    }
}
