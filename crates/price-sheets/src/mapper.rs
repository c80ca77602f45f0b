//! Field assignment for scanned rows
//!
//! In static mode the columns come straight from the profile. In discovery
//! mode a window of the sheet is searched, column by column, for cells
//! matching the category's content markers; the first column with any match
//! becomes the name column, with price one column to its right and unit two
//! columns to its right. Only the matching rows are records.

use price_sheets_core::{CellValue, Worksheet};

use crate::category::Category;
use crate::profile::{row_index, Column, ColumnLayout, DiscoverySpec};
use crate::scanner::RawRow;

/// Raw cell values assigned to record fields
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValues {
    /// Spreadsheet row number (1-based)
    pub row: u32,
    pub code: CellValue,
    pub name: CellValue,
    pub unit: CellValue,
    pub price: CellValue,
}

/// Result of a successful column discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    /// Column holding the names
    pub column: Column,
    /// 0-based indices of the rows whose name cell matched a marker
    pub rows: Vec<u32>,
}

impl Discovered {
    /// Column layout implied by the discovered name column
    pub fn layout(&self) -> ColumnLayout {
        ColumnLayout {
            code: None,
            name: self.column,
            unit: Some(self.column.offset(2)),
            price: self.column.offset(1),
        }
    }
}

/// Assigns cells to fields
pub struct ColumnMapper;

impl ColumnMapper {
    /// Read the fields of `row` through a fixed layout
    pub fn map(row: &RawRow<'_>, layout: &ColumnLayout) -> FieldValues {
        let optional = |column: Option<Column>| {
            column
                .map(|c| row.cell(c).clone())
                .unwrap_or_default()
        };
        FieldValues {
            row: row.number(),
            code: optional(layout.code),
            name: row.cell(layout.name).clone(),
            unit: optional(layout.unit),
            price: row.cell(layout.price).clone(),
        }
    }

    /// Search the discovery window for `category`'s markers
    ///
    /// Returns `None` when no cell in the window matches.
    pub fn discover(sheet: &Worksheet, spec: &DiscoverySpec, category: Category) -> Option<Discovered> {
        let first_row = row_index(spec.first_row);
        let last_row = row_index(spec.last_row);

        (spec.first_column.index()..=spec.last_column.index())
            .map(Column::new)
            .find_map(|column| {
                let rows: Vec<u32> = (first_row..=last_row)
                    .filter(|row| {
                        sheet
                            .value_at(*row, column.index())
                            .to_text()
                            .is_some_and(|text| spec.markers.first_match(&text) == Some(&category))
                    })
                    .collect();
                (!rows.is_empty()).then_some(Discovered { column, rows })
            })
    }
}
