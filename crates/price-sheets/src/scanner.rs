//! Row iteration over worksheets
//!
//! Two scanning modes exist. A block scan walks down from a start row and
//! stops for good at the first row whose key columns are all blank; rows
//! below that gap are never visited, even if they hold data. A section scan
//! walks a single aggregate sheet in which caption rows switch the current
//! category.

use std::iter::FusedIterator;

use price_sheets_core::{CellValue, Worksheet};

use crate::category::Category;
use crate::profile::{Column, SectionSpec};

/// One worksheet row, read lazily
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    sheet: &'a Worksheet,
    index: u32,
}

impl<'a> RawRow<'a> {
    pub fn new(sheet: &'a Worksheet, index: u32) -> Self {
        Self { sheet, index }
    }

    /// 0-based row index
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Spreadsheet row number (1-based)
    pub fn number(&self) -> u32 {
        self.index + 1
    }

    /// Value in `column` of this row
    pub fn cell(&self, column: Column) -> &'a CellValue {
        self.sheet.value_at(self.index, column.index())
    }

    /// Check if every one of `columns` is blank
    pub fn all_blank(&self, columns: &[Column]) -> bool {
        columns.iter().all(|c| self.cell(*c).is_blank())
    }
}

/// Entry points for both scanning modes
pub struct TableScanner;

impl TableScanner {
    /// Contiguous block starting at `start_row` (0-based)
    pub fn block<'a>(sheet: &'a Worksheet, start_row: u32, key_columns: &[Column]) -> BlockScan<'a> {
        BlockScan {
            sheet,
            next: start_row,
            key_columns: key_columns.to_vec(),
            done: key_columns.is_empty(),
        }
    }

    /// Section-structured aggregate sheet
    pub fn sections<'a>(sheet: &'a Worksheet, spec: &'a SectionSpec) -> SectionScan<'a> {
        let last = sheet
            .max_row()
            .map(|max| max.min(spec.max_rows.saturating_sub(1)));
        SectionScan {
            sheet,
            spec,
            next: 0,
            last,
            current: None,
        }
    }
}

/// Iterator over a contiguous block of rows
///
/// Not restartable: once the cutoff row is seen the scan is exhausted.
#[derive(Debug, Clone)]
pub struct BlockScan<'a> {
    sheet: &'a Worksheet,
    next: u32,
    key_columns: Vec<Column>,
    done: bool,
}

impl<'a> Iterator for BlockScan<'a> {
    type Item = RawRow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let in_bounds = self.sheet.max_row().is_some_and(|max| self.next <= max);
        let row = RawRow::new(self.sheet, self.next);
        if !in_bounds || row.all_blank(&self.key_columns) {
            self.done = true;
            return None;
        }
        self.next += 1;
        Some(row)
    }
}

impl FusedIterator for BlockScan<'_> {}

/// What a section scan found on one row
#[derive(Debug, Clone, Copy)]
pub enum SectionRow<'a> {
    /// A caption row; it switches the current category and carries no data
    Marker { row: u32, category: Category },
    /// A data row attributed to the current category
    Data { category: Category, row: RawRow<'a> },
    /// A data row seen before any caption; it is discarded
    Unassigned { row: RawRow<'a> },
}

/// Iterator over the rows of an aggregate sheet
#[derive(Debug, Clone)]
pub struct SectionScan<'a> {
    sheet: &'a Worksheet,
    spec: &'a SectionSpec,
    next: u32,
    last: Option<u32>,
    current: Option<Category>,
}

impl<'a> SectionScan<'a> {
    fn classify(&mut self, row: RawRow<'a>) -> Option<SectionRow<'a>> {
        if let Some(caption) = row.cell(self.spec.marker_column).as_str() {
            if let Some(category) = self.spec.rules.first_match(caption) {
                self.current = Some(*category);
                return Some(SectionRow::Marker {
                    row: row.index(),
                    category: *category,
                });
            }
        }

        let columns = &self.spec.columns;
        let has_code = columns.code.map_or(true, |c| !row.cell(c).is_blank());
        if !has_code || row.cell(columns.name).is_blank() {
            return None;
        }

        Some(match self.current {
            Some(category) => SectionRow::Data { category, row },
            None => SectionRow::Unassigned { row },
        })
    }
}

impl<'a> Iterator for SectionScan<'a> {
    type Item = SectionRow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let last = self.last?;
        while self.next <= last {
            let row = RawRow::new(self.sheet, self.next);
            self.next += 1;
            if let Some(item) = self.classify(row) {
                return Some(item);
            }
        }
        None
    }
}

impl FusedIterator for SectionScan<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ExtractionProfile;

    #[test]
    fn test_block_stops_at_first_gap() {
        let mut sheet = Worksheet::new("Fittings");
        for (row, name) in [(1, "لولا"), (2, "ریل"), (4, "دستگیره")] {
            sheet.set_value_at(row, 22, name).unwrap();
        }

        let rows: Vec<u32> = TableScanner::block(&sheet, 1, &[Column::new(22)])
            .map(|r| r.index())
            .collect();
        assert_eq!(rows, vec![1, 2]);
    }

    #[test]
    fn test_block_continues_while_any_key_present() {
        let mut sheet = Worksheet::new("CNC");
        sheet.set_value_at(3, 1, "C-1").unwrap();
        sheet.set_value_at(4, 2, "برش").unwrap();
        sheet.set_value_at(5, 1, "   ").unwrap();
        sheet.set_value_at(5, 4, 100).unwrap();

        let keys = [Column::new(1), Column::new(2)];
        let rows: Vec<u32> = TableScanner::block(&sheet, 3, &keys).map(|r| r.index()).collect();
        assert_eq!(rows, vec![3, 4]);
    }

    #[test]
    fn test_block_is_fused() {
        let mut sheet = Worksheet::new("CNC");
        sheet.set_value_at(0, 0, "a").unwrap();
        sheet.set_value_at(2, 0, "b").unwrap();

        let mut scan = TableScanner::block(&sheet, 0, &[Column::new(0)]);
        assert!(scan.next().is_some());
        assert!(scan.next().is_none());
        assert!(scan.next().is_none());
    }

    #[test]
    fn test_block_on_empty_sheet() {
        let sheet = Worksheet::new("Material");
        assert_eq!(TableScanner::block(&sheet, 1, &[Column::new(22)]).count(), 0);
    }

    #[test]
    fn test_sections() {
        let mut sheet = Worksheet::new("All");
        sheet.set_value_at(0, 0, "قیمت کل").unwrap();
        sheet.set_row(1, 1, ["X-1", "orphan"]).unwrap();
        sheet.set_value_at(4, 0, "یراق آلات").unwrap();
        sheet.set_row(5, 1, ["کد", "قیمت"]).unwrap();
        sheet.set_row(6, 1, ["F-1", "لولا", "عدد"]).unwrap();
        sheet.set_value_at(6, 4, 120000).unwrap();
        sheet.set_value_at(7, 2, "no code").unwrap();
        sheet.set_value_at(9, 0, "CNC").unwrap();
        sheet.set_value_at(10, 1, 101).unwrap();
        sheet.set_value_at(10, 2, "برش").unwrap();

        let profile = ExtractionProfile::per_category();
        let spec = profile.aggregate.as_ref().unwrap();

        let items: Vec<String> = TableScanner::sections(&sheet, spec)
            .map(|item| match item {
                SectionRow::Marker { row, category } => format!("marker {} {}", row, category),
                SectionRow::Data { category, row } => format!("data {} {}", row.index(), category),
                SectionRow::Unassigned { row } => format!("unassigned {}", row.index()),
            })
            .collect();

        assert_eq!(
            items,
            vec![
                "unassigned 1",
                "marker 4 fittings",
                "data 5 fittings",
                "data 6 fittings",
                "marker 9 cncOperations",
                "data 10 cncOperations",
            ]
        );
    }

    #[test]
    fn test_sections_respect_row_limit() {
        let mut sheet = Worksheet::new("All");
        sheet.set_value_at(0, 0, "CNC").unwrap();
        sheet.set_row(3, 1, ["C-1", "برش"]).unwrap();
        sheet.set_row(8, 1, ["C-2", "سوراخ"]).unwrap();

        let mut spec = ExtractionProfile::per_category().aggregate.unwrap();
        spec.max_rows = 5;
        let data = TableScanner::sections(&sheet, &spec)
            .filter(|item| matches!(item, SectionRow::Data { .. }))
            .count();
        assert_eq!(data, 1);
    }
}
