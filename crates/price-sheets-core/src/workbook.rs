//! Workbook: the sheets of one file, in tab order

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;

/// Values of every sheet in one workbook file
///
/// Sheets keep the order of the workbook's tabs. Names are unique and
/// compared exactly.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Sheet at a tab position (0-based)
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Sheet whose name matches `name` exactly
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets().find(|sheet| sheet.name() == name)
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.worksheets.iter().map(|ws| ws.name())
    }

    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Append a sheet after the existing tabs and return its position
    pub fn add_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        match self.worksheet_by_name(worksheet.name()) {
            Some(existing) => Err(Error::DuplicateSheetName(existing.name().to_string())),
            None => {
                self.worksheets.push(worksheet);
                Ok(self.worksheets.len() - 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut book = Workbook::empty();
        assert!(book.is_empty());

        assert_eq!(book.add_worksheet(Worksheet::new("Material")).unwrap(), 0);
        assert_eq!(book.add_worksheet(Worksheet::new("CNC")).unwrap(), 1);

        assert_eq!(book.sheet_count(), 2);
        assert_eq!(book.worksheet(1).unwrap().name(), "CNC");
        assert!(book.worksheet_by_name("cnc").is_none());
        assert_eq!(book.sheet_names().collect::<Vec<_>>(), vec!["Material", "CNC"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut book = Workbook::empty();
        book.add_worksheet(Worksheet::new("All")).unwrap();
        assert!(matches!(
            book.add_worksheet(Worksheet::new("All")),
            Err(Error::DuplicateSheetName(name)) if name == "All"
        ));
        assert_eq!(book.sheet_count(), 1);
    }
}
