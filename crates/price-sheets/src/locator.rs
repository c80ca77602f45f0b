//! Sheet resolution by alias

use price_sheets_core::{Workbook, Worksheet};

use crate::category::Category;
use crate::error::{CatalogError, CatalogResult};

/// Resolves logical sheets to worksheets of one workbook
#[derive(Debug, Clone, Copy)]
pub struct SheetLocator<'a> {
    workbook: &'a Workbook,
}

impl<'a> SheetLocator<'a> {
    pub fn new(workbook: &'a Workbook) -> Self {
        Self { workbook }
    }

    /// First worksheet whose name equals one of `aliases`, tried in alias order
    ///
    /// Names are compared exactly after trimming surrounding whitespace.
    pub fn find<S: AsRef<str>>(&self, aliases: &[S]) -> Option<&'a Worksheet> {
        aliases.iter().find_map(|alias| {
            let alias = alias.as_ref().trim();
            self.workbook
                .worksheets()
                .find(|sheet| sheet.name().trim() == alias)
        })
    }

    /// Resolve the sheet of a category
    pub fn resolve<S: AsRef<str>>(
        &self,
        category: Category,
        aliases: &[S],
    ) -> CatalogResult<&'a Worksheet> {
        self.find(aliases).ok_or_else(|| CatalogError::SheetNotFound {
            category,
            aliases: aliases.iter().map(|a| a.as_ref().to_string()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workbook(names: &[&str]) -> Workbook {
        let mut wb = Workbook::empty();
        for name in names {
            wb.add_worksheet(Worksheet::new(*name)).unwrap();
        }
        wb
    }

    #[test]
    fn test_alias_order_wins() {
        let wb = workbook(&["متریال", "Material"]);
        let locator = SheetLocator::new(&wb);
        let sheet = locator
            .resolve(Category::Materials, &["Material", "متریال"])
            .unwrap();
        assert_eq!(sheet.name(), "Material");
    }

    #[test]
    fn test_later_alias_used_when_first_missing() {
        let wb = workbook(&["Data", "نوار"]);
        let locator = SheetLocator::new(&wb);
        let sheet = locator
            .resolve(Category::EdgeBanding, &["NavarShiarFarsi", "نوار"])
            .unwrap();
        assert_eq!(sheet.name(), "نوار");
    }

    #[test]
    fn test_exact_match_only() {
        let wb = workbook(&["CNC old", "cnc", " Fittings "]);
        let locator = SheetLocator::new(&wb);
        assert!(locator.find(&["CNC"]).is_none());
        assert_eq!(locator.find(&["Fittings"]).unwrap().name(), " Fittings ");
    }

    #[test]
    fn test_sheet_not_found() {
        let wb = workbook(&["Data"]);
        let err = SheetLocator::new(&wb)
            .resolve(Category::Fittings, &["Fittings", "یراق آلات"])
            .unwrap_err();
        match err {
            CatalogError::SheetNotFound { category, aliases } => {
                assert_eq!(category, Category::Fittings);
                assert_eq!(aliases, vec!["Fittings", "یراق آلات"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
