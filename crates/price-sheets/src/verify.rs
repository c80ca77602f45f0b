//! Checks on a finished catalog

use std::collections::BTreeMap;
use std::fmt;

use crate::category::Category;
use crate::model::Catalog;

/// A record that breaks a catalog invariant
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    EmptyCode { category: Category, index: usize },
    EmptyUnit { category: Category, code: String },
    InvalidPrice { category: Category, code: String, price: f64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::EmptyCode { category, index } => {
                write!(f, "{} #{} has an empty code", category, index + 1)
            }
            Violation::EmptyUnit { category, code } => {
                write!(f, "{} {} has an empty unit", category, code)
            }
            Violation::InvalidPrice {
                category,
                code,
                price,
            } => write!(f, "{} {} has price {}", category, code, price),
        }
    }
}

/// Findings of [`verify`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerifyReport {
    pub violations: Vec<Violation>,
    /// Codes used by more than one record, with their use count
    pub duplicate_codes: Vec<(String, usize)>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.duplicate_codes.is_empty()
    }
}

/// Check every record: non-empty code and unit, finite non-negative price,
/// and report codes shared across the catalog
pub fn verify(catalog: &Catalog) -> VerifyReport {
    let mut report = VerifyReport::default();
    let mut uses: BTreeMap<&str, usize> = BTreeMap::new();
    let mut positions: BTreeMap<Category, usize> = BTreeMap::new();

    for (category, record) in catalog.records() {
        let position = positions.entry(category).or_default();
        let code = record.code();
        if code.trim().is_empty() {
            report.violations.push(Violation::EmptyCode {
                category,
                index: *position,
            });
        } else {
            *uses.entry(code).or_default() += 1;
        }
        if record.unit().trim().is_empty() {
            report.violations.push(Violation::EmptyUnit {
                category,
                code: code.to_string(),
            });
        }
        let price = record.price();
        if !price.is_finite() || price < 0.0 {
            report.violations.push(Violation::InvalidPrice {
                category,
                code: code.to_string(),
                price,
            });
        }
        *position += 1;
    }

    report.duplicate_codes = uses
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(code, count)| (code.to_string(), count))
        .collect();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CatalogItem;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_catalog() {
        let mut catalog = Catalog::default();
        catalog.push(CatalogItem::new(Category::Materials, "MAT-1".into(), "MDF".into(), "متر مربع".into(), 1.0));
        catalog.push(CatalogItem::new(Category::Fittings, "FITTING-1".into(), "لولا".into(), "عدد".into(), 0.0));
        assert!(verify(&catalog).is_clean());
    }

    #[test]
    fn test_violations() {
        let mut catalog = Catalog::default();
        catalog.push(CatalogItem::new(Category::CncOperations, "".into(), "برش".into(), "عدد".into(), 1.0));
        catalog.push(CatalogItem::new(Category::CncOperations, "CNC-2".into(), "سوراخ".into(), " ".into(), f64::NAN));
        catalog.push(CatalogItem::new(Category::Fittings, "CNC-2".into(), "ریل".into(), "عدد".into(), -1.0));

        let report = verify(&catalog);
        assert!(!report.is_clean());
        assert_eq!(report.violations.len(), 4);
        assert_eq!(
            report.violations[0],
            Violation::EmptyCode {
                category: Category::CncOperations,
                index: 0
            }
        );
        assert_eq!(report.violations[1].to_string(), "cncOperations CNC-2 has an empty unit");
        assert_eq!(report.duplicate_codes, vec![("CNC-2".to_string(), 2)]);
    }
}
