//! Catalog assembly
//!
//! Records keep the order in which they were extracted. A record without a
//! source code gets `<PREFIX>-<n>`, where `n` is its 1-based position among
//! the records of its category. Duplicates are never merged; shared codes
//! are reported as collisions instead.

use std::collections::BTreeMap;

use crate::category::Category;
use crate::model::{Catalog, CatalogItem, PricingConfig};
use crate::normalizer::NormalizedRow;

/// Normalized rows of one category in extraction order
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRows {
    pub category: Category,
    pub rows: Vec<NormalizedRow>,
}

/// A code shared by several records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeCollision {
    pub code: String,
    /// Category of the first record using the code
    pub category: Category,
    pub count: usize,
    /// Spreadsheet rows of the records, where known
    pub rows: Vec<u32>,
}

/// Result of assembly
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub catalog: Catalog,
    pub collisions: Vec<CodeCollision>,
}

pub struct CatalogAssembler;

impl CatalogAssembler {
    /// Synthetic code for the record at 1-based `position` in `category`
    pub fn synthetic_code(category: Category, position: usize) -> String {
        format!("{}-{}", category.code_prefix(), position)
    }

    /// Turn the rows of one category into records
    pub fn items(category: Category, rows: Vec<NormalizedRow>) -> Vec<CatalogItem> {
        rows.into_iter()
            .enumerate()
            .map(|(idx, row)| {
                let code = row
                    .code
                    .unwrap_or_else(|| Self::synthetic_code(category, idx + 1));
                CatalogItem::new(category, code, row.name, row.unit, row.price)
            })
            .collect()
    }

    /// Build the catalog from per-category rows and the resolved pricing
    pub fn assemble(streams: Vec<CategoryRows>, pricing: PricingConfig) -> Assembled {
        let mut catalog = Catalog {
            pricing_config: pricing,
            ..Catalog::default()
        };
        let mut uses: BTreeMap<String, (Category, Vec<Option<u32>>)> = BTreeMap::new();

        for stream in streams {
            let source_rows: Vec<Option<u32>> = stream.rows.iter().map(|r| r.row).collect();
            for (item, row) in Self::items(stream.category, stream.rows)
                .into_iter()
                .zip(source_rows)
            {
                uses.entry(item.record().code().to_string())
                    .or_insert_with(|| (item.category(), Vec::new()))
                    .1
                    .push(row);
                catalog.push(item);
            }
        }

        let collisions = uses
            .into_iter()
            .filter(|(_, (_, rows))| rows.len() > 1)
            .map(|(code, (category, rows))| CodeCollision {
                code,
                category,
                count: rows.len(),
                rows: rows.into_iter().flatten().collect(),
            })
            .collect();

        Assembled {
            catalog,
            collisions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CatalogRecord;
    use pretty_assertions::assert_eq;

    fn row(row: u32, code: Option<&str>, name: &str, price: f64) -> NormalizedRow {
        NormalizedRow {
            row: Some(row),
            code: code.map(str::to_string),
            name: name.to_string(),
            unit: "عدد".to_string(),
            price,
            malformed: vec![],
        }
    }

    #[test]
    fn test_synthetic_codes_follow_position() {
        let items = CatalogAssembler::items(
            Category::Fittings,
            vec![
                row(2, None, "لولا", 1.0),
                row(3, Some("F-77"), "ریل", 2.0),
                row(4, None, "دستگیره", 3.0),
            ],
        );
        let codes: Vec<&str> = items.iter().map(|i| i.record().code()).collect();
        assert_eq!(codes, vec!["FITTING-1", "F-77", "FITTING-3"]);
    }

    #[test]
    fn test_assemble_keeps_order_and_pricing() {
        let pricing = PricingConfig {
            wastage_percentage: 7.0,
            ..PricingConfig::default()
        };
        let assembled = CatalogAssembler::assemble(
            vec![
                CategoryRows {
                    category: Category::Materials,
                    rows: vec![row(2, None, "MDF", 10.0), row(3, None, "PVC", 20.0)],
                },
                CategoryRows {
                    category: Category::CncOperations,
                    rows: vec![row(2, None, "برش", 5.0)],
                },
            ],
            pricing,
        );

        let catalog = assembled.catalog;
        assert!(assembled.collisions.is_empty());
        assert_eq!(catalog.pricing_config.wastage_percentage, 7.0);
        assert_eq!(
            catalog.materials.iter().map(|m| m.code()).collect::<Vec<_>>(),
            vec!["MAT-1", "MAT-2"]
        );
        assert_eq!(catalog.cnc_operations[0].code, "CNC-1");
        assert!(catalog.fittings.is_empty());
    }

    #[test]
    fn test_duplicates_are_kept_and_reported() {
        let assembled = CatalogAssembler::assemble(
            vec![
                CategoryRows {
                    category: Category::Fittings,
                    rows: vec![row(5, Some("MAT-2"), "لولا", 1.0), row(6, Some("F-1"), "لولا", 1.0)],
                },
                CategoryRows {
                    category: Category::Materials,
                    rows: vec![row(2, None, "MDF", 1.0), row(3, None, "MDF", 1.0)],
                },
            ],
            PricingConfig::default(),
        );

        assert_eq!(assembled.catalog.len(), 4);
        assert_eq!(
            assembled.collisions,
            vec![CodeCollision {
                code: "MAT-2".to_string(),
                category: Category::Fittings,
                count: 2,
                rows: vec![5, 3],
            }]
        );
    }

    #[test]
    fn test_rows_without_source_are_not_listed() {
        let mut fallback = row(0, None, "MDF", 1.0);
        fallback.row = None;
        let assembled = CatalogAssembler::assemble(
            vec![CategoryRows {
                category: Category::Materials,
                rows: vec![fallback, row(9, Some("MAT-1"), "MDF", 1.0)],
            }],
            PricingConfig::default(),
        );
        assert_eq!(assembled.collisions[0].count, 2);
        assert_eq!(assembled.collisions[0].rows, vec![9]);
    }
}
