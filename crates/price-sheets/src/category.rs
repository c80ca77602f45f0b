//! Catalog categories

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four record categories of the pricing catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Panel materials (MDF, PVC boards), priced per square meter
    Materials,
    /// Edge-banding strips, priced per linear meter
    EdgeBanding,
    /// CNC machining operations
    CncOperations,
    /// Hardware fittings (hinges, runners, handles)
    Fittings,
}

impl Category {
    /// All categories in extraction order
    pub const ALL: [Category; 4] = [
        Category::Materials,
        Category::EdgeBanding,
        Category::CncOperations,
        Category::Fittings,
    ];

    /// Prefix used for synthetic codes (`MAT-1`, `EB-2`, ...)
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Category::Materials => "MAT",
            Category::EdgeBanding => "EB",
            Category::CncOperations => "CNC",
            Category::Fittings => "FITTING",
        }
    }

    /// Unit used when the source row carries none
    pub const fn default_unit(&self) -> &'static str {
        match self {
            Category::Materials => "متر مربع",
            Category::EdgeBanding => "متر طول",
            Category::CncOperations | Category::Fittings => "عدد",
        }
    }

    /// Key of the category's array in the output documents
    pub const fn key(&self) -> &'static str {
        match self {
            Category::Materials => "materials",
            Category::EdgeBanding => "edgeBanding",
            Category::CncOperations => "cncOperations",
            Category::Fittings => "fittings",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
