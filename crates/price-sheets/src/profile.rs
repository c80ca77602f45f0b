//! Extraction profiles
//!
//! A profile says where each category lives in a workbook: which sheet
//! names to try, whether columns are fixed or discovered, the first data
//! row, and which rows are column captions. Built-in profiles cover the
//! known workbook revisions; other layouts are loaded from JSON.
//!
//! Columns are written as letters (`"W"`) and rows as spreadsheet row
//! numbers (1-based) so a profile reads the same way the workbook does.

use std::fmt;
use std::path::Path;

use price_sheets_core::CellAddress;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{CatalogError, CatalogResult};
use crate::model::PricingKnob;
use crate::rules::{Rule, RuleSet};

/// A worksheet column, serialized as its letters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Column(u16);

impl Column {
    /// Column from its 0-based index
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Parse column letters (`"W"`)
    pub fn parse(letters: &str) -> CatalogResult<Self> {
        CellAddress::letters_to_column(letters)
            .map(Self)
            .map_err(|e| CatalogError::InvalidProfile(e.to_string()))
    }

    /// 0-based column index
    pub const fn index(self) -> u16 {
        self.0
    }

    /// Column `n` places to the right
    pub fn offset(self, n: u16) -> Self {
        Self(self.0.saturating_add(n))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&CellAddress::column_to_letters(self.0))
    }
}

impl TryFrom<String> for Column {
    type Error = price_sheets_core::Error;

    fn try_from(letters: String) -> Result<Self, Self::Error> {
        CellAddress::letters_to_column(&letters).map(Self)
    }
}

impl From<Column> for String {
    fn from(column: Column) -> Self {
        column.to_string()
    }
}

/// Convert a 1-based spreadsheet row number to a 0-based index
pub(crate) fn row_index(row_number: u32) -> u32 {
    row_number.saturating_sub(1)
}

/// Columns that carry the fields of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ColumnLayout {
    /// Source code column; records without one receive synthetic codes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Column>,
    pub name: Column,
    /// Unit column; absent means the default unit is always used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Column>,
    pub price: Column,
}

impl ColumnLayout {
    /// Columns that must not all be blank for a row to continue a block
    pub fn key_columns(&self) -> Vec<Column> {
        self.code.into_iter().chain(Some(self.name)).collect()
    }
}

/// Where to find a category's content markers when columns float
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiscoverySpec {
    pub first_column: Column,
    pub last_column: Column,
    /// First spreadsheet row of the search window (1-based)
    pub first_row: u32,
    /// Last spreadsheet row of the search window (1-based, inclusive)
    pub last_row: u32,
    /// Ordered `(pattern, category)` content markers
    pub markers: RuleSet<Category>,
}

/// How columns are assigned in a category sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum Layout {
    /// Fixed columns, one contiguous block starting at `first_row`
    #[serde(rename_all = "camelCase")]
    Static { first_row: u32, columns: ColumnLayout },
    /// The name column is found by content markers; price and unit sit
    /// one and two columns to its right
    Discovery(DiscoverySpec),
}

/// Where one category lives in the workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TableSpec {
    /// Candidate sheet names, tried in order
    pub aliases: Vec<String>,
    pub layout: Layout,
    /// Text that marks a caption row rather than a record
    #[serde(default)]
    pub header_keywords: Vec<String>,
    /// Replaces the category's default unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_unit: Option<String>,
}

/// A single sheet holding every category under section captions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SectionSpec {
    pub aliases: Vec<String>,
    /// Column holding section captions
    pub marker_column: Column,
    /// Ordered `(pattern, category)` caption rules
    pub rules: RuleSet<Category>,
    pub columns: ColumnLayout,
    /// Only the first `max_rows` rows are scanned
    pub max_rows: u32,
    #[serde(default)]
    pub header_keywords: Vec<String>,
}

/// A labelled block of global pricing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PricingCellSpec {
    pub aliases: Vec<String>,
    /// Ordered `(label, knob)` rules, matched against whole cells
    pub labels: RuleSet<PricingKnob>,
    /// Rows searched for labels
    pub max_rows: u32,
    /// Columns searched for labels
    pub max_cols: u16,
    /// How many cells right of a label may hold its value
    pub value_span: u16,
}

/// A material emitted when discovery finds nothing and fallback is enabled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FallbackMaterial {
    pub name: String,
    pub unit_price: f64,
}

/// Everything needed to locate catalog data in one workbook revision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExtractionProfile {
    pub name: String,
    pub materials: TableSpec,
    pub edge_banding: TableSpec,
    pub cnc_operations: TableSpec,
    pub fittings: TableSpec,
    /// Aggregate sheet consulted when a category has no sheet of its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<SectionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingCellSpec>,
    #[serde(default)]
    pub fallback_materials: Vec<FallbackMaterial>,
}

const PER_CATEGORY_LAYOUT: ColumnLayout = ColumnLayout {
    code: Some(Column::new(1)),
    name: Column::new(2),
    unit: Some(Column::new(3)),
    price: Column::new(4),
};

const LOOKUP_LAYOUT: ColumnLayout = ColumnLayout {
    code: None,
    name: Column::new(22),
    unit: Some(Column::new(24)),
    price: Column::new(23),
};

const LOOKUP_MATERIAL_LAYOUT: ColumnLayout = ColumnLayout {
    code: None,
    name: Column::new(22),
    unit: None,
    price: Column::new(25),
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn table(aliases: &[&str], layout: Layout, header_keywords: &[&str]) -> TableSpec {
    TableSpec {
        aliases: strings(aliases),
        layout,
        header_keywords: strings(header_keywords),
        default_unit: None,
    }
}

const MATERIAL_SHEETS: &[&str] = &["Material", "Materials", "متریال"];
const EDGE_BANDING_SHEETS: &[&str] = &["NavarShiarFarsi", "Edge Banding", "نوار"];
const CNC_SHEETS: &[&str] = &["CNC", "سی ان سی"];
const FITTING_SHEETS: &[&str] = &["Fittings", "یراق آلات"];

const MATERIAL_HEADERS: &[&str] = &["نوع", "متریال"];
const EDGE_BANDING_HEADERS: &[&str] = &["نوع خدمات", "قیمت"];
const LOOKUP_HEADERS: &[&str] = &["نوع", "قیمت", "یراق آلات"];

fn section_rules() -> RuleSet<Category> {
    RuleSet::new(vec![
        Rule::new("متریال", Category::Materials),
        Rule::new("مواد", Category::Materials),
        Rule::new("یراق", Category::Fittings),
        Rule::ignore_case("fittings", Category::Fittings),
        Rule::new("نوار", Category::EdgeBanding),
        Rule::ignore_case("cnc", Category::CncOperations),
        Rule::new("سی ان سی", Category::CncOperations),
    ])
}

fn material_markers() -> RuleSet<Category> {
    RuleSet::new(vec![
        Rule::ignore_case("MDF", Category::Materials),
        Rule::ignore_case("PVC", Category::Materials),
        Rule::new("ام دی اف", Category::Materials),
        Rule::new("پی وی سی", Category::Materials),
    ])
}

fn pricing_labels() -> RuleSet<PricingKnob> {
    let mut rules: Vec<Rule<PricingKnob>> = PricingKnob::ALL
        .iter()
        .map(|knob| Rule::ignore_case(knob.key(), *knob))
        .collect();
    rules.extend([
        Rule::ignore_case("دستمزد ساعتی", PricingKnob::LaborCostPerHour),
        Rule::ignore_case("سربار", PricingKnob::OverheadPercentage),
        Rule::ignore_case("سود", PricingKnob::ProfitMarginPercentage),
        Rule::ignore_case("پرت", PricingKnob::WastagePercentage),
        Rule::ignore_case("هزینه راه اندازی سی ان سی", PricingKnob::CncSetupCost),
        Rule::ignore_case("هزینه راه اندازی نوار", PricingKnob::EdgeBandingSetupCost),
    ]);
    RuleSet::new(rules)
}

fn fallback_materials() -> Vec<FallbackMaterial> {
    [
        ("ام دی اف 16 میل - سفید", 2_500_000.0),
        ("ام دی اف 16 میل -روکش چوب", 3_000_000.0),
        ("ام دی اف 3 میل -سفید", 500_000.0),
        ("پی وی سی 16 میل - سفید", 2_000_000.0),
        ("پی وی سی 3 میل - سفید", 400_000.0),
        ("ام دی اف 16 میل -خام", 2_200_000.0),
    ]
    .into_iter()
    .map(|(name, unit_price)| FallbackMaterial {
        name: name.to_string(),
        unit_price,
    })
    .collect()
}

fn aggregate_section() -> SectionSpec {
    SectionSpec {
        aliases: strings(&["All"]),
        marker_column: Column::new(0),
        rules: section_rules(),
        columns: PER_CATEGORY_LAYOUT,
        max_rows: 500,
        header_keywords: strings(&["قیمت", "نوع"]),
    }
}

fn pricing_cells() -> PricingCellSpec {
    PricingCellSpec {
        aliases: strings(&["Data", "داده"]),
        labels: pricing_labels(),
        max_rows: 100,
        max_cols: 26,
        value_span: 3,
    }
}

impl ExtractionProfile {
    /// Names of the built-in profiles
    pub const BUILTIN: [&'static str; 3] = ["per-category", "lookup", "discovery"];

    /// One sheet per category with code, name, unit and price in B..E
    /// below a caption row
    pub fn per_category() -> Self {
        let layout = || Layout::Static {
            first_row: 4,
            columns: PER_CATEGORY_LAYOUT,
        };
        Self {
            name: "per-category".to_string(),
            materials: table(MATERIAL_SHEETS, layout(), MATERIAL_HEADERS),
            edge_banding: table(EDGE_BANDING_SHEETS, layout(), EDGE_BANDING_HEADERS),
            cnc_operations: table(CNC_SHEETS, layout(), LOOKUP_HEADERS),
            fittings: table(FITTING_SHEETS, layout(), LOOKUP_HEADERS),
            aggregate: Some(aggregate_section()),
            pricing: Some(pricing_cells()),
            fallback_materials: fallback_materials(),
        }
    }

    /// Lookup tables in columns W..Z, names without codes
    pub fn lookup() -> Self {
        let layout = |columns| Layout::Static {
            first_row: 2,
            columns,
        };
        Self {
            name: "lookup".to_string(),
            materials: table(
                MATERIAL_SHEETS,
                layout(LOOKUP_MATERIAL_LAYOUT),
                MATERIAL_HEADERS,
            ),
            edge_banding: table(EDGE_BANDING_SHEETS, layout(LOOKUP_LAYOUT), EDGE_BANDING_HEADERS),
            cnc_operations: table(CNC_SHEETS, layout(LOOKUP_LAYOUT), LOOKUP_HEADERS),
            fittings: table(FITTING_SHEETS, layout(LOOKUP_LAYOUT), LOOKUP_HEADERS),
            aggregate: Some(aggregate_section()),
            pricing: Some(pricing_cells()),
            fallback_materials: fallback_materials(),
        }
    }

    /// Like [`ExtractionProfile::lookup`], but the materials table floats
    /// somewhere in columns T..Y and is found by its MDF/PVC content
    pub fn discovery() -> Self {
        let mut profile = Self::lookup();
        profile.name = "discovery".to_string();
        profile.materials.layout = Layout::Discovery(DiscoverySpec {
            first_column: Column::new(19),
            last_column: Column::new(24),
            first_row: 1,
            last_row: 29,
            markers: material_markers(),
        });
        profile
    }

    /// Built-in profile by name
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "per-category" => Some(Self::per_category()),
            "lookup" => Some(Self::lookup()),
            "discovery" => Some(Self::discovery()),
            _ => None,
        }
    }

    /// Parse and validate a profile from JSON text
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load and validate a profile from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Table spec of one category
    pub fn table(&self, category: Category) -> &TableSpec {
        match category {
            Category::Materials => &self.materials,
            Category::EdgeBanding => &self.edge_banding,
            Category::CncOperations => &self.cnc_operations,
            Category::Fittings => &self.fittings,
        }
    }

    /// Check internal consistency
    pub fn validate(&self) -> CatalogResult<()> {
        for category in Category::ALL {
            let spec = self.table(category);
            if spec.aliases.is_empty() {
                return Err(invalid(format!("{} has no sheet aliases", category)));
            }
            if spec.default_unit.as_deref().is_some_and(|u| u.trim().is_empty()) {
                return Err(invalid(format!("{} default unit is blank", category)));
            }
            match &spec.layout {
                Layout::Static { first_row, .. } if *first_row == 0 => {
                    return Err(invalid(format!(
                        "{} first row must be a spreadsheet row number (>= 1)",
                        category
                    )));
                }
                Layout::Static { .. } => {}
                Layout::Discovery(discovery) => {
                    if discovery.first_column > discovery.last_column
                        || discovery.first_row == 0
                        || discovery.first_row > discovery.last_row
                    {
                        return Err(invalid(format!("{} discovery window is empty", category)));
                    }
                    if !discovery.markers.iter().any(|m| m.target == category) {
                        return Err(invalid(format!(
                            "{} discovery has no markers for its own category",
                            category
                        )));
                    }
                }
            }
        }

        if let Some(section) = &self.aggregate {
            if section.aliases.is_empty() || section.rules.is_empty() {
                return Err(invalid("aggregate sheet needs aliases and section rules".into()));
            }
        }

        if let Some(pricing) = &self.pricing {
            if pricing.aliases.is_empty() {
                return Err(invalid("pricing sheet has no aliases".into()));
            }
        }

        if let Some(bad) = self
            .fallback_materials
            .iter()
            .find(|m| m.name.trim().is_empty() || !m.unit_price.is_finite() || m.unit_price < 0.0)
        {
            return Err(invalid(format!("invalid fallback material {:?}", bad.name)));
        }

        Ok(())
    }
}

impl Default for ExtractionProfile {
    fn default() -> Self {
        Self::lookup()
    }
}

fn invalid(message: String) -> CatalogError {
    CatalogError::InvalidProfile(message)
}
