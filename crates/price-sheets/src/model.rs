//! Canonical catalog records
//!
//! Field names and field order follow the JSON documents consumed by the
//! pricing application, so serde renders them verbatim.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{CatalogError, CatalogResult};

/// Category tag written on every material record
pub const PANEL_CATEGORY: &str = "Panel";

/// A panel material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub code: String,
    pub description: String,
    pub unit: String,
    pub unit_price: f64,
    pub category: String,
    pub persian_names: Vec<String>,
    pub is_active: bool,
}

/// An edge-banding strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeBanding {
    pub code: String,
    pub description: String,
    pub unit: String,
    pub price_per_meter: f64,
    pub is_active: bool,
}

/// A CNC machining operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CncOperation {
    pub code: String,
    pub description: String,
    pub unit: String,
    pub unit_price: f64,
    pub is_active: bool,
}

/// A hardware fitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fitting {
    pub code: String,
    pub name: String,
    pub unit: String,
    pub unit_price: f64,
    pub qty_per_fitting: u32,
    pub is_active: bool,
}

/// Read access shared by all record kinds
pub trait CatalogRecord {
    /// Record code, unique within the catalog
    fn code(&self) -> &str;
    /// Human-readable name (`description` or `name`)
    fn label(&self) -> &str;
    /// Unit of measure
    fn unit(&self) -> &str;
    /// Price per unit
    fn price(&self) -> f64;
}

macro_rules! impl_record {
    ($ty:ty, $label:ident, $price:ident) => {
        impl CatalogRecord for $ty {
            fn code(&self) -> &str {
                &self.code
            }
            fn label(&self) -> &str {
                &self.$label
            }
            fn unit(&self) -> &str {
                &self.unit
            }
            fn price(&self) -> f64 {
                self.$price
            }
        }
    };
}

impl_record!(Material, description, unit_price);
impl_record!(EdgeBanding, description, price_per_meter);
impl_record!(CncOperation, description, unit_price);
impl_record!(Fitting, name, unit_price);

/// A record tagged by its category
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogItem {
    Material(Material),
    EdgeBanding(EdgeBanding),
    CncOperation(CncOperation),
    Fitting(Fitting),
}

impl CatalogItem {
    /// Build the record for `category` from already normalized fields
    pub fn new(category: Category, code: String, name: String, unit: String, price: f64) -> Self {
        match category {
            Category::Materials => CatalogItem::Material(Material {
                code,
                persian_names: if name.is_empty() {
                    Vec::new()
                } else {
                    vec![name.clone()]
                },
                description: name,
                unit,
                unit_price: price,
                category: PANEL_CATEGORY.to_string(),
                is_active: true,
            }),
            Category::EdgeBanding => CatalogItem::EdgeBanding(EdgeBanding {
                code,
                description: name,
                unit,
                price_per_meter: price,
                is_active: true,
            }),
            Category::CncOperations => CatalogItem::CncOperation(CncOperation {
                code,
                description: name,
                unit,
                unit_price: price,
                is_active: true,
            }),
            Category::Fittings => CatalogItem::Fitting(Fitting {
                code,
                name,
                unit,
                unit_price: price,
                qty_per_fitting: 1,
                is_active: true,
            }),
        }
    }

    /// Category of the record
    pub fn category(&self) -> Category {
        match self {
            CatalogItem::Material(_) => Category::Materials,
            CatalogItem::EdgeBanding(_) => Category::EdgeBanding,
            CatalogItem::CncOperation(_) => Category::CncOperations,
            CatalogItem::Fitting(_) => Category::Fittings,
        }
    }

    /// The record behind the tag
    pub fn record(&self) -> &dyn CatalogRecord {
        match self {
            CatalogItem::Material(r) => r,
            CatalogItem::EdgeBanding(r) => r,
            CatalogItem::CncOperation(r) => r,
            CatalogItem::Fitting(r) => r,
        }
    }
}

/// Global pricing knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    pub labor_cost_per_hour: f64,
    pub overhead_percentage: f64,
    pub profit_margin_percentage: f64,
    pub wastage_percentage: f64,
    pub cnc_setup_cost: f64,
    pub edge_banding_setup_cost: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            labor_cost_per_hour: 0.0,
            overhead_percentage: 0.0,
            profit_margin_percentage: 0.0,
            wastage_percentage: 5.0,
            cnc_setup_cost: 0.0,
            edge_banding_setup_cost: 0.0,
        }
    }
}

/// Names one field of [`PricingConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PricingKnob {
    LaborCostPerHour,
    OverheadPercentage,
    ProfitMarginPercentage,
    WastagePercentage,
    CncSetupCost,
    EdgeBandingSetupCost,
}

impl PricingKnob {
    /// All knobs in document order
    pub const ALL: [PricingKnob; 6] = [
        PricingKnob::LaborCostPerHour,
        PricingKnob::OverheadPercentage,
        PricingKnob::ProfitMarginPercentage,
        PricingKnob::WastagePercentage,
        PricingKnob::CncSetupCost,
        PricingKnob::EdgeBandingSetupCost,
    ];

    /// JSON field name of the knob
    pub const fn key(&self) -> &'static str {
        match self {
            PricingKnob::LaborCostPerHour => "laborCostPerHour",
            PricingKnob::OverheadPercentage => "overheadPercentage",
            PricingKnob::ProfitMarginPercentage => "profitMarginPercentage",
            PricingKnob::WastagePercentage => "wastagePercentage",
            PricingKnob::CncSetupCost => "cncSetupCost",
            PricingKnob::EdgeBandingSetupCost => "edgeBandingSetupCost",
        }
    }
}

impl PricingConfig {
    /// Value of one knob
    pub fn get(&self, knob: PricingKnob) -> f64 {
        match knob {
            PricingKnob::LaborCostPerHour => self.labor_cost_per_hour,
            PricingKnob::OverheadPercentage => self.overhead_percentage,
            PricingKnob::ProfitMarginPercentage => self.profit_margin_percentage,
            PricingKnob::WastagePercentage => self.wastage_percentage,
            PricingKnob::CncSetupCost => self.cnc_setup_cost,
            PricingKnob::EdgeBandingSetupCost => self.edge_banding_setup_cost,
        }
    }

    /// Set one knob
    pub fn set(&mut self, knob: PricingKnob, value: f64) {
        let slot = match knob {
            PricingKnob::LaborCostPerHour => &mut self.labor_cost_per_hour,
            PricingKnob::OverheadPercentage => &mut self.overhead_percentage,
            PricingKnob::ProfitMarginPercentage => &mut self.profit_margin_percentage,
            PricingKnob::WastagePercentage => &mut self.wastage_percentage,
            PricingKnob::CncSetupCost => &mut self.cnc_setup_cost,
            PricingKnob::EdgeBandingSetupCost => &mut self.edge_banding_setup_cost,
        };
        *slot = value;
    }
}

/// Caller-supplied pricing values; absent fields keep the lower-precedence value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PricingOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_cost_per_hour: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overhead_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit_margin_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wastage_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cnc_setup_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_banding_setup_cost: Option<f64>,
}

impl PricingOverrides {
    /// Override value for one knob, if supplied
    pub fn get(&self, knob: PricingKnob) -> Option<f64> {
        match knob {
            PricingKnob::LaborCostPerHour => self.labor_cost_per_hour,
            PricingKnob::OverheadPercentage => self.overhead_percentage,
            PricingKnob::ProfitMarginPercentage => self.profit_margin_percentage,
            PricingKnob::WastagePercentage => self.wastage_percentage,
            PricingKnob::CncSetupCost => self.cnc_setup_cost,
            PricingKnob::EdgeBandingSetupCost => self.edge_banding_setup_cost,
        }
    }

    /// Check if no knob is overridden
    pub fn is_empty(&self) -> bool {
        PricingKnob::ALL.iter().all(|k| self.get(*k).is_none())
    }

    /// Parse and validate an overrides document
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let overrides: Self = serde_json::from_str(json)?;
        overrides.validate()?;
        Ok(overrides)
    }

    /// Reject values the workbook reader would also ignore
    pub fn validate(&self) -> CatalogResult<()> {
        for knob in PricingKnob::ALL {
            match self.get(knob) {
                Some(value) if !value.is_finite() || value < 0.0 => {
                    return Err(CatalogError::InvalidOverride { knob, value });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// The assembled pricing catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub materials: Vec<Material>,
    pub edge_banding: Vec<EdgeBanding>,
    pub cnc_operations: Vec<CncOperation>,
    pub fittings: Vec<Fitting>,
    pub pricing_config: PricingConfig,
}

impl Catalog {
    /// Append a record to its category list
    pub fn push(&mut self, item: CatalogItem) {
        match item {
            CatalogItem::Material(r) => self.materials.push(r),
            CatalogItem::EdgeBanding(r) => self.edge_banding.push(r),
            CatalogItem::CncOperation(r) => self.cnc_operations.push(r),
            CatalogItem::Fitting(r) => self.fittings.push(r),
        }
    }

    /// Number of records in one category
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Materials => self.materials.len(),
            Category::EdgeBanding => self.edge_banding.len(),
            Category::CncOperations => self.cnc_operations.len(),
            Category::Fittings => self.fittings.len(),
        }
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.count(*c)).sum()
    }

    /// Check if the catalog has no records in any category
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every record with its category, in category order
    pub fn records(&self) -> impl Iterator<Item = (Category, &dyn CatalogRecord)> + '_ {
        let materials = self
            .materials
            .iter()
            .map(|r| (Category::Materials, r as &dyn CatalogRecord));
        let edge_banding = self
            .edge_banding
            .iter()
            .map(|r| (Category::EdgeBanding, r as &dyn CatalogRecord));
        let cnc = self
            .cnc_operations
            .iter()
            .map(|r| (Category::CncOperations, r as &dyn CatalogRecord));
        let fittings = self
            .fittings
            .iter()
            .map(|r| (Category::Fittings, r as &dyn CatalogRecord));
        materials.chain(edge_banding).chain(cnc).chain(fittings)
    }
}
