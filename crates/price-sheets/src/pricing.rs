//! Global pricing values
//!
//! Precedence, lowest first: built-in defaults, labelled cells of the
//! workbook's config sheet, caller overrides.

use std::collections::BTreeMap;

use price_sheets_core::{CellAddress, Worksheet};

use crate::model::{PricingConfig, PricingKnob, PricingOverrides};
use crate::profile::PricingCellSpec;

/// Where a knob's final value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnobSource {
    Default,
    Workbook { sheet: String, cell: CellAddress },
    Override,
}

/// A knob value found next to its label
#[derive(Debug, Clone, PartialEq)]
pub struct PricingCell {
    pub knob: PricingKnob,
    /// Label cell
    pub label: CellAddress,
    /// Value cell, `None` when no usable value followed the label
    pub value: Option<(CellAddress, f64)>,
}

/// Reads labelled pricing values from a config sheet
pub struct PricingReader;

impl PricingReader {
    /// Every recognised label in row-major order
    ///
    /// A value is the first numeric cell within `value_span` columns right
    /// of its label. Negative and non-finite values are not usable.
    pub fn read(sheet: &Worksheet, spec: &PricingCellSpec) -> Vec<PricingCell> {
        let Some(max_row) = sheet.max_row() else {
            return Vec::new();
        };
        let max_col = sheet.max_col().unwrap_or(0);
        let last_row = max_row.min(spec.max_rows.saturating_sub(1));
        let last_col = max_col.min(spec.max_cols.saturating_sub(1));

        let mut found = Vec::new();
        for row in 0..=last_row {
            for col in 0..=last_col {
                let Some(text) = sheet.value_at(row, col).as_str() else {
                    continue;
                };
                let Some(knob) = spec.labels.first_equal(text) else {
                    continue;
                };
                let value = (1..=spec.value_span)
                    .filter_map(|offset| col.checked_add(offset))
                    .find_map(|c| sheet.value_at(row, c).as_number().map(|n| (c, n)))
                    .filter(|(_, n)| n.is_finite() && *n >= 0.0)
                    .map(|(c, n)| (CellAddress::new(row, c), n));
                found.push(PricingCell {
                    knob: *knob,
                    label: CellAddress::new(row, col),
                    value,
                });
            }
        }
        found
    }
}

/// Final pricing values with their provenance
#[derive(Debug, Clone, PartialEq)]
pub struct PricingResolution {
    pub config: PricingConfig,
    pub sources: BTreeMap<PricingKnob, KnobSource>,
}

impl PricingResolution {
    /// Merge workbook cells and overrides over the defaults
    ///
    /// When a label appears more than once the first usable value wins.
    pub fn resolve(sheet: Option<&str>, cells: &[PricingCell], overrides: &PricingOverrides) -> Self {
        let mut config = PricingConfig::default();
        let mut sources: BTreeMap<PricingKnob, KnobSource> = PricingKnob::ALL
            .iter()
            .map(|knob| (*knob, KnobSource::Default))
            .collect();

        if let Some(sheet) = sheet {
            for knob in PricingKnob::ALL {
                let first = cells
                    .iter()
                    .filter(|c| c.knob == knob)
                    .find_map(|c| c.value);
                if let Some((cell, value)) = first {
                    config.set(knob, value);
                    sources.insert(
                        knob,
                        KnobSource::Workbook {
                            sheet: sheet.to_string(),
                            cell,
                        },
                    );
                }
            }
        }

        for knob in PricingKnob::ALL {
            if let Some(value) = overrides.get(knob) {
                config.set(knob, value);
                sources.insert(knob, KnobSource::Override);
            }
        }

        Self { config, sources }
    }
}
