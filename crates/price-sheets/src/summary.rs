//! Per-run extraction summary

use std::fmt;

use crate::assembler::CodeCollision;
use crate::category::Category;
use crate::model::PricingKnob;
use crate::pricing::KnobSource;

/// Where a category's records came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySource {
    /// The category's own sheet
    OwnSheet,
    /// Sections of the aggregate sheet
    Aggregate,
    /// Built-in materials (degraded)
    Fallback,
    /// Nothing was found
    NotFound,
}

impl fmt::Display for CategorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CategorySource::OwnSheet => "sheet",
            CategorySource::Aggregate => "aggregate",
            CategorySource::Fallback => "fallback",
            CategorySource::NotFound => "missing",
        })
    }
}

/// Counters for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: Category,
    pub sheet: Option<String>,
    pub source: CategorySource,
    /// Rows handed to the normalizer
    pub scanned: usize,
    pub emitted: usize,
    pub rejected_missing_keys: usize,
    pub rejected_headers: usize,
    pub malformed_cells: usize,
    /// Output does not reflect workbook content
    pub degraded: bool,
}

impl CategorySummary {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            sheet: None,
            source: CategorySource::NotFound,
            scanned: 0,
            emitted: 0,
            rejected_missing_keys: 0,
            rejected_headers: 0,
            malformed_cells: 0,
            degraded: false,
        }
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSummary {
    /// One entry per category, in extraction order
    pub categories: Vec<CategorySummary>,
    pub pricing_sources: Vec<(PricingKnob, KnobSource)>,
    pub collisions: Vec<CodeCollision>,
}

impl ExtractionSummary {
    /// Counters of one category
    pub fn category(&self, category: Category) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// Records emitted across all categories
    pub fn total_emitted(&self) -> usize {
        self.categories.iter().map(|c| c.emitted).sum()
    }

    /// Whether any category is degraded or missing, or codes collide
    pub fn has_warnings(&self) -> bool {
        !self.collisions.is_empty()
            || self
                .categories
                .iter()
                .any(|c| c.degraded || c.source == CategorySource::NotFound)
    }
}

impl fmt::Display for ExtractionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<14} {:<10} {:<18} {:>7} {:>7} {:>6} {:>7} {:>9}",
            "category", "source", "sheet", "scanned", "emitted", "blank", "headers", "malformed"
        )?;
        for c in &self.categories {
            writeln!(
                f,
                "{:<14} {:<10} {:<18} {:>7} {:>7} {:>6} {:>7} {:>9}{}",
                c.category.key(),
                c.source.to_string(),
                c.sheet.as_deref().unwrap_or("-"),
                c.scanned,
                c.emitted,
                c.rejected_missing_keys,
                c.rejected_headers,
                c.malformed_cells,
                if c.degraded { "  DEGRADED" } else { "" }
            )?;
        }
        for (knob, source) in &self.pricing_sources {
            match source {
                KnobSource::Default => {}
                KnobSource::Workbook { sheet, cell } => {
                    writeln!(f, "pricing {} from {}!{}", knob.key(), sheet, cell)?
                }
                KnobSource::Override => writeln!(f, "pricing {} from overrides", knob.key())?,
            }
        }
        for collision in &self.collisions {
            writeln!(
                f,
                "duplicate code {} ({} records)",
                collision.code, collision.count
            )?;
        }
        write!(f, "total records: {}", self.total_emitted())
    }
}
