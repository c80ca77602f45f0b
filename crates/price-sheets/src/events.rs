//! Structured extraction events
//!
//! Every decision the pipeline makes about a sheet or a row is reported as
//! an [`ExtractionEvent`]. Rows that yield no record are never dropped
//! silently.

use std::fmt;

use crate::category::Category;
use crate::model::PricingKnob;
use crate::normalizer::{MalformedCell, Rejection};

/// What happened
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The category's own sheet was found
    SheetResolved,
    /// No sheet matched the category's aliases
    SheetMissing { aliases: Vec<String> },
    /// The category was read from sections of the aggregate sheet
    AggregateUsed,
    /// A section caption switched the current category
    SectionStarted,
    /// A data row appeared before any section caption and was discarded
    Unassigned,
    /// Discovery found the name column
    ColumnDiscovered { column: String, rows: usize },
    /// Discovery found no marker in its window
    DiscoveryFailed,
    /// Built-in materials were emitted instead of workbook data
    FallbackUsed { count: usize },
    /// A row became a record
    Accepted,
    /// A row yielded no record
    Rejected(Rejection),
    /// A cell was replaced by its default
    Malformed(MalformedCell),
    /// A pricing knob was read from the workbook
    PricingValue { knob: PricingKnob, cell: String, value: f64 },
    /// A pricing label was found without a usable value next to it
    PricingValueMissing { knob: PricingKnob, cell: String },
    /// Several records share a code
    CodeCollision { code: String, count: usize },
    /// Every category came out empty
    EmptyCatalog,
}

/// One reported decision
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionEvent {
    pub category: Option<Category>,
    pub sheet: Option<String>,
    /// Spreadsheet row number (1-based)
    pub row: Option<u32>,
    pub outcome: Outcome,
}

impl ExtractionEvent {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            category: None,
            sheet: None,
            row: None,
            outcome,
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn sheet<S: Into<String>>(mut self, sheet: S) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn row(mut self, row: u32) -> Self {
        self.row = Some(row);
        self
    }

    /// Whether the event reports degraded or lossy behavior
    pub fn is_warning(&self) -> bool {
        matches!(
            self.outcome,
            Outcome::SheetMissing { .. }
                | Outcome::Unassigned
                | Outcome::DiscoveryFailed
                | Outcome::FallbackUsed { .. }
                | Outcome::Malformed(_)
                | Outcome::PricingValueMissing { .. }
                | Outcome::CodeCollision { .. }
                | Outcome::EmptyCatalog
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::SheetResolved => write!(f, "sheet resolved"),
            Outcome::SheetMissing { aliases } => {
                write!(f, "no sheet found (tried {})", aliases.join(", "))
            }
            Outcome::AggregateUsed => write!(f, "read from aggregate sheet"),
            Outcome::SectionStarted => write!(f, "section started"),
            Outcome::Unassigned => write!(f, "row before any section discarded"),
            Outcome::ColumnDiscovered { column, rows } => {
                write!(f, "discovered column {} with {} rows", column, rows)
            }
            Outcome::DiscoveryFailed => write!(f, "no marker found in discovery window"),
            Outcome::FallbackUsed { count } => {
                write!(f, "emitting {} built-in materials instead of workbook data", count)
            }
            Outcome::Accepted => write!(f, "accepted"),
            Outcome::Rejected(Rejection::MissingKeys) => write!(f, "rejected: code and name blank"),
            Outcome::Rejected(Rejection::HeaderRow { keyword }) => {
                write!(f, "rejected: header row ({})", keyword)
            }
            Outcome::Malformed(cell) => {
                write!(f, "malformed {} ({}), using default", cell.field, cell.found)
            }
            Outcome::PricingValue { knob, cell, value } => {
                write!(f, "{} = {} from {}", knob.key(), value, cell)
            }
            Outcome::PricingValueMissing { knob, cell } => {
                write!(f, "label for {} at {} has no usable value", knob.key(), cell)
            }
            Outcome::CodeCollision { code, count } => {
                write!(f, "code {} used by {} records", code, count)
            }
            Outcome::EmptyCatalog => write!(f, "catalog is empty"),
        }
    }
}

/// Receives extraction events
pub trait EventSink {
    fn record(&mut self, event: ExtractionEvent);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn record(&mut self, event: ExtractionEvent) {
        (**self).record(event);
    }
}

/// Forwards events to `tracing`
///
/// Row-level outcomes are logged at debug level, degraded behavior at warn.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, event: ExtractionEvent) {
        let category = event.category.map(|c| c.key()).unwrap_or("-");
        let sheet = event.sheet.as_deref().unwrap_or("-");
        let row = event.row.unwrap_or(0);
        if event.is_warning() {
            tracing::warn!(category, sheet, row, "{}", event.outcome);
        } else if event.row.is_some() {
            tracing::debug!(category, sheet, row, "{}", event.outcome);
        } else {
            tracing::info!(category, sheet, "{}", event.outcome);
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<ExtractionEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events whose outcome satisfies `predicate`
    pub fn matching<F>(&self, predicate: F) -> impl Iterator<Item = &ExtractionEvent>
    where
        F: Fn(&Outcome) -> bool,
    {
        self.events.iter().filter(move |e| predicate(&e.outcome))
    }
}

impl EventSink for RecordingSink {
    fn record(&mut self, event: ExtractionEvent) {
        self.events.push(event);
    }
}
