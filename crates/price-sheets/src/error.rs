//! Error types for catalog extraction

use std::path::PathBuf;

use thiserror::Error;

use crate::assembler::CodeCollision;
use crate::category::Category;
use crate::model::PricingKnob;
use crate::summary::ExtractionSummary;

/// Result type alias for catalog operations
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Errors that abort an extraction run
///
/// Row-level problems (blank keys, header rows, malformed cells) are not
/// errors; they are reported through [`crate::events::EventSink`] and the
/// run continues.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The workbook path does not exist
    #[error("workbook not found: {}", path.display())]
    MissingWorkbook { path: PathBuf },

    /// The workbook exists but could not be parsed
    #[error("cannot read workbook {}: {source}", path.display())]
    UnreadableWorkbook {
        path: PathBuf,
        #[source]
        source: price_sheets_xlsx::XlsxError,
    },

    /// No sheet matched any alias of a category
    #[error("no sheet for {category} (tried {})", aliases.join(", "))]
    SheetNotFound {
        category: Category,
        aliases: Vec<String>,
    },

    /// An output document could not be written
    #[error("cannot write {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error outside of document writing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Two or more records share a code and duplicates are denied
    ///
    /// Carries the run summary so per-category counts are still reported.
    #[error(
        "{} duplicate code(s): {}",
        summary.collisions.len(),
        format_collisions(&summary.collisions)
    )]
    DuplicateCodes { summary: Box<ExtractionSummary> },

    /// A pricing override is negative or not a number
    #[error("pricing override {} must be a non-negative number, got {value}", knob.key())]
    InvalidOverride { knob: PricingKnob, value: f64 },

    /// An extraction profile is inconsistent
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}

fn format_collisions(collisions: &[CodeCollision]) -> String {
    collisions
        .iter()
        .map(|c| format!("{} ({} x{})", c.code, c.category, c.count))
        .collect::<Vec<_>>()
        .join(", ")
}
