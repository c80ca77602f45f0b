//! # price-sheets
//!
//! Extracts a canonical pricing catalog from a loosely structured pricing
//! workbook.
//!
//! The workbook holds panel materials, edge banding, CNC operations and
//! hardware fittings, either on one sheet per category or under section
//! captions of a single aggregate sheet. Extraction is driven by an
//! [`ExtractionProfile`] and produces a [`Catalog`] that is written as two
//! JSON documents.
//!
//! ## Features
//!
//! - Sheet lookup by ordered, bilingual aliases
//! - Fixed-column tables, content-discovered columns, and section-structured sheets
//! - Strict numeric coercion with per-row diagnostics
//! - Synthetic codes (`MAT-1`, `FITTING-3`) for rows without one
//! - Atomic, deterministic JSON output
//!
//! ## Example
//!
//! ```rust
//! use price_sheets::prelude::*;
//!
//! let mut sheet = Worksheet::new("Fittings");
//! sheet.set_value("W2", "لولا گازور").unwrap();
//! sheet.set_value("X2", 85000.0).unwrap();
//!
//! let mut workbook = Workbook::empty();
//! workbook.add_worksheet(sheet).unwrap();
//!
//! let profile = ExtractionProfile::lookup();
//! let mut extractor = Extractor::new(&profile, ExtractOptions::default(), RecordingSink::new());
//! let extraction = extractor.extract(&workbook).unwrap();
//!
//! let fitting = &extraction.catalog.fittings[0];
//! assert_eq!(fitting.code, "FITTING-1");
//! assert_eq!(fitting.unit, "عدد");
//! ```

pub mod assembler;
pub mod category;
pub mod error;
pub mod events;
pub mod locator;
pub mod mapper;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod prelude;
pub mod pricing;
pub mod profile;
pub mod rules;
pub mod scanner;
pub mod summary;
pub mod verify;
pub mod writer;

pub use assembler::{Assembled, CatalogAssembler, CategoryRows, CodeCollision};
pub use category::Category;
pub use error::{CatalogError, CatalogResult};
pub use events::{EventSink, ExtractionEvent, Outcome, RecordingSink, TracingSink};
pub use locator::SheetLocator;
pub use mapper::{ColumnMapper, Discovered, FieldValues};
pub use model::{
    Catalog, CatalogItem, CatalogRecord, CncOperation, EdgeBanding, Fitting, Material,
    PricingConfig, PricingKnob, PricingOverrides,
};
pub use normalizer::{MalformedCell, Normalized, NormalizedRow, RecordNormalizer, Rejection};
pub use pipeline::{
    open_workbook, DuplicatePolicy, ExtractOptions, Extraction, Extractor, FallbackPolicy,
};
pub use pricing::{KnobSource, PricingCell, PricingReader, PricingResolution};
pub use profile::{
    Column, ColumnLayout, DiscoverySpec, ExtractionProfile, FallbackMaterial, Layout,
    PricingCellSpec, SectionSpec, TableSpec,
};
pub use rules::{Rule, RuleSet};
pub use scanner::{BlockScan, RawRow, SectionRow, SectionScan, TableScanner};
pub use summary::{CategorySource, CategorySummary, ExtractionSummary};
pub use verify::{verify, VerifyReport, Violation};
pub use writer::{CatalogWriter, RenderedCatalog, WrittenCatalog, FITTINGS_CATALOG_FILE, PRICING_TABLES_FILE};

// Re-export the cell model and reader
pub use price_sheets_core::{CellAddress, CellValue, Workbook, Worksheet};
pub use price_sheets_xlsx::{XlsxError, XlsxReader};
