//! Prelude module - common imports for price-sheets users
//!
//! ```rust
//! use price_sheets::prelude::*;
//! ```

pub use crate::{
    // Workbook access
    CellValue,
    Workbook,
    Worksheet,
    XlsxReader,
    // Configuration
    Category,
    ExtractionProfile,
    ExtractOptions,
    DuplicatePolicy,
    FallbackPolicy,
    PricingOverrides,
    // Running
    Extractor,
    Extraction,
    EventSink,
    RecordingSink,
    TracingSink,
    // Output
    Catalog,
    CatalogWriter,
    PricingConfig,
    // Errors
    CatalogError,
    CatalogResult,
};
