//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Reasons a workbook archive cannot be turned into sheets
#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("cannot read workbook: {0}")]
    Io(#[from] std::io::Error),

    /// Not a zip archive, or a damaged one
    #[error("workbook is not a valid archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed workbook XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Archive parts disagree with each other (e.g. a sheet without a relationship)
    #[error("inconsistent workbook: {0}")]
    InvalidFormat(String),

    /// A part every workbook must carry is absent
    #[error("workbook has no {0}")]
    MissingPart(String),

    /// Attribute or value text that cannot be interpreted
    #[error("unreadable cell data: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] price_sheets_core::Error),
}
