//! Error types for price-sheets-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the cell model
#[derive(Debug, Error)]
pub enum Error {
    /// Text that is not an A1 reference
    #[error("'{reference}' is not a cell reference: {reason}")]
    InvalidAddress {
        reference: String,
        reason: &'static str,
    },

    #[error("'{0}' is not a column")]
    InvalidColumn(String),

    #[error("row {0} is past the last sheet row ({1})")]
    RowOutOfBounds(u32, u32),

    #[error("column {0} is past the last sheet column ({1})")]
    ColumnOutOfBounds(u32, u16),

    /// Two sheets in one workbook share a name
    #[error("sheet '{0}' appears twice in the workbook")]
    DuplicateSheetName(String),
}
