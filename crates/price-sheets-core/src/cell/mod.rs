//! Cell-related types
//!
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "W12") and column-letter helpers

mod address;
mod value;

pub use address::CellAddress;
pub use value::CellValue;
