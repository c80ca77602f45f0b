//! # price-sheets-core
//!
//! Read-only cell model used by the price-sheets extraction pipeline.
//!
//! This crate provides the types a pricing workbook is read into:
//! - [`CellValue`] - Already-computed cell values (numbers, strings, booleans, errors)
//! - [`CellAddress`] - A1-style addressing and spreadsheet column letters
//! - [`Worksheet`], [`Workbook`] - Named grids of values, looked up by row and column
//!
//! ## Example
//!
//! ```rust
//! use price_sheets_core::{CellValue, Workbook, Worksheet};
//!
//! let mut sheet = Worksheet::new("CNC");
//! sheet.set_value("W2", "برش").unwrap();
//! sheet.set_value_at(1, 23, 150000.0).unwrap();
//!
//! let mut workbook = Workbook::empty();
//! workbook.add_worksheet(sheet).unwrap();
//!
//! let cnc = workbook.worksheet_by_name("CNC").unwrap();
//! assert_eq!(cnc.value_at(1, 23), &CellValue::Number(150000.0));
//! ```

pub mod cell;
pub mod error;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellValue};
pub use error::{Error, Result};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
