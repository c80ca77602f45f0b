//! # price-sheets-xlsx
//!
//! Reads the cell values of an XLSX / XLSM workbook into a
//! [`price_sheets_core::Workbook`]. Formula cells contribute their cached
//! result only; styles, comments and macros are skipped.

pub mod error;
pub mod reader;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
