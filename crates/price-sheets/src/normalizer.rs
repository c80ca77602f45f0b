//! Cell coercion into record fields
//!
//! Numeric fields are strict: only numerically typed cells count, so text
//! that merely looks like a number (`"2,500,000"`) is treated as malformed
//! and replaced by zero. Nothing here fails; every problem is reported on
//! the returned value.

use price_sheets_core::CellValue;

use crate::mapper::FieldValues;

/// A row that passed normalization, before a code is assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    /// Spreadsheet row number (1-based); `None` for rows not read from a sheet
    pub row: Option<u32>,
    /// Source code, absent when the row has none
    pub code: Option<String>,
    pub name: String,
    pub unit: String,
    /// Non-negative and finite
    pub price: f64,
    /// Cells that were replaced by their default
    pub malformed: Vec<MalformedCell>,
}

/// A cell that could not be coerced and was replaced by its default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedCell {
    pub field: &'static str,
    /// Type name of the offending value
    pub found: &'static str,
}

/// Why a row yielded no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Code and name are both blank
    MissingKeys,
    /// The row is a column caption
    HeaderRow { keyword: String },
}

/// Outcome of normalizing one row
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Record(NormalizedRow),
    Rejected { row: u32, reason: Rejection },
}

/// Coerces mapped cells for one category
#[derive(Debug, Clone, Copy)]
pub struct RecordNormalizer<'a> {
    default_unit: &'a str,
    header_keywords: &'a [String],
}

impl<'a> RecordNormalizer<'a> {
    pub fn new(default_unit: &'a str, header_keywords: &'a [String]) -> Self {
        Self {
            default_unit,
            header_keywords,
        }
    }

    /// Unit given to rows without one
    pub fn default_unit(&self) -> &'a str {
        self.default_unit
    }

    /// Normalize one row of mapped cells
    pub fn normalize(&self, fields: &FieldValues) -> Normalized {
        let mut malformed = Vec::new();
        let code = text_field("code", &fields.code, &mut malformed);
        let name = text_field("name", &fields.name, &mut malformed);
        let unit = text_field("unit", &fields.unit, &mut malformed);

        if code.is_empty() && name.is_empty() {
            return Normalized::Rejected {
                row: fields.row,
                reason: Rejection::MissingKeys,
            };
        }

        let price_text = fields.price.as_str().unwrap_or_default();
        if let Some(keyword) = self.header_keyword(&[code.as_str(), name.as_str(), price_text]) {
            return Normalized::Rejected {
                row: fields.row,
                reason: Rejection::HeaderRow { keyword },
            };
        }

        let price = price_field(&fields.price, &mut malformed);

        Normalized::Record(NormalizedRow {
            row: Some(fields.row),
            code: (!code.is_empty()).then_some(code),
            name,
            unit: if unit.is_empty() {
                self.default_unit.to_string()
            } else {
                unit
            },
            price,
            malformed,
        })
    }

    fn header_keyword(&self, texts: &[&str]) -> Option<String> {
        self.header_keywords
            .iter()
            .find(|keyword| texts.iter().any(|text| text.contains(keyword.as_str())))
            .cloned()
    }
}

fn text_field(field: &'static str, value: &CellValue, malformed: &mut Vec<MalformedCell>) -> String {
    match value {
        CellValue::Error(_) => {
            malformed.push(MalformedCell {
                field,
                found: value.type_name(),
            });
            String::new()
        }
        other => other.to_text().map(|t| t.trim().to_string()).unwrap_or_default(),
    }
}

fn price_field(value: &CellValue, malformed: &mut Vec<MalformedCell>) -> f64 {
    match value {
        CellValue::Empty => 0.0,
        CellValue::String(s) if s.trim().is_empty() => 0.0,
        CellValue::Number(n) if n.is_finite() && *n >= 0.0 => {
            // -0.0 would serialize with its sign
            if *n == 0.0 {
                0.0
            } else {
                *n
            }
        }
        other => {
            malformed.push(MalformedCell {
                field: "price",
                found: other.type_name(),
            });
            0.0
        }
    }
}
