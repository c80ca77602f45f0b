//! Cell values as read from a saved workbook

use std::fmt;

/// The value a cell held when the workbook was last saved
///
/// A formula cell is its cached result; nothing here recalculates.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    /// Every number, dates included, is an `f64`
    Number(f64),
    String(String),
    /// `#N/A`, `#REF!` and friends, kept as written
    Error(String),
}

impl CellValue {
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// True only for a never-written cell; see [`CellValue::is_blank`]
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Empty, or text that is nothing but whitespace
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The number in a numeric cell
    ///
    /// No coercion: `"2500000"` as text and booleans give `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text of a string cell
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The cell as text, the way a code or name column reads it
    ///
    /// Whole numbers drop the fraction (`101`, not `101.0`). Empty and error
    /// cells have no text.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Empty | CellValue::Error(_) => None,
            CellValue::String(s) => Some(s.clone()),
            CellValue::Boolean(true) => Some("TRUE".to_string()),
            CellValue::Boolean(false) => Some("FALSE".to_string()),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some((*n as i64).to_string())
            }
            CellValue::Number(n) => Some(n.to_string()),
        }
    }

    /// Short kind name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Boolean(_) => "boolean",
            CellValue::Number(_) => "number",
            CellValue::String(_) => "string",
            CellValue::Error(_) => "error",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Error(code) => f.write_str(code),
            other => f.write_str(&other.to_text().unwrap_or_default()),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_detection() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::string("   ").is_blank());
        assert!(CellValue::string("\t\n").is_blank());
        assert!(!CellValue::string(" x ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert!(!CellValue::Boolean(false).is_blank());
    }

    #[test]
    fn test_as_number_is_strict() {
        assert_eq!(CellValue::Number(2500000.0).as_number(), Some(2500000.0));
        assert_eq!(CellValue::string("2500000").as_number(), None);
        assert_eq!(CellValue::Boolean(true).as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
    }

    #[test]
    fn test_display_shows_error_codes() {
        assert_eq!(CellValue::Error("#REF!".into()).to_string(), "#REF!");
        assert_eq!(CellValue::Number(85000.0).to_string(), "85000");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_to_text() {
        assert_eq!(CellValue::Number(101.0).to_text().as_deref(), Some("101"));
        assert_eq!(CellValue::Number(2.5).to_text().as_deref(), Some("2.5"));
        assert_eq!(CellValue::string("عدد").to_text().as_deref(), Some("عدد"));
        assert_eq!(CellValue::Boolean(true).to_text().as_deref(), Some("TRUE"));
        assert_eq!(CellValue::Error("#N/A".into()).to_text(), None);
        assert_eq!(CellValue::Empty.to_text(), None);
    }
}
