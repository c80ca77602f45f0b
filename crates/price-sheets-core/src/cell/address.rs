//! Cell addresses and column letters

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// Position of one cell, written `W2` in spreadsheet notation
///
/// Both fields are 0-based; only the A1 text form counts rows from 1.
/// `$` anchors in the text form carry no meaning here and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub row: u32,
    pub col: u16,
}

impl CellAddress {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse `W2`, `$B$4` or `xfd1048576` into a position
    ///
    /// ```
    /// use price_sheets_core::CellAddress;
    ///
    /// let price = CellAddress::parse("X2").unwrap();
    /// assert_eq!((price.row, price.col), (1, 23));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let reference: String = s.trim().chars().filter(|c| *c != '$').collect();
        let invalid = |reason: &'static str| Error::InvalidAddress {
            reference: s.trim().to_string(),
            reason,
        };

        let digits_at = reference
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(reference.len());
        let (letters, digits) = reference.split_at(digits_at);

        if letters.is_empty() {
            return Err(invalid("missing column letters"));
        }
        if digits.is_empty() {
            return Err(invalid("missing row number"));
        }
        let col = Self::letters_to_column(letters)?;

        let number: u32 = digits.parse().map_err(|_| invalid("row is not a number"))?;
        let row = number
            .checked_sub(1)
            .ok_or_else(|| invalid("rows are numbered from 1"))?;
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }

        Ok(Self { row, col })
    }

    /// Spreadsheet letters for a 0-based column (`22` is `W`, `26` is `AA`)
    pub fn column_to_letters(col: u16) -> String {
        let mut letters = Vec::with_capacity(3);
        let mut rest = u32::from(col) + 1;
        while rest > 0 {
            let digit = (rest - 1) % 26;
            letters.push(b'A' + digit as u8);
            rest = (rest - 1) / 26;
        }
        letters.iter().rev().map(|b| *b as char).collect()
    }

    /// 0-based column for spreadsheet letters, case-insensitive
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        let letters = letters.trim();
        if letters.is_empty() {
            return Err(Error::InvalidColumn(letters.to_string()));
        }

        let number = letters.chars().try_fold(0u32, |acc, c| {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidColumn(letters.to_string()));
            }
            let next = acc * 26 + u32::from(c.to_ascii_uppercase() as u8 - b'A') + 1;
            if next > u32::from(MAX_COLS) {
                return Err(Error::ColumnOutOfBounds(next - 1, MAX_COLS - 1));
            }
            Ok(next)
        })?;

        Ok((number - 1) as u16)
    }

    /// The address in A1 notation
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
