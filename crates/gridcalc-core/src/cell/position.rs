//! Cell position and sheet size types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell position (e.g., "A1", "C5")
///
/// Rows and columns are 0-based internally: `A1` is `(0, 0)` and `C5` is
/// `(4, 2)`. A position can hold coordinates outside the sheet; use
/// [`Position::is_valid`] to check. Formulas keep such positions so they can
/// evaluate to `#REF!` instead of failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ...)
    pub col: u32,
}

impl Position {
    /// Create a new position from 0-based indices
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Whether the position lies within the sheet's coordinate range
    pub fn is_valid(&self) -> bool {
        self.row < MAX_ROWS && self.col < MAX_COLS
    }

    /// Parse a position from A1-style notation, rejecting anything outside
    /// the sheet.
    ///
    /// # Examples
    /// ```
    /// use gridcalc_core::Position;
    ///
    /// let pos = Position::parse("B2").unwrap();
    /// assert_eq!(pos.row, 1);
    /// assert_eq!(pos.col, 1);
    ///
    /// assert!(Position::parse("A0").is_err());
    /// assert!(Position::parse("A99999").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let pos = Self::from_a1(s)
            .ok_or_else(|| Error::InvalidPosition(format!("malformed position '{}'", s)))?;

        if !pos.is_valid() {
            return Err(Error::InvalidPosition(format!(
                "'{}' is outside the sheet (max {}x{})",
                s, MAX_ROWS, MAX_COLS
            )));
        }

        Ok(pos)
    }

    /// Parse A1-style notation without checking the sheet bounds.
    ///
    /// Returns `None` only for malformed text. `$` absolute markers are
    /// accepted and ignored. Coordinates too large to represent saturate,
    /// which makes the result invalid rather than wrapping around.
    pub fn from_a1(s: &str) -> Option<Self> {
        let bytes = s.trim().as_bytes();
        let mut pos = 0;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == col_start {
            return None;
        }
        let col_end = pos;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let row_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == row_start || pos != bytes.len() {
            return None;
        }

        let col = column_from_letters(&bytes[col_start..col_end]);

        let mut row: u32 = 0;
        for &b in &bytes[row_start..pos] {
            row = row.saturating_mul(10).saturating_add((b - b'0') as u32);
        }

        // Rows are 1-based in A1 notation
        if row == 0 {
            return None;
        }

        Some(Self { row: row - 1, col })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u32) -> String {
        let mut result = String::new();
        let mut n = col as u64 + 1;

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row as u64 + 1)
    }
}

/// Column index for ASCII letters (A = 0, Z = 25, AA = 26, etc.).
///
/// The caller guarantees at least one letter. Overlong columns saturate.
fn column_from_letters(letters: &[u8]) -> u32 {
    let base: u32 = letters.iter().fold(0, |col, b| {
        let digit = (b.to_ascii_uppercase() - b'A') as u32 + 1;
        col.saturating_mul(26).saturating_add(digit)
    });
    base - 1
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Printable extent of a sheet, in rows and columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub rows: u32,
    pub cols: u32,
}

impl Size {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Whether the box contains no cells
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Grow the box so that it contains `pos`
    pub fn include(&mut self, pos: Position) {
        self.rows = self.rows.max(pos.row + 1);
        self.cols = self.cols.max(pos.col + 1);
    }
}
