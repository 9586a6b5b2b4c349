//! # gridcalc-core
//!
//! Core data structures for the gridcalc spreadsheet engine.
//!
//! This crate provides the fundamental types used throughout gridcalc:
//! - [`Position`] and [`Size`] - Cell coordinates and sheet bounding boxes
//! - [`CellValue`] - The value a cell evaluates to (number, text or error)
//! - [`CellError`] - Value-level formula errors (#REF!, #VALUE!, #ARITHM!)
//! - [`Error`] - Structural errors raised by sheet operations
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{CellValue, Position};
//!
//! let pos = Position::parse("C5").unwrap();
//! assert_eq!((pos.row, pos.col), (4, 2));
//! assert_eq!(pos.to_string(), "C5");
//!
//! assert_eq!(CellValue::Number(3.0).to_string(), "3");
//! ```

pub mod cell;
pub mod error;

// Re-exports for convenience
pub use cell::{format_number, CellError, CellValue, Position, Size};
pub use error::{Error, Result};

/// Maximum number of rows in a sheet
pub const MAX_ROWS: u32 = 16_384;

/// Maximum number of columns in a sheet
pub const MAX_COLS: u32 = 16_384;

/// Prefix that turns cell text into a formula
pub const FORMULA_SIGN: char = '=';

/// Prefix that forces cell text to be treated literally
pub const ESCAPE_SIGN: char = '\'';
