//! # gridcalc
//!
//! An in-memory spreadsheet engine: cells hold text or formulas, formulas
//! reference other cells, and results are cached until something they
//! depend on changes.
//!
//! ## Features
//!
//! - Arithmetic formulas over cell references (`=A1*(B2-3)`)
//! - Reference cycles rejected at edit time
//! - Lazy recomputation with per-cell caching and targeted invalidation
//! - Tab-separated printing of values or texts
//!
//! ## Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut sheet = Sheet::new();
//! let a1 = Position::parse("A1").unwrap();
//! let a2 = Position::parse("A2").unwrap();
//! let a3 = Position::parse("A3").unwrap();
//!
//! sheet.set_cell(a1, "1").unwrap();
//! sheet.set_cell(a2, "2").unwrap();
//! sheet.set_cell(a3, "=A1+A2").unwrap();
//! assert_eq!(sheet.get_cell(a3).unwrap().unwrap().value(), CellValue::Number(3.0));
//!
//! sheet.set_cell(a1, "10").unwrap();
//! assert_eq!(sheet.get_cell(a3).unwrap().unwrap().value(), CellValue::Number(12.0));
//! ```

pub mod cell;
mod graph;
pub mod handle;
pub mod prelude;
pub mod sheet;

pub use cell::{Cell, CellContent};
pub use handle::{CellHandle, CellHandleMut};
pub use sheet::{Sheet, SheetOptions, SheetStats};

// Re-export core types
pub use gridcalc_core::{
    CellError, CellValue, Error, Position, Result, Size, MAX_COLS, MAX_ROWS,
};

// Re-export formula types
pub use gridcalc_formula::{CellLookup, Formula, FormulaError, FormulaValue};
