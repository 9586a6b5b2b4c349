//! Cell-related types and utilities
//!
//! This module contains:
//! - [`Position`] - A cell's location (e.g., "A1")
//! - [`Size`] - The printable extent of a sheet
//! - [`CellValue`] - The value a cell evaluates to
//! - [`CellError`] - Formula error markers

mod position;
mod value;

pub use position::{Position, Size};
pub use value::{format_number, CellError, CellValue};
