//! Prelude module - common imports for gridcalc users
//!
//! ```rust
//! use gridcalc::prelude::*;
//! ```

pub use crate::{
    CellError,
    CellHandle,
    CellHandleMut,
    // Evaluation
    CellLookup,
    CellValue,
    // Error types
    Error,
    Formula,
    Position,
    Result,
    // Main types
    Sheet,
    SheetOptions,
    SheetStats,
    Size,
};
