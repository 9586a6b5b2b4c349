//! Error types for gridcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Structural errors raised by sheet operations.
///
/// Every one of these leaves the sheet exactly as it was before the failed
/// call. Errors produced while *evaluating* a formula are not represented
/// here; they are [`CellError`](crate::CellError) values.
#[derive(Debug, Error)]
pub enum Error {
    /// Position outside the representable coordinate range, or malformed
    /// A1 notation
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    /// Formula text could not be parsed
    #[error("Formula parse error: {0}")]
    FormulaParse(String),

    /// Committing the edit would create a reference cycle
    #[error("Circular dependency detected involving cell {0}")]
    CircularDependency(String),

    /// Writing sheet output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for [`Error::InvalidPosition`]
    pub fn is_invalid_position(&self) -> bool {
        matches!(self, Error::InvalidPosition(_))
    }

    /// Returns true for [`Error::FormulaParse`]
    pub fn is_formula_parse(&self) -> bool {
        matches!(self, Error::FormulaParse(_))
    }

    /// Returns true for [`Error::CircularDependency`]
    pub fn is_circular_dependency(&self) -> bool {
        matches!(self, Error::CircularDependency(_))
    }
}
