//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while parsing a formula.
///
/// Evaluation never fails with this type; evaluation problems are
/// [`CellError`](gridcalc_core::CellError) values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Malformed formula text
    #[error("Parse error: {0}")]
    Parse(String),

    /// Identifier that is neither a cell reference nor anything else the
    /// grammar knows
    #[error("Unknown name: {0}")]
    UnknownName(String),
}

impl From<FormulaError> for gridcalc_core::Error {
    fn from(err: FormulaError) -> Self {
        gridcalc_core::Error::FormulaParse(err.to_string())
    }
}
