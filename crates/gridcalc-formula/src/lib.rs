//! # gridcalc-formula
//!
//! Formula parser and evaluator for gridcalc.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Formula evaluation (AST → number or error) against a [`CellLookup`]
//! - Canonical re-printing of a formula with minimal parentheses
//! - The set of positions a formula reads, for dependency tracking
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{CellValue, Position};
//! use gridcalc_formula::{Formula, FormulaValue};
//!
//! let formula = Formula::parse("(A1 + 2) * 3").unwrap();
//! assert_eq!(formula.expression(), "(A1+2)*3");
//! assert_eq!(formula.referenced_cells(), &[Position::new(0, 0)]);
//!
//! let lookup = |_: Position| CellValue::Number(1.0);
//! assert_eq!(formula.evaluate(&lookup), FormulaValue::Number(9.0));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, CellLookup, EvaluationContext, FormulaValue};
pub use formula::Formula;
pub use parser::{parse_expression, parse_formula};
