//! Formula evaluator
//!
//! Evaluates formula ASTs to produce a number or a formula error.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use gridcalc_core::{CellError, CellValue, Position};

/// Result of evaluating a formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    Error(CellError),
}

impl From<Result<f64, CellError>> for FormulaValue {
    fn from(result: Result<f64, CellError>) -> Self {
        match result {
            Ok(n) => FormulaValue::Number(n),
            Err(e) => FormulaValue::Error(e),
        }
    }
}

impl From<FormulaValue> for CellValue {
    fn from(value: FormulaValue) -> Self {
        match value {
            FormulaValue::Number(n) => CellValue::Number(n),
            FormulaValue::Error(e) => CellValue::Error(e),
        }
    }
}

/// Read access to cell values during evaluation.
///
/// Implementations must return the *current* value of the cell, evaluating
/// it on demand if it holds a formula.
pub trait CellLookup {
    fn value_at(&self, pos: Position) -> CellValue;
}

impl<F> CellLookup for F
where
    F: Fn(Position) -> CellValue,
{
    fn value_at(&self, pos: Position) -> CellValue {
        self(pos)
    }
}

/// Context for formula evaluation
pub struct EvaluationContext<'a> {
    /// Source of referenced cell values
    pub lookup: Option<&'a dyn CellLookup>,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context
    pub fn new(lookup: &'a dyn CellLookup) -> Self {
        Self {
            lookup: Some(lookup),
        }
    }

    /// Create a context where every cell is empty (for testing)
    pub fn simple() -> Self {
        Self { lookup: None }
    }

    /// Get a referenced cell's value as a number.
    ///
    /// Positions outside the sheet are `#REF!`; see
    /// [`CellValue::to_number`] for the coercion rules.
    pub fn get_cell_number(&self, pos: Position) -> Result<f64, CellError> {
        if !pos.is_valid() {
            return Err(CellError::Ref);
        }

        match self.lookup {
            Some(lookup) => lookup.value_at(pos).to_number(),
            None => Ok(0.0),
        }
    }
}

/// Evaluate a formula expression
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext) -> Result<f64, CellError> {
    match expr {
        FormulaExpr::Number(n) => Ok(*n),

        FormulaExpr::CellRef(pos) => ctx.get_cell_number(*pos),

        FormulaExpr::UnaryOp { op, operand } => evaluate_unary_op(*op, operand, ctx),

        FormulaExpr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, ctx),
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &FormulaExpr,
    right: &FormulaExpr,
    ctx: &EvaluationContext,
) -> Result<f64, CellError> {
    // Errors propagate, left operand first
    let l = evaluate(left, ctx)?;
    let r = evaluate(right, ctx)?;

    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => l / r,
    };

    // Division by zero and overflow both end up here
    if result.is_finite() {
        Ok(result)
    } else {
        Err(CellError::Arithmetic)
    }
}

/// Evaluate a unary operation
fn evaluate_unary_op(
    op: UnaryOperator,
    operand: &FormulaExpr,
    ctx: &EvaluationContext,
) -> Result<f64, CellError> {
    let n = evaluate(operand, ctx)?;

    match op {
        UnaryOperator::Plus => Ok(n),
        UnaryOperator::Negate => Ok(-n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;

    fn eval(formula: &str) -> Result<f64, CellError> {
        let ast = parse_formula(formula).unwrap();
        let ctx = EvaluationContext::simple();
        evaluate(&ast, &ctx)
    }

    fn eval_with(formula: &str, lookup: &dyn CellLookup) -> Result<f64, CellError> {
        let ast = parse_formula(formula).unwrap();
        evaluate(&ast, &EvaluationContext::new(lookup))
    }

    fn sample_sheet(pos: Position) -> CellValue {
        match pos.to_string().as_str() {
            "A1" => CellValue::Number(10.0),
            "A2" => CellValue::text("4"),
            "A3" => CellValue::text("four"),
            "A4" => CellValue::Error(CellError::Arithmetic),
            _ => CellValue::empty(),
        }
    }

    #[test]
    fn test_evaluate_number() {
        assert_eq!(eval("=42"), Ok(42.0));
        assert_eq!(eval("=3.25"), Ok(3.25));
    }

    #[test]
    fn test_evaluate_arithmetic() {
        assert_eq!(eval("=1+2"), Ok(3.0));
        assert_eq!(eval("=10-4"), Ok(6.0));
        assert_eq!(eval("=3*4"), Ok(12.0));
        assert_eq!(eval("=10/4"), Ok(2.5));
    }

    #[test]
    fn test_evaluate_precedence() {
        assert_eq!(eval("=1+2*3"), Ok(7.0));
        assert_eq!(eval("=(1+2)*3"), Ok(9.0));
        assert_eq!(eval("=8-2-1"), Ok(5.0));
        assert_eq!(eval("=8/2/2"), Ok(2.0));
    }

    #[test]
    fn test_evaluate_unary() {
        assert_eq!(eval("=-5"), Ok(-5.0));
        assert_eq!(eval("=--5"), Ok(5.0));
        assert_eq!(eval("=+5"), Ok(5.0));
        assert_eq!(eval("=2*-3"), Ok(-6.0));
    }

    #[test]
    fn test_evaluate_division_by_zero() {
        assert_eq!(eval("=1/0"), Err(CellError::Arithmetic));
        assert_eq!(eval("=0/0"), Err(CellError::Arithmetic));
    }

    #[test]
    fn test_evaluate_overflow() {
        assert_eq!(eval("=1e308*10"), Err(CellError::Arithmetic));
    }

    #[test]
    fn test_evaluate_empty_context() {
        // Without a lookup every cell reads as empty, i.e. 0
        assert_eq!(eval("=A1+1"), Ok(1.0));
    }

    #[test]
    fn test_evaluate_with_cell_references() {
        assert_eq!(eval_with("=A1*2", &sample_sheet), Ok(20.0));
        assert_eq!(eval_with("=A1+A2", &sample_sheet), Ok(14.0));
        assert_eq!(eval_with("=B7+1", &sample_sheet), Ok(1.0));
    }

    #[test]
    fn test_evaluate_reference_errors() {
        assert_eq!(eval_with("=A3+1", &sample_sheet), Err(CellError::Value));
        assert_eq!(eval_with("=A4+1", &sample_sheet), Err(CellError::Arithmetic));
        assert_eq!(eval_with("=ZZZZ1+1", &sample_sheet), Err(CellError::Ref));
        assert_eq!(eval("=A99999"), Err(CellError::Ref));
    }

    #[test]
    fn test_error_propagates_left_first() {
        assert_eq!(eval_with("=A3+A4", &sample_sheet), Err(CellError::Value));
        assert_eq!(eval_with("=A4+A3", &sample_sheet), Err(CellError::Arithmetic));
    }

    #[test]
    fn test_formula_value_conversions() {
        assert_eq!(FormulaValue::from(Ok(1.5)), FormulaValue::Number(1.5));
        assert_eq!(
            FormulaValue::from(Err(CellError::Ref)),
            FormulaValue::Error(CellError::Ref)
        );
        assert_eq!(
            CellValue::from(FormulaValue::Error(CellError::Value)),
            CellValue::Error(CellError::Value)
        );
    }
}
