//! Parsed formula handle

use crate::ast::FormulaExpr;
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{evaluate, CellLookup, EvaluationContext, FormulaValue};
use crate::parser::parse_expression;
use gridcalc_core::Position;
use std::fmt;
use std::str::FromStr;

/// A parsed formula expression together with the cells it reads.
///
/// The referenced positions are computed once at parse time: valid
/// positions only, sorted and without duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    ast: FormulaExpr,
    referenced: Vec<Position>,
}

impl Formula {
    /// Parse an expression (the text after the leading `=`)
    pub fn parse(expression: &str) -> FormulaResult<Self> {
        let ast = parse_expression(expression)?;
        Ok(Self::from_ast(ast))
    }

    /// Wrap an already parsed expression
    pub fn from_ast(ast: FormulaExpr) -> Self {
        let mut referenced = Vec::new();
        ast.for_each_reference(&mut |pos| {
            if pos.is_valid() {
                referenced.push(pos);
            }
        });
        referenced.sort_unstable();
        referenced.dedup();

        Self { ast, referenced }
    }

    /// Evaluate against the given cell values
    pub fn evaluate(&self, lookup: &dyn CellLookup) -> FormulaValue {
        evaluate(&self.ast, &EvaluationContext::new(lookup)).into()
    }

    /// Canonical expression text, without the leading `=`
    pub fn expression(&self) -> String {
        self.ast.to_string()
    }

    /// Positions this formula reads, sorted
    pub fn referenced_cells(&self) -> &[Position] {
        &self.referenced
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ast)
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> FormulaResult<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcalc_core::{CellError, CellValue};
    use pretty_assertions::assert_eq;

    fn expression(s: &str) -> String {
        Formula::parse(s).unwrap().expression()
    }

    fn positions(list: &[&str]) -> Vec<Position> {
        list.iter().map(|s| Position::parse(s).unwrap()).collect()
    }

    #[test]
    fn test_canonical_expression() {
        assert_eq!(expression("1 + 2"), "1+2");
        assert_eq!(expression("(1+2)*3"), "(1+2)*3");
        assert_eq!(expression("(1*2)+3"), "1*2+3");
        assert_eq!(expression("((A1))"), "A1");
        assert_eq!(expression("1-(2+3)"), "1-(2+3)");
        assert_eq!(expression("1+(2-3)"), "1+2-3");
        assert_eq!(expression("(8/2)/2"), "8/2/2");
        assert_eq!(expression("8/(2/2)"), "8/(2/2)");
        assert_eq!(expression("2*(3*4)"), "2*3*4");
        assert_eq!(expression("-(A1)"), "-A1");
        assert_eq!(expression("-(1+2)*3"), "-(1+2)*3");
        assert_eq!(expression("$a$1+b2"), "A1+B2");
        assert_eq!(expression("1.50"), "1.5");
    }

    #[test]
    fn test_canonical_expression_reparses_identically() {
        for text in ["1-(2-3)", "-(A1+B2)/C3", "+1--2", "A1/(B1*C1)-D1"] {
            let once = Formula::parse(text).unwrap();
            let twice = Formula::parse(&once.expression()).unwrap();
            assert_eq!(once, twice, "{}", text);
        }
    }

    #[test]
    fn test_out_of_range_reference_prints_ref_error() {
        assert_eq!(expression("ZZZZ1+A1"), "#REF!+A1");
    }

    #[test]
    fn test_referenced_cells_sorted_unique_valid() {
        let formula = Formula::parse("B2+A1+B2+ZZZZ9+A10").unwrap();
        assert_eq!(formula.referenced_cells(), positions(&["A1", "B2", "A10"]).as_slice());

        assert!(Formula::parse("1+2").unwrap().referenced_cells().is_empty());
    }

    #[test]
    fn test_evaluate_with_lookup() {
        let formula = Formula::parse("A1/A2").unwrap();

        let lookup = |pos: Position| match pos.to_string().as_str() {
            "A1" => CellValue::Number(6.0),
            "A2" => CellValue::Number(3.0),
            _ => CellValue::empty(),
        };
        assert_eq!(formula.evaluate(&lookup), FormulaValue::Number(2.0));

        let empty = |_: Position| CellValue::empty();
        assert_eq!(
            formula.evaluate(&empty),
            FormulaValue::Error(CellError::Arithmetic)
        );
    }

    #[test]
    fn test_from_str() {
        let formula: Formula = "A1*2".parse().unwrap();
        assert_eq!(formula.to_string(), "A1*2");
        assert!("A1*".parse::<Formula>().is_err());
    }
}
