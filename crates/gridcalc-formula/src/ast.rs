//! Formula Abstract Syntax Tree types
//!
//! `Display` on [`FormulaExpr`] produces the canonical expression text:
//! references in A1 form and only the parentheses the grammar needs.

use gridcalc_core::{format_number, CellError, Position};
use std::fmt;

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Numeric literal
    Number(f64),

    /// Single cell reference. The position may lie outside the sheet, in
    /// which case it evaluates to `#REF!`.
    CellRef(Position),

    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Negate,
}

// Binding strength, loosest first
const PREC_ADDITIVE: u8 = 1;
const PREC_MULTIPLICATIVE: u8 = 2;
const PREC_UNARY: u8 = 3;
const PREC_ATOM: u8 = 4;

impl BinaryOperator {
    pub fn symbol(&self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => PREC_ADDITIVE,
            BinaryOperator::Multiply | BinaryOperator::Divide => PREC_MULTIPLICATIVE,
        }
    }

    /// `a op (b op' c)` differs from `a op b op' c` for these operators
    fn is_right_sensitive(&self) -> bool {
        matches!(self, BinaryOperator::Subtract | BinaryOperator::Divide)
    }
}

impl UnaryOperator {
    pub fn symbol(&self) -> char {
        match self {
            UnaryOperator::Plus => '+',
            UnaryOperator::Negate => '-',
        }
    }
}

impl FormulaExpr {
    fn precedence(&self) -> u8 {
        match self {
            FormulaExpr::Number(_) | FormulaExpr::CellRef(_) => PREC_ATOM,
            FormulaExpr::UnaryOp { .. } => PREC_UNARY,
            FormulaExpr::BinaryOp { op, .. } => op.precedence(),
        }
    }

    /// Visit every cell reference in the expression, left to right
    pub fn for_each_reference(&self, f: &mut impl FnMut(Position)) {
        match self {
            FormulaExpr::Number(_) => {}
            FormulaExpr::CellRef(pos) => f(*pos),
            FormulaExpr::UnaryOp { operand, .. } => operand.for_each_reference(f),
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.for_each_reference(f);
                right.for_each_reference(f);
            }
        }
    }
}

fn write_child(f: &mut fmt::Formatter<'_>, child: &FormulaExpr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

impl fmt::Display for FormulaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaExpr::Number(n) => write!(f, "{}", format_number(*n)),
            FormulaExpr::CellRef(pos) if pos.is_valid() => write!(f, "{}", pos),
            FormulaExpr::CellRef(_) => write!(f, "{}", CellError::Ref),
            FormulaExpr::UnaryOp { op, operand } => {
                write!(f, "{}", op.symbol())?;
                write_child(f, operand, operand.precedence() < PREC_UNARY)
            }
            FormulaExpr::BinaryOp { op, left, right } => {
                let prec = op.precedence();
                write_child(f, left, left.precedence() < prec)?;
                write!(f, "{}", op.symbol())?;
                let right_prec = right.precedence();
                write_child(
                    f,
                    right,
                    right_prec < prec || (right_prec == prec && op.is_right_sensitive()),
                )
            }
        }
    }
}
