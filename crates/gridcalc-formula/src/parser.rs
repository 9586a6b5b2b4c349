//! Formula parser
//!
//! A recursive descent parser for arithmetic formulas over cell references,
//! with the usual operator precedence.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use gridcalc_core::{Position, FORMULA_SIGN};

/// Deepest allowed nesting of parentheses and unary signs
pub const MAX_NESTING: usize = 64;

/// Longest accepted expression, in characters
pub const MAX_EXPRESSION_LEN: usize = 8192;

/// Parse a formula string, including its leading `=`, into an AST
///
/// # Example
/// ```rust
/// use gridcalc_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=(A1+B2)/2").unwrap();
/// assert!(parse_formula("1+2").is_err());
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let expression = formula
        .trim_start()
        .strip_prefix(FORMULA_SIGN)
        .ok_or_else(|| FormulaError::Parse(format!("Formula must start with '{}'", FORMULA_SIGN)))?;

    parse_expression(expression)
}

/// Parse a bare expression (the text after the `=`) into an AST
pub fn parse_expression(expression: &str) -> FormulaResult<FormulaExpr> {
    if expression.chars().count() > MAX_EXPRESSION_LEN {
        return Err(FormulaError::Parse(format!(
            "Formula is longer than {} characters",
            MAX_EXPRESSION_LEN
        )));
    }

    let mut parser = FormulaParser::new(expression);

    if matches!(parser.current_token(), Token::Eof) {
        return Err(FormulaError::Parse("Empty expression".into()));
    }

    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if !matches!(parser.current_token(), Token::Eof) {
        return Err(FormulaError::Parse(format!(
            "Unexpected characters after expression: '{}'",
            &parser.input[parser.token_start..]
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    CellRef(Position),
    Identifier(String),

    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,

    /// Text the scanner could not turn into a token
    Invalid(String),

    Eof,
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    token_start: usize,
    current_token: Option<Token>,
    depth: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> Self {
        let mut parser = Self {
            input,
            pos: 0,
            token_start: 0,
            current_token: None,
            depth: 0,
        };
        parser.advance_token();
        parser
    }

    // === Token scanning ===

    fn advance_token(&mut self) {
        self.skip_whitespace();
        self.token_start = self.pos;
        self.current_token = Some(self.scan_token());
    }

    fn scan_token(&mut self) -> Token {
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Token::Eof,
        };

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return token;
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            return self.scan_identifier_or_ref();
        }

        self.advance();
        Token::Invalid(c.to_string())
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent part
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let num_str = &self.input[start..self.pos];
        match num_str.parse::<f64>() {
            Ok(num) if num.is_finite() => Token::Number(num),
            _ => Token::Invalid(num_str.to_string()),
        }
    }

    fn scan_identifier_or_ref(&mut self) -> Token {
        let start = self.pos;

        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.')
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];

        match Position::from_a1(text) {
            Some(pos) => Token::CellRef(pos),
            None => Token::Identifier(text.to_string()),
        }
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        self.current_token.as_ref().unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> Token {
        let token = self.current_token.take().unwrap_or(Token::Eof);
        self.advance_token();
        token
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume();
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /
    // 3. Unary: +, -
    // 4. Primary: numbers, references, parentheses

    fn parse_expression(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume();
            let right = self.parse_multiplicative()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume();
            let right = self.parse_unary()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<FormulaExpr> {
        let mut ops = Vec::new();
        loop {
            let op = match self.current_token() {
                Token::Minus => UnaryOperator::Negate,
                Token::Plus => UnaryOperator::Plus,
                _ => break,
            };
            ops.push(op);
            self.consume();
        }

        self.enter(ops.len())?;
        let mut expr = self.parse_primary()?;
        self.depth -= ops.len();

        // Innermost sign first
        for op in ops.into_iter().rev() {
            expr = FormulaExpr::UnaryOp {
                op,
                operand: Box::new(expr),
            };
        }
        Ok(expr)
    }

    /// Descend `levels` deeper, failing past [`MAX_NESTING`]
    fn enter(&mut self, levels: usize) -> FormulaResult<()> {
        self.depth += levels;
        if self.depth > MAX_NESTING {
            return Err(FormulaError::Parse(format!(
                "Formula nesting exceeds {} levels",
                MAX_NESTING
            )));
        }
        Ok(())
    }

    fn parse_primary(&mut self) -> FormulaResult<FormulaExpr> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume();
                Ok(FormulaExpr::Number(n))
            }

            Token::CellRef(pos) => {
                self.consume();
                Ok(FormulaExpr::CellRef(pos))
            }

            Token::LeftParen => {
                self.consume();
                self.enter(1)?;
                let expr = self.parse_expression()?;
                self.depth -= 1;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            Token::Identifier(name) => Err(FormulaError::UnknownName(name)),

            Token::Invalid(text) => Err(FormulaError::Parse(format!("Unexpected '{}'", text))),

            Token::Eof => Err(FormulaError::Parse("Unexpected end of formula".into())),

            other => Err(FormulaError::Parse(format!("Unexpected token: {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(s: &str) -> FormulaExpr {
        FormulaExpr::CellRef(Position::parse(s).unwrap())
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("=42").unwrap(), FormulaExpr::Number(42.0));
        assert_eq!(parse_formula("=3.25").unwrap(), FormulaExpr::Number(3.25));
        assert_eq!(parse_formula("=1e10").unwrap(), FormulaExpr::Number(1e10));
        assert_eq!(parse_formula("=.5").unwrap(), FormulaExpr::Number(0.5));
    }

    #[test]
    fn test_parse_arithmetic_precedence() {
        // 1+2*3 parses as 1+(2*3)
        let ast = parse_formula("=1+2*3").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Add);
            assert_eq!(*left, FormulaExpr::Number(1.0));
            assert!(matches!(
                *right,
                FormulaExpr::BinaryOp {
                    op: BinaryOperator::Multiply,
                    ..
                }
            ));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_left_associative() {
        // 8-2-1 parses as (8-2)-1
        let ast = parse_expression("8-2-1").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Subtract);
            assert!(matches!(*left, FormulaExpr::BinaryOp { .. }));
            assert_eq!(*right, FormulaExpr::Number(1.0));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_unary() {
        let ast = parse_formula("=-5").unwrap();
        assert!(matches!(
            ast,
            FormulaExpr::UnaryOp {
                op: UnaryOperator::Negate,
                ..
            }
        ));

        let ast = parse_formula("=+A1").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::UnaryOp {
                op: UnaryOperator::Plus,
                operand: Box::new(cell("A1")),
            }
        );

        assert!(parse_expression("2*-3").is_ok());
        assert!(parse_expression("1--1").is_ok());
    }

    #[test]
    fn test_parse_cell_reference() {
        assert_eq!(parse_formula("=A1").unwrap(), cell("A1"));
        assert_eq!(parse_formula("=$B$2").unwrap(), cell("B2"));
        assert_eq!(parse_formula("=c10").unwrap(), cell("C10"));
    }

    #[test]
    fn test_parse_out_of_range_reference() {
        let ast = parse_expression("ZZZZ1+1").unwrap();
        if let FormulaExpr::BinaryOp { left, .. } = ast {
            match *left {
                FormulaExpr::CellRef(pos) => assert!(!pos.is_valid()),
                other => panic!("Expected CellRef, got {:?}", other),
            }
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_parentheses() {
        let ast = parse_formula("=(1+2)*3").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Multiply);
            assert!(matches!(
                *left,
                FormulaExpr::BinaryOp {
                    op: BinaryOperator::Add,
                    ..
                }
            ));
            assert_eq!(*right, FormulaExpr::Number(3.0));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_whitespace() {
        assert_eq!(
            parse_expression(" A1 +  2 ").unwrap(),
            parse_expression("A1+2").unwrap()
        );
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "   ", "1+", "(1", "1)", "1 2", "1e", "1e999", "#", "A1:B2"] {
            assert!(
                matches!(parse_expression(bad), Err(FormulaError::Parse(_))),
                "expected parse error for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_parse_unknown_name() {
        assert_eq!(
            parse_expression("SUM(A1)"),
            Err(FormulaError::UnknownName("SUM".into()))
        );
        assert_eq!(
            parse_expression("1+foo"),
            Err(FormulaError::UnknownName("foo".into()))
        );
        assert_eq!(
            parse_expression("A1B"),
            Err(FormulaError::UnknownName("A1B".into()))
        );
    }

    #[test]
    fn test_nesting_limit() {
        let signs = format!("{}1", "-".repeat(MAX_NESTING));
        assert!(parse_expression(&signs).is_ok());
        let parens = format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert!(parse_expression(&parens).is_ok());

        for deep in [
            format!("{}1", "-".repeat(MAX_NESTING + 1)),
            format!("{}1{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1)),
            format!("{}1{}", "-(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING)),
        ] {
            assert!(
                matches!(parse_expression(&deep), Err(FormulaError::Parse(_))),
                "expected nesting error for {} chars",
                deep.len()
            );
        }
    }

    #[test]
    fn test_overlong_formula_rejected() {
        let signs = format!("={}1", "-".repeat(200_000));
        assert!(matches!(parse_formula(&signs), Err(FormulaError::Parse(_))));

        let sum = vec!["1"; MAX_EXPRESSION_LEN].join("+");
        assert!(matches!(parse_expression(&sum), Err(FormulaError::Parse(_))));
    }
}
