//! Cell content and per-cell dependency state

use ahash::AHashSet;
use gridcalc_core::{CellValue, Position, Result, ESCAPE_SIGN, FORMULA_SIGN};
use gridcalc_formula::{CellLookup, Formula, FormulaValue};
use std::cell::OnceCell;
use std::collections::BTreeSet;

/// What a cell holds, classified from its raw text
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellContent {
    /// No text
    #[default]
    Empty,

    /// Literal text, stored verbatim (including a leading escape sign)
    Text(String),

    /// A parsed formula and its canonical text (`=` + expression)
    Formula { formula: Formula, text: String },
}

impl CellContent {
    /// Classify raw cell text.
    ///
    /// - `""` is [`CellContent::Empty`]
    /// - `=` followed by at least one character is a formula; the rest of the
    ///   text must parse
    /// - anything else, including a lone `=`, is [`CellContent::Text`]
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Ok(CellContent::Empty);
        }

        match raw.strip_prefix(FORMULA_SIGN) {
            Some(expression) if !expression.is_empty() => {
                let formula = Formula::parse(expression)?;
                let text = format!("{}{}", FORMULA_SIGN, formula.expression());
                Ok(CellContent::Formula { formula, text })
            }
            _ => Ok(CellContent::Text(raw.to_string())),
        }
    }

    /// Text representation: what the user would see when editing the cell
    pub fn text(&self) -> &str {
        match self {
            CellContent::Empty => "",
            CellContent::Text(raw) => raw,
            CellContent::Formula { text, .. } => text,
        }
    }

    /// Positions this content reads (formulas only)
    pub fn referenced_cells(&self) -> &[Position] {
        match self {
            CellContent::Formula { formula, .. } => formula.referenced_cells(),
            _ => &[],
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellContent::Formula { .. })
    }

    /// Value of non-formula content
    fn literal_value(&self) -> CellValue {
        match self {
            CellContent::Empty => CellValue::empty(),
            CellContent::Text(raw) => {
                let value = raw.strip_prefix(ESCAPE_SIGN).unwrap_or(raw);
                CellValue::text(value)
            }
            // Formulas are evaluated through the cache, never here
            CellContent::Formula { .. } => CellValue::empty(),
        }
    }
}

/// One slot of a sheet.
///
/// Edges are stored as positions and resolved through the owning
/// [`Sheet`](crate::Sheet); a cell never points into another cell's memory.
/// `references` must always equal the content's referenced cells and
/// `referenced_by` must be its transpose. Only the sheet mutates either.
#[derive(Debug, Default)]
pub struct Cell {
    content: CellContent,
    cache: OnceCell<FormulaValue>,
    /// Cells this cell reads
    pub(crate) references: BTreeSet<Position>,
    /// Cells that read this cell
    pub(crate) referenced_by: AHashSet<Position>,
    /// Set by an explicit clear; the slot then reads back as "no cell" and is
    /// reclaimed as soon as nothing references it
    pub(crate) cleared: bool,
}

impl Cell {
    /// An empty cell with no edges
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    pub fn text(&self) -> &str {
        self.content.text()
    }

    /// Cells this cell reads, in row-major order
    pub fn referenced_cells(&self) -> Vec<Position> {
        self.references.iter().copied().collect()
    }

    /// Cells that read this cell, in row-major order
    pub fn dependent_cells(&self) -> Vec<Position> {
        let mut dependents: Vec<Position> = self.referenced_by.iter().copied().collect();
        dependents.sort_unstable();
        dependents
    }

    /// Whether a formula result is currently cached
    pub fn has_cache(&self) -> bool {
        self.cache.get().is_some()
    }

    /// The cell's value.
    ///
    /// Formula results come from the cache when present; otherwise the
    /// formula is evaluated against `lookup` and the result stored.
    pub fn value(&self, lookup: &dyn CellLookup) -> CellValue {
        match &self.content {
            CellContent::Formula { formula, .. } => {
                (*self.cache.get_or_init(|| formula.evaluate(lookup))).into()
            }
            other => other.literal_value(),
        }
    }

    /// Drop the cached result. Returns whether there was one.
    pub(crate) fn invalidate_cache(&mut self) -> bool {
        self.cache.take().is_some()
    }

    /// Replace content and outgoing edges together
    pub(crate) fn replace_content(&mut self, content: CellContent, references: BTreeSet<Position>) {
        self.content = content;
        self.references = references;
        self.cache = OnceCell::new();
    }

    /// No edge touches this cell in either direction
    pub(crate) fn is_detached(&self) -> bool {
        self.references.is_empty() && self.referenced_by.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcalc_core::CellError;
    use pretty_assertions::assert_eq;

    fn constant(value: f64) -> impl Fn(Position) -> CellValue {
        move |_| CellValue::Number(value)
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(CellContent::parse("").unwrap(), CellContent::Empty);
    }

    #[test]
    fn test_classify_text() {
        assert_eq!(
            CellContent::parse("hello").unwrap(),
            CellContent::Text("hello".into())
        );
        // A lone formula sign is plain text
        assert_eq!(CellContent::parse("=").unwrap(), CellContent::Text("=".into()));
        assert_eq!(
            CellContent::parse("'=1+2").unwrap(),
            CellContent::Text("'=1+2".into())
        );
    }

    #[test]
    fn test_classify_formula() {
        let content = CellContent::parse("=(A1 + 2)").unwrap();
        assert!(content.is_formula());
        assert_eq!(content.text(), "=A1+2");
        assert_eq!(content.referenced_cells(), &[Position::new(0, 0)]);
    }

    #[test]
    fn test_classify_formula_parse_error() {
        let err = CellContent::parse("=1+").unwrap_err();
        assert!(err.is_formula_parse());
    }

    #[test]
    fn test_escaped_text_value() {
        let mut cell = Cell::new();
        cell.replace_content(CellContent::parse("'=1+2").unwrap(), BTreeSet::new());

        assert_eq!(cell.text(), "'=1+2");
        assert_eq!(cell.value(&constant(0.0)), CellValue::text("=1+2"));
    }

    #[test]
    fn test_text_value_is_verbatim() {
        let mut cell = Cell::new();
        cell.replace_content(CellContent::parse("12").unwrap(), BTreeSet::new());
        assert_eq!(cell.value(&constant(0.0)), CellValue::text("12"));
        assert!(!cell.has_cache());
    }

    #[test]
    fn test_empty_cell_value() {
        let cell = Cell::new();
        assert_eq!(cell.text(), "");
        assert_eq!(cell.value(&constant(0.0)), CellValue::empty());
        assert!(cell.referenced_cells().is_empty());
        assert!(cell.is_detached());
    }

    #[test]
    fn test_formula_value_is_cached() {
        let mut cell = Cell::new();
        cell.replace_content(CellContent::parse("=A1*2").unwrap(), BTreeSet::new());
        assert!(!cell.has_cache());

        assert_eq!(cell.value(&constant(4.0)), CellValue::Number(8.0));
        assert!(cell.has_cache());

        // A different lookup is ignored while the cache is valid
        assert_eq!(cell.value(&constant(100.0)), CellValue::Number(8.0));

        assert!(cell.invalidate_cache());
        assert!(!cell.invalidate_cache());
        assert_eq!(cell.value(&constant(100.0)), CellValue::Number(200.0));
    }

    #[test]
    fn test_formula_error_value() {
        let mut cell = Cell::new();
        cell.replace_content(CellContent::parse("=1/A1").unwrap(), BTreeSet::new());
        assert_eq!(
            cell.value(&constant(0.0)),
            CellValue::Error(CellError::Arithmetic)
        );
    }
}
