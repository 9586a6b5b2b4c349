//! Borrowed views of a single cell

use crate::cell::{Cell, CellContent};
use crate::sheet::Sheet;
use gridcalc_core::{CellValue, Position, Result};
use gridcalc_formula::CellLookup;

/// Read access to a live cell
#[derive(Debug, Clone, Copy)]
pub struct CellHandle<'a> {
    sheet: &'a Sheet,
    pos: Position,
    cell: &'a Cell,
}

impl<'a> CellHandle<'a> {
    pub(crate) fn new(sheet: &'a Sheet, pos: Position, cell: &'a Cell) -> Self {
        Self { sheet, pos, cell }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    /// Current value, evaluating the formula if its result is not cached
    pub fn value(&self) -> CellValue {
        self.sheet.cell_value(self.pos, self.cell)
    }

    /// Text as entered, with formulas in canonical form
    pub fn text(&self) -> &'a str {
        self.cell.text()
    }

    pub fn content(&self) -> &'a CellContent {
        self.cell.content()
    }

    /// Cells this one reads, in row-major order
    pub fn referenced_cells(&self) -> Vec<Position> {
        self.cell.referenced_cells()
    }

    /// Cells that read this one, in row-major order
    pub fn dependent_cells(&self) -> Vec<Position> {
        self.cell.dependent_cells()
    }
}

/// Write access to a live cell.
///
/// Edits go through the owning sheet so the reference graph stays
/// consistent.
#[derive(Debug)]
pub struct CellHandleMut<'a> {
    sheet: &'a mut Sheet,
    pos: Position,
}

impl<'a> CellHandleMut<'a> {
    pub(crate) fn new(sheet: &'a mut Sheet, pos: Position) -> Self {
        Self { sheet, pos }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    /// Current value, evaluating the formula if its result is not cached
    pub fn value(&self) -> CellValue {
        self.sheet.value_at(self.pos)
    }

    pub fn text(&self) -> &str {
        self.sheet.live_cell(self.pos).map_or("", Cell::text)
    }

    pub fn referenced_cells(&self) -> Vec<Position> {
        self.sheet
            .live_cell(self.pos)
            .map(Cell::referenced_cells)
            .unwrap_or_default()
    }

    /// Replace the cell's text; see [`Sheet::set_cell`]
    pub fn set(&mut self, text: &str) -> Result<()> {
        self.sheet.set_cell(self.pos, text)
    }

    /// Clear the cell; see [`Sheet::clear_cell`]
    pub fn clear(self) -> Result<()> {
        self.sheet.clear_cell(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use crate::Sheet;
    use gridcalc_core::{CellValue, Position};
    use pretty_assertions::assert_eq;

    fn pos(a1: &str) -> Position {
        Position::parse(a1).unwrap()
    }

    #[test]
    fn test_read_handle() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "2").unwrap();
        sheet.set_cell(pos("B1"), "=A1 * 3").unwrap();

        let b1 = sheet.get_cell(pos("B1")).unwrap().unwrap();
        assert_eq!(b1.position(), pos("B1"));
        assert_eq!(b1.text(), "=A1*3");
        assert_eq!(b1.value(), CellValue::Number(6.0));
        assert_eq!(b1.referenced_cells(), vec![pos("A1")]);

        let a1 = sheet.get_cell(pos("A1")).unwrap().unwrap();
        assert_eq!(a1.dependent_cells(), vec![pos("B1")]);
    }

    #[test]
    fn test_mutable_handle_set() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "2").unwrap();
        sheet.set_cell(pos("B1"), "=A1").unwrap();

        let mut a1 = sheet.get_cell_mut(pos("A1")).unwrap().unwrap();
        a1.set("=7*2").unwrap();
        assert_eq!(a1.value(), CellValue::Number(14.0));
        assert_eq!(a1.text(), "=7*2");

        // A rejected edit leaves the handle usable
        assert!(a1.set("=B1").is_err());
        assert_eq!(a1.text(), "=7*2");

        assert_eq!(
            sheet.get_cell(pos("B1")).unwrap().unwrap().value(),
            CellValue::Number(14.0)
        );
    }

    #[test]
    fn test_mutable_handle_clear() {
        let mut sheet = Sheet::new();
        sheet.set_cell(pos("A1"), "text").unwrap();

        let a1 = sheet.get_cell_mut(pos("A1")).unwrap().unwrap();
        a1.clear().unwrap();
        assert!(sheet.get_cell(pos("A1")).unwrap().is_none());
        assert!(sheet.get_cell_mut(pos("A1")).unwrap().is_none());
    }
}
