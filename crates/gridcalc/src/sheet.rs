//! The sheet: owner of every cell and of the reference graph between them

use crate::cell::{Cell, CellContent};
use crate::graph::{self, CellMap};
use crate::handle::{CellHandle, CellHandleMut};
use gridcalc_core::{CellError, CellValue, Error, Position, Result, Size};
use gridcalc_formula::CellLookup;
use std::cell::Cell as Counter;
use std::collections::BTreeSet;
use std::io::Write;
use tracing::{debug, trace};

/// Output options for printing a sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetOptions {
    /// Written between two columns of a row (default: tab)
    pub column_separator: char,
    /// Written after every row (default: `"\n"`)
    pub row_terminator: String,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            column_separator: '\t',
            row_terminator: "\n".to_string(),
        }
    }
}

/// Cumulative counters since the sheet was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetStats {
    /// Slots currently held by the sheet, including empty cells kept alive
    /// only because something references them
    pub cells: usize,
    /// Formula evaluations performed
    pub evaluations: u64,
    /// Formula reads answered from the cache
    pub cache_hits: u64,
    /// Cached values dropped by edits
    pub invalidations: u64,
}

/// A single sheet of cells.
///
/// Formula results are cached per cell and recomputed lazily on the next
/// read after anything upstream changes. Edits that would introduce a
/// reference cycle are rejected and leave the sheet untouched.
///
/// Caches use interior mutability, so a `Sheet` is `Send` but not `Sync`.
///
/// ```rust
/// use gridcalc::{CellValue, Position, Sheet};
///
/// let mut sheet = Sheet::new();
/// let a1 = Position::parse("A1").unwrap();
/// let a2 = Position::parse("A2").unwrap();
///
/// sheet.set_cell(a1, "4").unwrap();
/// sheet.set_cell(a2, "=A1*2").unwrap();
/// assert_eq!(sheet.get_cell(a2).unwrap().unwrap().value(), CellValue::Number(8.0));
///
/// assert!(sheet.set_cell(a1, "=A2").is_err());
/// ```
#[derive(Debug, Default)]
pub struct Sheet {
    cells: CellMap,
    options: SheetOptions,
    evaluations: Counter<u64>,
    cache_hits: Counter<u64>,
    invalidations: u64,
}

fn check_position(pos: Position) -> Result<()> {
    if pos.is_valid() {
        Ok(())
    } else {
        Err(Error::InvalidPosition(format!(
            "({}, {}) is outside the sheet",
            pos.row, pos.col
        )))
    }
}

impl Sheet {
    /// Create an empty sheet with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sheet with the given output options
    pub fn with_options(options: SheetOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Set the text of the cell at `pos`.
    ///
    /// The text is classified as empty, literal text or a formula (see
    /// [`CellContent::parse`]). On error nothing changes: a formula that
    /// does not parse or that would make the sheet cyclic is rejected before
    /// any edge is touched.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<()> {
        check_position(pos)?;

        let content = CellContent::parse(text)?;
        let references: BTreeSet<Position> =
            content.referenced_cells().iter().copied().collect();

        if let Some(target) = graph::find_cycle(&self.cells, pos, &references) {
            debug!(cell = %pos, via = %target, "rejected circular reference");
            return Err(Error::CircularDependency(pos.to_string()));
        }

        self.commit(pos, content, references);
        debug!(cell = %pos, text, "cell updated");
        Ok(())
    }

    /// Get a read handle to the cell at `pos`.
    ///
    /// Returns `Ok(None)` if nothing ever touched the position, or if it has
    /// been cleared and not written since. A position that only appears as a
    /// formula reference reads back as an empty cell. A cleared position
    /// stays `None` even while formulas keep or gain references to it.
    pub fn get_cell(&self, pos: Position) -> Result<Option<CellHandle<'_>>> {
        check_position(pos)?;
        Ok(self
            .live_cell(pos)
            .map(|cell| CellHandle::new(self, pos, cell)))
    }

    /// Get a mutable handle to the cell at `pos`.
    ///
    /// Returns `Ok(None)` under the same conditions as [`Sheet::get_cell`].
    pub fn get_cell_mut(&mut self, pos: Position) -> Result<Option<CellHandleMut<'_>>> {
        check_position(pos)?;
        if self.live_cell(pos).is_none() {
            return Ok(None);
        }
        Ok(Some(CellHandleMut::new(self, pos)))
    }

    /// Empty the cell at `pos`.
    ///
    /// Afterwards [`Sheet::get_cell`] returns `None` for it until the
    /// position is set again. New references do not revive it. Cells that
    /// reference it keep a valid target which evaluates as empty.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        check_position(pos)?;
        if !self.cells.contains_key(&pos) {
            return Ok(());
        }

        self.commit(pos, CellContent::Empty, BTreeSet::new());
        if let Some(cell) = self.cells.get_mut(&pos) {
            cell.cleared = true;
        }
        self.reclaim(pos);

        debug!(cell = %pos, "cell cleared");
        Ok(())
    }

    /// Smallest box anchored at A1 that holds every cell with non-empty
    /// text. `(0, 0)` for a sheet without any.
    pub fn printable_size(&self) -> Size {
        let mut size = Size::default();
        for (pos, cell) in &self.cells {
            if !cell.cleared && !cell.text().is_empty() {
                size.include(*pos);
            }
        }
        size
    }

    /// Write the values of the printable area
    pub fn print_values<W: Write>(&self, out: &mut W) -> Result<()> {
        self.print_with(out, |pos, cell| self.cell_value(pos, cell).to_string())
    }

    /// Write the texts of the printable area
    pub fn print_texts<W: Write>(&self, out: &mut W) -> Result<()> {
        self.print_with(out, |_, cell| cell.text().to_string())
    }

    /// Counters accumulated since creation
    pub fn stats(&self) -> SheetStats {
        SheetStats {
            cells: self.cells.len(),
            evaluations: self.evaluations.get(),
            cache_hits: self.cache_hits.get(),
            invalidations: self.invalidations,
        }
    }

    /// Live cell at `pos`, if any
    pub(crate) fn live_cell(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(&pos).filter(|cell| !cell.cleared)
    }

    /// Value of `cell`, evaluating through this sheet if it holds a formula
    /// without a cached result.
    ///
    /// Uncached upstream formulas are evaluated first, leaves before their
    /// readers, so evaluation never recurses along a reference chain.
    pub(crate) fn cell_value(&self, pos: Position, cell: &Cell) -> CellValue {
        if !cell.content().is_formula() {
            return cell.value(self);
        }
        if cell.has_cache() {
            self.cache_hits.set(self.cache_hits.get() + 1);
            return cell.value(self);
        }

        for pending in graph::evaluation_order(&self.cells, pos) {
            if let Some(upstream) = self.cells.get(&pending) {
                self.evaluations.set(self.evaluations.get() + 1);
                trace!(cell = %pending, "evaluating formula");
                upstream.value(self);
            }
        }
        cell.value(self)
    }

    /// Install new content and edges. The caller has already validated them.
    fn commit(&mut self, pos: Position, content: CellContent, references: BTreeSet<Position>) {
        // Attach first so a cleared target that stays referenced survives.
        // Its cleared flag is left alone: only writing the cell revives it.
        for target in &references {
            self.cells
                .entry(*target)
                .or_default()
                .referenced_by
                .insert(pos);
        }

        let cell = self.cells.entry(pos).or_default();
        let stale: Vec<Position> = cell.references.difference(&references).copied().collect();
        cell.replace_content(content, references);
        cell.cleared = false;

        for target in stale {
            if let Some(old) = self.cells.get_mut(&target) {
                old.referenced_by.remove(&pos);
            }
            self.reclaim(target);
        }

        let dropped = graph::invalidate(&mut self.cells, pos);
        self.invalidations += dropped as u64;
    }

    /// Remove a cleared slot once no edge touches it
    fn reclaim(&mut self, pos: Position) {
        let unused = self
            .cells
            .get(&pos)
            .is_some_and(|cell| cell.cleared && cell.is_detached());
        if unused {
            self.cells.remove(&pos);
            trace!(cell = %pos, "reclaimed cleared cell");
        }
    }

    fn print_with<W, F>(&self, out: &mut W, render: F) -> Result<()>
    where
        W: Write,
        F: Fn(Position, &Cell) -> String,
    {
        let size = self.printable_size();
        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    write!(out, "{}", self.options.column_separator)?;
                }
                let pos = Position::new(row, col);
                if let Some(cell) = self.live_cell(pos) {
                    if !cell.text().is_empty() {
                        out.write_all(render(pos, cell).as_bytes())?;
                    }
                }
            }
            out.write_all(self.options.row_terminator.as_bytes())?;
        }
        Ok(())
    }
}

impl CellLookup for Sheet {
    fn value_at(&self, pos: Position) -> CellValue {
        if !pos.is_valid() {
            return CellValue::Error(CellError::Ref);
        }
        match self.cells.get(&pos) {
            Some(cell) => self.cell_value(pos, cell),
            None => CellValue::empty(),
        }
    }
}
