//! Dependency graph walks over the cell arena
//!
//! Every walk uses an explicit stack so that long reference chains cannot
//! overflow the call stack.

use crate::cell::Cell;
use ahash::{AHashMap, AHashSet};
use gridcalc_core::Position;
use std::collections::BTreeSet;
use tracing::trace;

/// The arena: every cell of a sheet, keyed by its position
pub(crate) type CellMap = AHashMap<Position, Cell>;

/// Check whether giving `source` the outgoing edges `targets` would close a
/// cycle.
///
/// Walks from `source` along existing `referenced_by` edges, i.e. over every
/// cell that already depends on `source`. Reaching any member of `targets`
/// (including `source` itself) means the new edge set would loop back.
/// Returns the first such target.
pub(crate) fn find_cycle(
    cells: &CellMap,
    source: Position,
    targets: &BTreeSet<Position>,
) -> Option<Position> {
    if targets.is_empty() {
        return None;
    }

    let mut visited = AHashSet::new();
    let mut stack = vec![source];

    while let Some(pos) = stack.pop() {
        if targets.contains(&pos) {
            return Some(pos);
        }
        if !visited.insert(pos) {
            continue;
        }
        if let Some(cell) = cells.get(&pos) {
            stack.extend(
                cell.referenced_by
                    .iter()
                    .filter(|dependent| !visited.contains(*dependent)),
            );
        }
    }

    None
}

/// Drop cached values of `source` and everything that depends on it.
///
/// The source always propagates since its own content changed. Any other
/// cell whose cache is already empty stops the walk: its dependents were
/// invalidated when that cache was dropped, or have never been read since.
/// Returns the number of caches dropped.
pub(crate) fn invalidate(cells: &mut CellMap, source: Position) -> usize {
    let mut dropped = 0;
    let mut stack = Vec::new();

    if let Some(cell) = cells.get_mut(&source) {
        if cell.invalidate_cache() {
            dropped += 1;
        }
        stack.extend(cell.referenced_by.iter().copied());
    }

    while let Some(pos) = stack.pop() {
        let Some(cell) = cells.get_mut(&pos) else {
            continue;
        };
        if !cell.invalidate_cache() {
            continue;
        }
        dropped += 1;
        stack.extend(cell.referenced_by.iter().copied());
    }

    trace!(cell = %source, dropped, "invalidated dependents");
    dropped
}

/// Formula cells that must be evaluated before `source` can be, ending
/// with `source` itself.
///
/// Walks `references` from `source` and collects, in post-order, every
/// formula cell without a cached result. Evaluating them in the returned
/// order means each formula only ever reads cached or literal values.
pub(crate) fn evaluation_order(cells: &CellMap, source: Position) -> Vec<Position> {
    let mut order = Vec::new();
    let mut visited = AHashSet::new();
    // (position, children already pushed)
    let mut stack = vec![(source, false)];

    while let Some((pos, expanded)) = stack.pop() {
        if expanded {
            order.push(pos);
            continue;
        }
        if !visited.insert(pos) {
            continue;
        }
        let Some(cell) = cells.get(&pos) else {
            continue;
        };
        if !cell.content().is_formula() || cell.has_cache() {
            continue;
        }

        stack.push((pos, true));
        stack.extend(
            cell.references
                .iter()
                .filter(|target| !visited.contains(*target))
                .map(|target| (*target, false)),
        );
    }

    order
}
