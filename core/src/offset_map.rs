//! A persistent map from byte offset to the [`Cell`]s resident there.
//!
//! One `OffsetMap` tracks the cell layout of a single array variable within
//! a single abstract state. It is deliberately *just* the layout: the
//! values those cells hold live in the numeric domain, keyed by each cell's
//! [`ScalarVar`](crate::variable::ScalarVar).
//!
//! Backed by a `BTreeMap` rather than the patricia trie of the system this
//! crate's design is descended from — a `BTreeMap` gives the same sorted
//! traversal with ordinary `Clone`, which is what lets `OffsetMap` be
//! cloned wholesale every time the enclosing abstract state is (once per
//! join, widen and branch during a fixpoint computation).

use alloc::collections::BTreeMap;

use crate::Vec;
use crate::cell::{self, Cell, CellSet};
use crate::numeric::NumericDomain;
use crate::offset::Offset;

/// How many cells [`OffsetMap::get_overlap_cells`] will scan past the query
/// range, in each direction, before giving up and reporting the range as
/// "too imprecise to track precisely." `None` disables the bound.
///
/// Mirrors `AnalysisConfig::overlap_scan_bound`; passed down explicitly so
/// this module does not need to depend on `context`.
pub type ScanBound = Option<u32>;

#[derive(Debug, Clone, Default)]
pub struct OffsetMap {
    cells: BTreeMap<Offset, CellSet>,
}

/// Result of [`OffsetMap::get_overlap_cells`]: the cells found, and whether
/// `bound` cut the scan short before it reached a full miss in some
/// direction. Callers that see `truncated` should not trust `cells` as a
/// complete overlap set.
#[derive(Debug, Clone, Default)]
pub struct OverlapScan {
    pub cells: Vec<Cell>,
    pub truncated: bool,
}

impl OffsetMap {
    pub fn empty() -> Self {
        OffsetMap {
            cells: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Total number of cells across all offsets (not number of distinct
    /// offsets — an offset can hold more than one cell of different sizes).
    pub fn size(&self) -> usize {
        self.cells.values().map(|set| set.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values().flat_map(|set| set.iter())
    }

    /// Look up the resident cell with exactly shape `(offset, size)`, if
    /// any. Does not consider overlap — for that use
    /// [`OffsetMap::get_overlap_cells`].
    pub fn get(&self, offset: Offset, size: u64) -> Option<&Cell> {
        let set = self.cells.get(&offset)?;
        let probe = Cell::probe(offset, size);
        let idx = set.binary_search(&probe).ok()?;
        Some(&set[idx])
    }

    /// Insert a resident cell, returning `true` if it was new (`false` if a
    /// cell of the same shape already occupied that slot, in which case the
    /// map is left unchanged — callers that want to replace a cell must
    /// `remove` it first).
    pub fn insert(&mut self, cell: Cell) -> bool {
        let set = self.cells.entry(cell.offset()).or_default();
        cell::cell_set_insert_sorted(set, cell)
    }

    /// Remove the resident cell with exactly this shape, returning `true`
    /// if one was present.
    pub fn remove(&mut self, offset: Offset, size: u64) -> bool {
        let Some(set) = self.cells.get_mut(&offset) else {
            return false;
        };
        let removed = cell::cell_set_remove(set, &Cell::probe(offset, size));
        if set.is_empty() {
            self.cells.remove(&offset);
        }
        removed
    }

    /// All cells overlapping the constant byte range `[offset, offset+size)`,
    /// excluding a resident cell whose own shape is exactly
    /// `(offset, size)` — that cell isn't a conflicting neighbor, it's the
    /// one a caller doing a precise load or store at this exact shape would
    /// reuse via [`OffsetMap::get`], so it must not make the read/write look
    /// like it straddles multiple cells.
    ///
    /// Scans outward from `offset` in both directions through the sorted
    /// offsets, stopping in each direction as soon as a full step finds
    /// nothing still overlapping — once cells stop overlapping as we move
    /// away from the query range they never start again, since cells never
    /// nest (a later cell's start is always past an earlier cell's end or
    /// exactly overlapping, never staggered in a way that could skip a
    /// miss and then hit again). `bound` caps how many offsets are visited
    /// in each direction regardless, so a pathological map with thousands
    /// of stale single-byte cells can't make this scan unbounded; when the
    /// bound is hit the caller should treat the result as a possible
    /// under-approximation and respond by widening to "forget everything in
    /// range" rather than trusting the partial cell list — see
    /// [`OverlapScan::truncated`].
    pub fn get_overlap_cells(&self, offset: Offset, size: u64, bound: ScanBound) -> OverlapScan {
        let mut out = Vec::new();
        let mut truncated = false;
        let mut steps = 0u32;
        let is_query_shape = |c: &Cell| c.offset() == offset && c.size() == size;

        for (o, set) in self.cells.range(..=offset).rev() {
            let mut hit = false;
            for c in set {
                if c.overlap(offset, size) {
                    hit = true;
                    if !is_query_shape(c) {
                        tracing::trace!(query = ?offset, at = ?o, "overlap scan descending hit");
                        out.push(c.clone());
                    }
                }
            }
            if !hit {
                break;
            }
            steps += 1;
            if bound.is_some_and(|b| steps >= b) {
                truncated = true;
                break;
            }
        }

        steps = 0;
        for (o, set) in self.cells.range(offset..) {
            if *o == offset {
                continue;
            }
            let mut hit = false;
            for c in set {
                if c.overlap(offset, size) {
                    tracing::trace!(query = ?offset, at = ?o, "overlap scan ascending hit");
                    out.push(c.clone());
                    hit = true;
                }
            }
            if !hit {
                break;
            }
            steps += 1;
            if bound.is_some_and(|b| steps >= b) {
                truncated = true;
                break;
            }
        }

        OverlapScan { cells: out, truncated }
    }

    /// All cells that may overlap a symbolic range `[symb_lb, symb_ub]`
    /// under the numeric abstract value `dom`. Unlike
    /// [`OffsetMap::get_overlap_cells`] there is no early-exit heuristic:
    /// a symbolic range's extent isn't known, so every resident cell must
    /// be checked.
    ///
    /// Tests each cell against its own exact interval rather than, as a
    /// performance shortcut, testing only the largest cell at a shared
    /// offset and assuming its siblings follow — checking every cell costs
    /// one more `symbolic_overlap` call per multi-cell offset (rare; most
    /// offsets hold exactly one cell) in exchange for never killing a
    /// sibling cell the proxy would have over-approximated away.
    pub fn get_overlap_cells_symbolic<D: NumericDomain>(
        &self,
        symb_lb: &D::LinearExpression,
        symb_ub: &D::LinearExpression,
        dom: &D,
    ) -> Vec<Cell> {
        self.iter()
            .filter(|c| c.symbolic_overlap(symb_lb, symb_ub, dom))
            .cloned()
            .collect()
    }

    pub fn get_all_cells(&self) -> Vec<Cell> {
        self.iter().cloned().collect()
    }

    /// `self ⊑ other`: every cell in `self` is also present in `other`.
    pub fn leq(&self, other: &Self) -> bool {
        self.cells.iter().all(|(offset, set)| {
            other
                .cells
                .get(offset)
                .is_some_and(|other_set| cell::cell_set_is_subset(set, other_set))
        })
    }

    /// `self ⊔ other`: pointwise set union at shared offsets, keeping
    /// offsets that appear in only one side — a cell only one operand has
    /// still names a layout reachable along that operand's path, and `leq`
    /// must hold for both operands afterwards, which dropping it would
    /// violate. Cells that share an offset but differ in size are both
    /// kept.
    pub fn join(&self, other: &Self) -> Self {
        let mut cells = self.cells.clone();
        for (offset, other_set) in &other.cells {
            let set = cells.entry(*offset).or_default();
            *set = cell::cell_set_union(set, other_set);
        }
        OffsetMap { cells }
    }

    /// `self ⊓ other`: pointwise set intersection at shared offsets; an
    /// offset present on only one side is dropped (absent counts as empty
    /// on that side, and an intersection with empty is empty).
    pub fn meet(&self, other: &Self) -> Self {
        let mut cells = BTreeMap::new();
        for (offset, set) in &self.cells {
            if let Some(other_set) = other.cells.get(offset) {
                let intersected = cell::cell_set_intersection(set, other_set);
                if !intersected.is_empty() {
                    cells.insert(*offset, intersected);
                }
            }
        }
        OffsetMap { cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::ElementKind;
    use crate::variable::ScalarVar;

    fn scalar(n: &str, idx: u64) -> ScalarVar {
        ScalarVar {
            index: idx,
            name: n.into(),
            kind: ElementKind::Integer,
            bitwidth: 32,
        }
    }

    #[test]
    fn insert_then_get_round_trips() {
        let mut m = OffsetMap::empty();
        m.insert(Cell::resident(Offset::new(0), 4, scalar("a", 0)));
        assert!(m.get(Offset::new(0), 4).is_some());
        assert!(m.get(Offset::new(0), 8).is_none());
    }

    #[test]
    fn overlap_scan_finds_neighbors_and_stops_on_miss() {
        let mut m = OffsetMap::empty();
        m.insert(Cell::resident(Offset::new(0), 4, scalar("a", 0)));
        m.insert(Cell::resident(Offset::new(4), 4, scalar("b", 1)));
        m.insert(Cell::resident(Offset::new(100), 4, scalar("c", 2)));

        let hits = m.get_overlap_cells(Offset::new(2), 4, None);
        assert_eq!(hits.cells.len(), 2);
        assert!(!hits.truncated);
        assert!(hits.cells.iter().all(|c| c.offset() != Offset::new(100)));
    }

    #[test]
    fn overlap_scan_excludes_exact_shape_match() {
        let mut m = OffsetMap::empty();
        m.insert(Cell::resident(Offset::new(4), 4, scalar("a", 0)));

        let hits = m.get_overlap_cells(Offset::new(4), 4, None);
        assert!(hits.cells.is_empty());
        assert!(!hits.truncated);
    }

    #[test]
    fn overlap_scan_still_reports_other_cells_overlapping_an_exact_match() {
        let mut m = OffsetMap::empty();
        m.insert(Cell::resident(Offset::new(2), 4, scalar("a", 0)));
        m.insert(Cell::resident(Offset::new(4), 4, scalar("b", 1)));

        let hits = m.get_overlap_cells(Offset::new(4), 4, None);
        assert_eq!(hits.cells.len(), 1);
        assert_eq!(hits.cells[0].offset(), Offset::new(2));
    }

    #[test]
    fn overlap_scan_reports_truncation_when_bound_hit() {
        let mut m = OffsetMap::empty();
        m.insert(Cell::resident(Offset::new(0), 4, scalar("a", 0)));
        m.insert(Cell::resident(Offset::new(4), 4, scalar("b", 1)));
        m.insert(Cell::resident(Offset::new(8), 4, scalar("c", 2)));

        let hits = m.get_overlap_cells(Offset::new(4), 4, Some(1));
        assert!(hits.truncated);
    }

    #[test]
    fn join_unions_shared_offsets_and_keeps_single_sided_offsets() {
        let mut a = OffsetMap::empty();
        a.insert(Cell::resident(Offset::new(0), 4, scalar("a", 0)));
        a.insert(Cell::resident(Offset::new(8), 4, scalar("x", 9)));

        let mut b = OffsetMap::empty();
        b.insert(Cell::resident(Offset::new(0), 4, scalar("a", 0)));
        b.insert(Cell::resident(Offset::new(8), 1, scalar("y", 10)));

        let joined = a.join(&b);
        // shared offset 0, matching shape: kept.
        assert!(joined.get(Offset::new(0), 4).is_some());
        // shared offset 8, differing shapes: both kept.
        assert!(joined.get(Offset::new(8), 4).is_some());
        assert!(joined.get(Offset::new(8), 1).is_some());

        assert!(a.leq(&joined));
        assert!(b.leq(&joined));
    }

    #[test]
    fn join_keeps_offsets_present_on_only_one_side() {
        let mut a = OffsetMap::empty();
        a.insert(Cell::resident(Offset::new(0), 4, scalar("a", 0)));

        let b = OffsetMap::empty();

        let joined = a.join(&b);
        assert!(joined.get(Offset::new(0), 4).is_some());
        assert!(a.leq(&joined));
    }

    #[test]
    fn meet_drops_offsets_absent_on_either_side() {
        let mut a = OffsetMap::empty();
        a.insert(Cell::resident(Offset::new(0), 4, scalar("a", 0)));
        a.insert(Cell::resident(Offset::new(8), 4, scalar("x", 9)));

        let mut b = OffsetMap::empty();
        b.insert(Cell::resident(Offset::new(0), 4, scalar("a", 0)));

        let met = a.meet(&b);
        assert!(met.get(Offset::new(0), 4).is_some());
        assert!(met.get(Offset::new(8), 4).is_none());
        assert!(met.leq(&a));
        assert!(met.leq(&b));
    }

    #[test]
    fn leq_requires_subset_of_cells() {
        let mut small = OffsetMap::empty();
        small.insert(Cell::resident(Offset::new(0), 4, scalar("a", 0)));

        let mut big = small.clone();
        big.insert(Cell::resident(Offset::new(8), 4, scalar("b", 1)));

        assert!(small.leq(&big));
        assert!(!big.leq(&small));
    }
}
