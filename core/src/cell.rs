//! A [`Cell`] is a byte sub-range of an array, optionally backed by a
//! synthetic scalar variable.

use smallvec::SmallVec;

use crate::numeric::{LinearExpression, NumericDomain};
use crate::offset::{ByteInterval, Offset};
use crate::variable::ScalarVar;

/// A byte range `[offset, offset+size)` of some array, optionally tagged
/// with the synthetic scalar that names its contents.
///
/// Equality and ordering only ever consider `(offset, size)` — the scalar is
/// metadata, not identity, so that a "probe" cell (no scalar) can be
/// compared against a resident cell with the same shape. See
/// [`Cell::probe`] and [`crate::offset_map::OffsetMap::get_overlap_cells`].
#[derive(Debug, Clone)]
pub struct Cell {
    offset: Offset,
    size: u64,
    scalar: Option<ScalarVar>,
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset && self.size == other.size
    }
}
impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Cell {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        (self.offset, self.size).cmp(&(other.offset, other.size))
    }
}

impl Cell {
    /// A resident cell: stored in an `OffsetMap`, always carries a scalar.
    pub fn resident(offset: Offset, size: u64, scalar: ScalarVar) -> Self {
        debug_assert!(size > 0, "a resident cell must span at least one byte");
        Cell {
            offset,
            size,
            scalar: Some(scalar),
        }
    }

    /// A probe cell: used only to query the map for a `(offset, size)` shape
    /// without yet having (or needing) a scalar. Never inserted into a map
    /// for real.
    pub fn probe(offset: Offset, size: u64) -> Self {
        Cell {
            offset,
            size,
            scalar: None,
        }
    }

    /// The null cell: the sentinel returned by lookups that find nothing.
    pub fn null() -> Self {
        Cell {
            offset: Offset::new(0),
            size: 0,
            scalar: None,
        }
    }

    pub fn is_null(&self) -> bool {
        self.offset.value() == 0 && self.size == 0
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn has_scalar(&self) -> bool {
        self.scalar.is_some()
    }

    pub fn scalar(&self) -> Option<&ScalarVar> {
        self.scalar.as_ref()
    }

    fn interval(&self) -> ByteInterval {
        ByteInterval::new(self.offset, self.size.max(1))
    }

    /// True iff `[self.offset, self.offset+self.size)` intersects
    /// `[o, o+n)`, both constant ranges.
    pub fn overlap(&self, o: Offset, n: u64) -> bool {
        self.interval().overlaps(&ByteInterval::new(o, n.max(1)))
    }

    /// True iff `[symb_lb, symb_ub]` may overlap with `self` under the
    /// numeric abstract value `dom`: a sound over-approximation computed by
    /// checking whether either endpoint of `self`'s (constant) interval
    /// could fall inside `[symb_lb, symb_ub]`.
    ///
    /// This mirrors the forward-only check in the literature this domain is
    /// drawn from: it does not attempt to prove `symb_lb/ub` entirely
    /// outside `self`'s range when that would require reasoning about
    /// `self`'s endpoints from the *other* side, so it can return `true`
    /// (forcing a kill) a little more often than strictly necessary. It
    /// never returns `false` when a real overlap exists.
    pub fn symbolic_overlap<D: NumericDomain>(
        &self,
        symb_lb: &D::LinearExpression,
        symb_ub: &D::LinearExpression,
        dom: &D,
    ) -> bool {
        let iv = self.interval();
        let lb_fits = {
            let mut probe = dom.clone();
            probe.add_constraint(&D::LinearExpression::from_constant(iv.lb).ge(symb_lb));
            probe.add_constraint(&D::LinearExpression::from_constant(iv.lb).le(symb_ub));
            !probe.is_bottom()
        };
        if lb_fits {
            return true;
        }
        let mut probe = dom.clone();
        probe.add_constraint(&D::LinearExpression::from_constant(iv.ub_inclusive).ge(symb_lb));
        probe.add_constraint(&D::LinearExpression::from_constant(iv.ub_inclusive).le(symb_ub));
        !probe.is_bottom()
    }
}

/// All cells stored under one offset, differing only by size.
///
/// Most offsets hold exactly one cell (a single store never creates two
/// cells at the same address unless earlier, larger-or-smaller reads
/// created overlapping probes that were never killed), so this is backed by
/// a `SmallVec` that stays inline for the common case.
pub type CellSet = SmallVec<[Cell; 1]>;

pub(crate) fn cell_set_insert_sorted(set: &mut CellSet, c: Cell) -> bool {
    match set.binary_search(&c) {
        Ok(_) => false,
        Err(idx) => {
            set.insert(idx, c);
            true
        }
    }
}

pub(crate) fn cell_set_remove(set: &mut CellSet, c: &Cell) -> bool {
    match set.binary_search(c) {
        Ok(idx) => {
            set.remove(idx);
            true
        }
        Err(_) => false,
    }
}

pub(crate) fn cell_set_union(a: &CellSet, b: &CellSet) -> CellSet {
    let mut out: CellSet = a.clone();
    for c in b {
        cell_set_insert_sorted(&mut out, c.clone());
    }
    out
}

pub(crate) fn cell_set_intersection(a: &CellSet, b: &CellSet) -> CellSet {
    a.iter().filter(|c| b.binary_search(c).is_ok()).cloned().collect()
}

pub(crate) fn cell_set_is_subset(a: &CellSet, b: &CellSet) -> bool {
    a.iter().all(|c| b.binary_search(c).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::IntervalDomain;
    use crate::variable::ElementKind;

    fn scalar(n: &str) -> ScalarVar {
        ScalarVar {
            index: 0,
            name: n.into(),
            kind: ElementKind::Integer,
            bitwidth: 32,
        }
    }

    #[test]
    fn equality_ignores_scalar() {
        let a = Cell::resident(Offset::new(0), 4, scalar("a"));
        let b = Cell::probe(Offset::new(0), 4);
        assert_eq!(a, b);
    }

    #[test]
    fn overlap_is_interval_intersection() {
        let a = Cell::resident(Offset::new(0), 4, scalar("a"));
        assert!(a.overlap(Offset::new(2), 2));
        assert!(!a.overlap(Offset::new(4), 4));
    }

    #[test]
    fn symbolic_overlap_over_approximates_constant_overlap() {
        let a = Cell::resident(Offset::new(4), 4, scalar("a"));
        let dom = IntervalDomain::top();
        let lb = <IntervalDomain as NumericDomain>::LinearExpression::from_constant(4);
        let ub = <IntervalDomain as NumericDomain>::LinearExpression::from_constant(7);
        assert!(a.symbolic_overlap(&lb, &ub, &dom));
    }
}
