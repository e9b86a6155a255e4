//! The array-expansion abstract domain: a per-array cell layout table
//! composed with a base [`NumericDomain`] over the cells' synthetic
//! scalars.
//!
//! This is the product state described informally as
//! `(arrays: Map<ArrayVariable, OffsetMap>, scalars: NumericDomain)`: every
//! lattice operation (`join`, `meet`, `widen`, `narrow`, `leq`) acts
//! pointwise on the two components, and every array operation
//! (`array_load`, `array_store`, …) is implemented here by manipulating
//! both components together — killing a cell means both removing it from
//! its `OffsetMap` and forgetting its scalar in the numeric domain, and the
//! two must never drift out of sync.

use alloc::collections::BTreeSet;
use hashbrown::HashMap;

use crate::cell::Cell;
use crate::context::AnalysisContext;
use crate::diagnostics::{Diagnostics, ImprecisionWarning};
use crate::errors::ProgrammingError;
use crate::numeric::{LinearExpression, NumericDomain};
use crate::offset::Offset;
use crate::offset_map::OffsetMap;
use crate::variable::{ArrayVariable, ElementKind, ScalarVar};

/// Something [`ArrayExpansionDomain::forget`] can be asked to drop: either
/// an entire array's tracked layout, or a single scalar in the numeric
/// domain.
#[derive(Debug, Clone)]
pub enum Variable {
    Array(ArrayVariable),
    Scalar(ScalarVar),
}

/// The array-expansion abstract domain, parametric in the base numeric
/// domain `D` it delegates scalar reasoning to.
#[derive(Debug, Clone)]
pub struct ArrayExpansionDomain<D: NumericDomain> {
    arrays: HashMap<u32, OffsetMap>,
    scalars: D,
}

impl<D: NumericDomain> ArrayExpansionDomain<D> {
    pub fn top() -> Self {
        ArrayExpansionDomain {
            arrays: HashMap::new(),
            scalars: D::top(),
        }
    }

    pub fn bottom() -> Self {
        ArrayExpansionDomain {
            arrays: HashMap::new(),
            scalars: D::bottom(),
        }
    }

    pub fn is_bottom(&self) -> bool {
        self.scalars.is_bottom()
    }

    pub fn is_top(&self) -> bool {
        self.arrays.is_empty() && self.scalars.is_top()
    }

    /// A read-only view of the embedded numeric state, for callers that
    /// want to inspect or project it (`get_content_domain`).
    pub fn get_content_domain(&self) -> &D {
        &self.scalars
    }

    /// Mutable access to the embedded numeric state. Every non-array
    /// operation this domain exposes to callers — arithmetic/bitwise/
    /// boolean assignment, `apply`, `assume`, `select`, and their backward
    /// duals — is `D`'s own method called through this accessor rather than
    /// a same-named wrapper here: there is no array-specific behavior to
    /// layer on top of them, so forwarding through a pass-through method per
    /// `NumericDomain` operation would just be boilerplate that drifts out
    /// of sync with the trait.
    pub fn scalars_mut(&mut self) -> &mut D {
        &mut self.scalars
    }

    pub fn layout(&self, array: ArrayVariable) -> OffsetMap {
        self.arrays.get(&array.index).cloned().unwrap_or_default()
    }

    fn set_layout(&mut self, array: ArrayVariable, layout: OffsetMap) {
        if layout.is_empty() {
            self.arrays.remove(&array.index);
        } else {
            self.arrays.insert(array.index, layout);
        }
    }

    fn all_array_indices<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = u32> + 'a {
        let mut seen = self.arrays.keys().copied().collect::<BTreeSet<_>>();
        seen.extend(other.arrays.keys().copied());
        seen.into_iter()
    }

    pub fn leq(&self, other: &Self) -> bool {
        if self.is_bottom() {
            return true;
        }
        if other.is_bottom() {
            return false;
        }
        self.arrays.iter().all(|(idx, layout)| {
            let other_layout = other.arrays.get(idx).cloned().unwrap_or_default();
            layout.leq(&other_layout)
        }) && self.scalars.leq(&other.scalars)
    }

    pub fn join(&self, other: &Self) -> Self {
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        let mut arrays = HashMap::new();
        for idx in self.all_array_indices(other) {
            let a = self.arrays.get(&idx).cloned().unwrap_or_default();
            let b = other.arrays.get(&idx).cloned().unwrap_or_default();
            let joined = a.join(&b);
            if !joined.is_empty() {
                arrays.insert(idx, joined);
            }
        }
        ArrayExpansionDomain {
            arrays,
            scalars: self.scalars.join(&other.scalars),
        }
    }

    pub fn meet(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom();
        }
        let mut arrays = HashMap::new();
        for idx in self.all_array_indices(other) {
            let a = self.arrays.get(&idx).cloned().unwrap_or_default();
            let b = other.arrays.get(&idx).cloned().unwrap_or_default();
            let met = a.meet(&b);
            if !met.is_empty() {
                arrays.insert(idx, met);
            }
        }
        ArrayExpansionDomain {
            arrays,
            scalars: self.scalars.meet(&other.scalars),
        }
    }

    /// Widening treats the array-layout component the same as join: cell
    /// shapes stabilize after the first handful of iterations (they're
    /// drawn from a finite set of constant offsets appearing in the
    /// program text), so there is no infinite ascending chain there to
    /// force-terminate. Only the numeric component needs real widening.
    pub fn widen(&self, other: &Self) -> Self {
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        let joined = self.join(other);
        ArrayExpansionDomain {
            arrays: joined.arrays,
            scalars: self.scalars.widen(&other.scalars),
        }
    }

    pub fn widen_with_thresholds(&self, other: &Self, thresholds: &[i64]) -> Self {
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        let joined = self.join(other);
        ArrayExpansionDomain {
            arrays: joined.arrays,
            scalars: self.scalars.widen_with_thresholds(&other.scalars, thresholds),
        }
    }

    pub fn narrow(&self, other: &Self) -> Self {
        let met = self.meet(other);
        ArrayExpansionDomain {
            arrays: met.arrays,
            scalars: self.scalars.narrow(&other.scalars),
        }
    }

    /// Drop every variable in `vars`: arrays lose their tracked layout
    /// entirely (the re-architected behavior — see module docs on
    /// [`crate::context`]), scalars are forgotten in the numeric domain.
    pub fn forget(&mut self, vars: &[Variable]) {
        for v in vars {
            match v {
                Variable::Array(a) => {
                    self.arrays.remove(&a.index);
                }
                Variable::Scalar(s) => self.scalars.forget(s),
            }
        }
    }

    pub fn assign(&mut self, lhs: &ScalarVar, rhs: &D::LinearExpression) {
        self.scalars.assign(lhs, rhs);
    }

    pub fn add_constraint(&mut self, c: &<D::LinearExpression as LinearExpression>::Constraint) {
        self.scalars.add_constraint(c);
    }

    pub fn minimize(&mut self) {
        self.scalars.minimize();
    }

    /// `project`, `expand` and `normalize` have no useful meaning in this
    /// domain (there is no notion of narrowing the variable set beyond what
    /// `forget` already does); treat them as identity and report the
    /// imprecision.
    pub fn project_expand_or_normalize(&self, operation: &'static str, diag: &mut Diagnostics) -> Self {
        diag.report(ImprecisionWarning::UnsupportedRefinement { operation });
        self.clone()
    }

    fn kill_cells(&mut self, array: ArrayVariable, cells: &[Cell]) {
        if cells.is_empty() {
            return;
        }
        tracing::debug!(array = array.index, count = cells.len(), "killing overlapping cells");
        let mut layout = self.layout(array);
        for c in cells {
            if let Some(scalar) = c.scalar() {
                self.scalars.forget(scalar);
            }
            layout.remove(c.offset(), c.size());
        }
        self.set_layout(array, layout);
    }

    /// `lhs := rhs`, dispatching on `lhs`'s kind: booleans go through the
    /// domain's boolean-assign entry point, integers and reals through the
    /// plain numeric one.
    fn assign_scalar_var(&mut self, lhs: &ScalarVar, rhs: &ScalarVar) {
        tracing::debug!(lhs = %lhs.name, rhs = %rhs.name, "assignment performed");
        match lhs.kind {
            ElementKind::Boolean => self.scalars.assign_bool_var(lhs, rhs),
            ElementKind::Integer | ElementKind::Real => self.scalars.assign_var(lhs, rhs),
        }
    }

    /// `lhs := rhs`, dispatching on `lhs`'s kind the same way as
    /// [`Self::assign_scalar_var`].
    fn assign_scalar(&mut self, lhs: &ScalarVar, rhs: &D::LinearExpression) {
        tracing::debug!(lhs = %lhs.name, "assignment performed");
        match lhs.kind {
            ElementKind::Boolean => self.scalars.assign_bool(lhs, rhs),
            ElementKind::Integer | ElementKind::Real => self.scalars.assign(lhs, rhs),
        }
    }

    fn require_singleton_size(&self, elem_size: &D::LinearExpression) -> Result<u64, ProgrammingError> {
        let n = self
            .scalars
            .to_singleton(elem_size)
            .ok_or(ProgrammingError::ElementSizeNotConstant)?;
        if n <= 0 {
            return Err(ProgrammingError::ElementSizeNotPositive { value: n });
        }
        Ok(n as u64)
    }

    // -- Array operations -------------------------------------------------

    /// Reset `array`: kill every cell it currently holds, then store `v`
    /// across `[lb, ub]`.
    pub fn array_init(
        &mut self,
        ctx: &mut AnalysisContext,
        diag: &mut Diagnostics,
        array: ArrayVariable,
        elem_size: &D::LinearExpression,
        lb: &D::LinearExpression,
        ub: &D::LinearExpression,
        v: &D::LinearExpression,
    ) -> Result<(), ProgrammingError> {
        let all = self.layout(array).get_all_cells();
        self.kill_cells(array, &all);
        self.array_store_range(ctx, diag, array, elem_size, lb, ub, v)
    }

    /// Load the cell at `i` (of `elem_size` bytes) from `array` into `lhs`.
    pub fn array_load(
        &mut self,
        ctx: &mut AnalysisContext,
        diag: &mut Diagnostics,
        lhs: &ScalarVar,
        array: ArrayVariable,
        elem_size: &D::LinearExpression,
        i: &D::LinearExpression,
    ) -> Result<(), ProgrammingError> {
        let n = self.require_singleton_size(elem_size)?;
        let expected_kind = ElementKind::from(array.element_kind);
        if lhs.kind != expected_kind {
            return Err(ProgrammingError::ElementKindMismatch {
                lhs: lhs.kind,
                rhs: expected_kind,
            });
        }

        let Some(k) = self.scalars.to_singleton(i) else {
            diag.report(ImprecisionWarning::NonConstantIndex { array });
            self.scalars.forget(lhs);
            return Ok(());
        };
        let o = Offset::new(k);
        let layout = self.layout(array);
        let scan = layout.get_overlap_cells(o, n, ctx.config().overlap_scan_bound);
        if scan.truncated {
            diag.report(ImprecisionWarning::OverlapScanBoundHit { array, offset: o, size: n });
        }

        if !scan.cells.is_empty() {
            diag.report(ImprecisionWarning::OverlappingRead { array, offset: o, size: n });
            self.scalars.forget(lhs);
            return Ok(());
        }

        let scalar = ctx.factory_mut().mk_scalar(array, o, n);
        tracing::debug!(array = array.index, offset = ?o, size = n, scalar = %scalar.name, "cell minted for load");
        let mut layout = layout;
        if layout.get(o, n).is_none() {
            layout.insert(Cell::resident(o, n, scalar.clone()));
            self.set_layout(array, layout);
        }
        self.assign_scalar_var(lhs, &scalar);
        Ok(())
    }

    /// Store `v` at `i` (of `elem_size` bytes) in `array`.
    pub fn array_store(
        &mut self,
        ctx: &mut AnalysisContext,
        diag: &mut Diagnostics,
        array: ArrayVariable,
        elem_size: &D::LinearExpression,
        i: &D::LinearExpression,
        v: &D::LinearExpression,
        _strong: bool,
    ) -> Result<(), ProgrammingError> {
        let n = self.require_singleton_size(elem_size)?;

        if let Some(k) = self.scalars.to_singleton(i) {
            let o = Offset::new(k);
            let layout = self.layout(array);
            let scan = layout.get_overlap_cells(o, n, ctx.config().overlap_scan_bound);
            if scan.truncated {
                diag.report(ImprecisionWarning::OverlapScanBoundHit { array, offset: o, size: n });
            }
            self.kill_cells(array, &scan.cells);

            let scalar = ctx.factory_mut().mk_scalar(array, o, n);
            tracing::debug!(array = array.index, offset = ?o, size = n, scalar = %scalar.name, "cell minted for store");
            let mut layout = self.layout(array);
            layout.insert(Cell::resident(o, n, scalar.clone()));
            self.set_layout(array, layout);
            self.assign_scalar(&scalar, v);
        } else {
            diag.report(ImprecisionWarning::NonConstantIndex { array });
            let symb_lb = i.clone();
            let symb_ub = i.add_constant(n as i64 - 1);
            let layout = self.layout(array);
            let overlap = layout.get_overlap_cells_symbolic(&symb_lb, &symb_ub, &self.scalars);
            self.kill_cells(array, &overlap);
        }
        Ok(())
    }

    /// Store `v` across every `elem_size`-sized slot in `[lb, ub]`.
    pub fn array_store_range(
        &mut self,
        ctx: &mut AnalysisContext,
        diag: &mut Diagnostics,
        array: ArrayVariable,
        elem_size: &D::LinearExpression,
        lb: &D::LinearExpression,
        ub: &D::LinearExpression,
        v: &D::LinearExpression,
    ) -> Result<(), ProgrammingError> {
        let n = self.require_singleton_size(elem_size)?;
        let lb_k = self.scalars.to_singleton(lb).ok_or(ProgrammingError::ElementSizeNotConstant)?;
        let ub_k = self.scalars.to_singleton(ub).ok_or(ProgrammingError::ElementSizeNotConstant)?;

        if ub_k < lb_k {
            return Ok(());
        }
        let span = (ub_k - lb_k + 1) as u64;
        let count = span.div_ceil(n);

        if count > ctx.config().max_range_elems as u64 {
            diag.report(ImprecisionWarning::RangeTooLargeToExpand {
                array,
                offset: Offset::new(lb_k),
                size: span,
            });
            let layout = self.layout(array);
            let scan = layout.get_overlap_cells(Offset::new(lb_k), span, ctx.config().overlap_scan_bound);
            self.kill_cells(array, &scan.cells);
            return Ok(());
        }

        let mut k = lb_k;
        while k <= ub_k {
            let idx = D::LinearExpression::from_constant(k);
            self.array_store(ctx, diag, array, elem_size, &idx, v, false)?;
            k += n as i64;
        }
        Ok(())
    }

    /// `array_assign` is not implemented by this domain; it warns and
    /// leaves both sides unconstrained.
    pub fn array_assign(
        &mut self,
        diag: &mut Diagnostics,
        _lhs: ArrayVariable,
        _rhs: ArrayVariable,
    ) {
        diag.report(ImprecisionWarning::UnsupportedRefinement { operation: "array_assign" });
    }

    // -- Backward (precondition) duals ------------------------------------

    pub fn backward_array_init(
        &mut self,
        ctx: &mut AnalysisContext,
        diag: &mut Diagnostics,
        array: ArrayVariable,
        elem_size: &D::LinearExpression,
        lb: &D::LinearExpression,
        ub: &D::LinearExpression,
        v: &D::LinearExpression,
        invariant: &Self,
    ) -> Result<(), ProgrammingError> {
        let _ = (elem_size, lb, ub, v, ctx, diag);
        let all = self.layout(array).get_all_cells();
        self.kill_cells(array, &all);
        *self = self.meet(invariant);
        Ok(())
    }

    pub fn backward_array_load(
        &mut self,
        ctx: &mut AnalysisContext,
        diag: &mut Diagnostics,
        lhs: &ScalarVar,
        array: ArrayVariable,
        elem_size: &D::LinearExpression,
        i: &D::LinearExpression,
        invariant: &Self,
    ) -> Result<(), ProgrammingError> {
        let n = self.require_singleton_size(elem_size)?;
        let expected_kind = ElementKind::from(array.element_kind);
        if lhs.kind != expected_kind {
            return Err(ProgrammingError::ElementKindMismatch {
                lhs: lhs.kind,
                rhs: expected_kind,
            });
        }

        if let Some(k) = invariant.scalars.to_singleton(i) {
            let o = Offset::new(k);
            let scalar = ctx.factory_mut().mk_scalar(array, o, n);
            let rhs = D::LinearExpression::from_scalar(&scalar);
            match lhs.kind {
                ElementKind::Boolean => self.scalars.backward_assign_bool(lhs, &rhs, &invariant.scalars),
                ElementKind::Integer | ElementKind::Real => {
                    self.scalars.backward_assign(lhs, &rhs, &invariant.scalars)
                }
            }
        } else {
            diag.report(ImprecisionWarning::NonConstantIndex { array });
            self.scalars.forget(lhs);
        }
        *self = self.meet(invariant);
        Ok(())
    }

    pub fn backward_array_store(
        &mut self,
        ctx: &mut AnalysisContext,
        diag: &mut Diagnostics,
        array: ArrayVariable,
        elem_size: &D::LinearExpression,
        i: &D::LinearExpression,
        v: &D::LinearExpression,
        _strong: bool,
        invariant: &Self,
    ) -> Result<(), ProgrammingError> {
        let n = self.require_singleton_size(elem_size)?;

        if let Some(k) = self.scalars.to_singleton(i) {
            let o = Offset::new(k);
            let layout = self.layout(array);
            let scan = layout.get_overlap_cells(o, n, ctx.config().overlap_scan_bound);
            if scan.truncated {
                diag.report(ImprecisionWarning::OverlapScanBoundHit { array, offset: o, size: n });
            }
            if scan.cells.is_empty() {
                let scalar = ctx.factory_mut().mk_scalar(array, o, n);
                match scalar.kind {
                    ElementKind::Boolean => {
                        self.scalars.backward_assign_bool(&scalar, v, &invariant.scalars)
                    }
                    ElementKind::Integer | ElementKind::Real => {
                        self.scalars.backward_assign(&scalar, v, &invariant.scalars)
                    }
                }
            } else {
                self.kill_cells(array, &scan.cells);
            }
        } else {
            diag.report(ImprecisionWarning::NonConstantIndex { array });
            let symb_lb = i.clone();
            let symb_ub = i.add_constant(n as i64 - 1);
            let layout = self.layout(array);
            let overlap = layout.get_overlap_cells_symbolic(&symb_lb, &symb_ub, &self.scalars);
            self.kill_cells(array, &overlap);
        }
        *self = self.meet(invariant);
        Ok(())
    }

    pub fn backward_array_store_range(
        &mut self,
        ctx: &mut AnalysisContext,
        diag: &mut Diagnostics,
        array: ArrayVariable,
        elem_size: &D::LinearExpression,
        lb: &D::LinearExpression,
        ub: &D::LinearExpression,
        v: &D::LinearExpression,
        invariant: &Self,
    ) -> Result<(), ProgrammingError> {
        let n = self.require_singleton_size(elem_size)?;
        let lb_k = self.scalars.to_singleton(lb).ok_or(ProgrammingError::ElementSizeNotConstant)?;
        let ub_k = self.scalars.to_singleton(ub).ok_or(ProgrammingError::ElementSizeNotConstant)?;

        let mut k = lb_k;
        while k <= ub_k {
            let idx = D::LinearExpression::from_constant(k);
            self.backward_array_store(ctx, diag, array, elem_size, &idx, v, false, invariant)?;
            k += n as i64;
        }
        Ok(())
    }

    // -- Region / reference operations -------------------------------------

    /// This domain models byte-addressable arrays only; it has no notion of
    /// a region or a reference into one. Any attempt to use one is a
    /// programming error by the caller (a fixpoint driver that tried to use
    /// this domain for a kind of memory it doesn't model), not an
    /// imprecision this domain can absorb.
    pub fn region_or_reference_operation(&self) -> Result<(), ProgrammingError> {
        Err(ProgrammingError::RegionOperationsNotImplemented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AnalysisConfig;
    use crate::testing::IntervalDomain;
    use crate::testing::IntervalExpr;
    use crate::variable::ArrayElementKind;

    type Dom = ArrayExpansionDomain<IntervalDomain>;

    fn arr(i: u32) -> ArrayVariable {
        ArrayVariable::new(i, ArrayElementKind::IntegerArray)
    }

    fn bool_arr(i: u32) -> ArrayVariable {
        ArrayVariable::new(i, ArrayElementKind::BoolArray)
    }

    fn lhs(name: &str, idx: u64) -> ScalarVar {
        ScalarVar {
            index: idx,
            name: name.into(),
            kind: crate::variable::ElementKind::Integer,
            bitwidth: 32,
        }
    }

    fn c(v: i64) -> IntervalExpr {
        IntervalExpr::from_constant(v)
    }

    #[test]
    fn s1_disjoint_writes() {
        let mut ctx = AnalysisContext::new(AnalysisConfig::default());
        let mut diag = Diagnostics::new();
        let mut d = Dom::top();
        let a = arr(0);

        d.array_store(&mut ctx, &mut diag, a, &c(4), &c(0), &c(11), false).unwrap();
        d.array_store(&mut ctx, &mut diag, a, &c(4), &c(4), &c(22), false).unwrap();
        d.array_store(&mut ctx, &mut diag, a, &c(4), &c(8), &c(33), false).unwrap();

        let x = lhs("x", 1000);
        d.array_load(&mut ctx, &mut diag, &x, a, &c(4), &c(4)).unwrap();
        assert_eq!(d.get_content_domain().to_singleton(&IntervalExpr::from_scalar(&x)), Some(22));
        assert_eq!(d.layout(a).size(), 3);
    }

    #[test]
    fn s2_overlapping_write_kills() {
        let mut ctx = AnalysisContext::new(AnalysisConfig::default());
        let mut diag = Diagnostics::new();
        let mut d = Dom::top();
        let a = arr(0);

        d.array_store(&mut ctx, &mut diag, a, &c(4), &c(0), &c(11), false).unwrap();
        d.array_store(&mut ctx, &mut diag, a, &c(2), &c(2), &c(77), false).unwrap();

        assert_eq!(d.layout(a).size(), 1);
        assert!(d.layout(a).get(Offset::new(2), 2).is_some());
        assert!(d.layout(a).get(Offset::new(0), 4).is_none());
    }

    #[test]
    fn s3_overlapping_read_returns_top() {
        let mut ctx = AnalysisContext::new(AnalysisConfig::default());
        let mut diag = Diagnostics::new();
        let mut d = Dom::top();
        let a = arr(0);

        d.array_store(&mut ctx, &mut diag, a, &c(4), &c(0), &c(11), false).unwrap();
        let x = lhs("x", 2000);
        d.array_load(&mut ctx, &mut diag, &x, a, &c(2), &c(2)).unwrap();

        assert_eq!(d.get_content_domain().to_singleton(&IntervalExpr::from_scalar(&x)), None);
        assert!(diag.warnings().iter().any(|w| matches!(w, ImprecisionWarning::OverlappingRead { .. })));
    }

    #[test]
    fn s5_range_init() {
        let mut ctx = AnalysisContext::new(AnalysisConfig::default());
        let mut diag = Diagnostics::new();
        let mut d = Dom::top();
        let a = arr(0);

        d.array_init(&mut ctx, &mut diag, a, &c(1), &c(0), &c(7), &c(0)).unwrap();
        assert_eq!(d.layout(a).size(), 8);

        let x = lhs("x", 3000);
        d.array_load(&mut ctx, &mut diag, &x, a, &c(1), &c(3)).unwrap();
        assert_eq!(d.get_content_domain().to_singleton(&IntervalExpr::from_scalar(&x)), Some(0));
    }

    #[test]
    fn array_load_rejects_element_kind_mismatch() {
        let mut ctx = AnalysisContext::new(AnalysisConfig::default());
        let mut diag = Diagnostics::new();
        let mut d = Dom::top();
        let a = bool_arr(0);
        d.array_store(&mut ctx, &mut diag, a, &c(1), &c(0), &c(1), false).unwrap();

        let x = lhs("x", 5000);
        let err = d.array_load(&mut ctx, &mut diag, &x, a, &c(1), &c(0)).unwrap_err();
        assert!(matches!(err, ProgrammingError::ElementKindMismatch { .. }));
    }

    #[test]
    fn s6_join_preserves_matching_cells_drops_conflicts() {
        let mut ctx = AnalysisContext::new(AnalysisConfig::default());
        let mut diag = Diagnostics::new();
        let a = arr(0);

        let mut state_a = Dom::top();
        state_a.array_store(&mut ctx, &mut diag, a, &c(4), &c(0), &c(1), false).unwrap();

        let mut state_b = Dom::top();
        state_b.array_store(&mut ctx, &mut diag, a, &c(4), &c(0), &c(2), false).unwrap();

        let joined = state_a.join(&state_b);
        let cell = joined.layout(a).get(Offset::new(0), 4).cloned();
        assert!(cell.is_some());
        let scalar = cell.unwrap().scalar().unwrap().clone();
        assert_eq!(
            joined
                .get_content_domain()
                .to_singleton(&IntervalExpr::from_scalar(&scalar)),
            None,
            "joined value should be the range [1,2], not a singleton"
        );
    }

    #[test]
    fn forget_array_drops_its_layout_entirely() {
        let mut ctx = AnalysisContext::new(AnalysisConfig::default());
        let mut diag = Diagnostics::new();
        let mut d = Dom::top();
        let a = arr(0);
        d.array_store(&mut ctx, &mut diag, a, &c(4), &c(0), &c(1), false).unwrap();
        assert!(!d.layout(a).is_empty());

        d.forget(&[Variable::Array(a)]);
        assert!(d.layout(a).is_empty());
    }

    #[test]
    fn s7_boolean_array_load_store_dispatches_through_bool_assign() {
        let mut ctx = AnalysisContext::new(AnalysisConfig::default());
        let mut diag = Diagnostics::new();
        let mut d = Dom::top();
        let a = bool_arr(0);

        d.array_store(&mut ctx, &mut diag, a, &c(1), &c(0), &c(1), false).unwrap();

        let x = lhs("flag", 4000);
        assert_eq!(x.kind, crate::variable::ElementKind::Integer);
        let x = ScalarVar { kind: crate::variable::ElementKind::Boolean, ..x };
        d.array_load(&mut ctx, &mut diag, &x, a, &c(1), &c(0)).unwrap();

        assert_eq!(
            d.get_content_domain().to_singleton(&IntervalExpr::from_scalar(&x)),
            Some(1)
        );
    }

    #[test]
    fn lattice_monotonicity() {
        let mut ctx = AnalysisContext::new(AnalysisConfig::default());
        let mut diag = Diagnostics::new();
        let a = arr(0);

        let mut x = Dom::top();
        x.array_store(&mut ctx, &mut diag, a, &c(4), &c(0), &c(1), false).unwrap();
        let mut y = Dom::top();
        y.array_store(&mut ctx, &mut diag, a, &c(4), &c(0), &c(2), false).unwrap();

        let j = x.join(&y);
        let m = x.meet(&y);
        assert!(x.leq(&j));
        assert!(y.leq(&j));
        assert!(m.leq(&x));
        assert!(m.leq(&y));
    }

    /// Regression for a swapped join/meet: when one operand tracks no cells
    /// for an array at all (as `top` never does), join must still keep the
    /// other operand's cells rather than intersecting them away.
    #[test]
    fn lattice_monotonicity_with_one_sided_layout() {
        let mut ctx = AnalysisContext::new(AnalysisConfig::default());
        let mut diag = Diagnostics::new();
        let a = arr(0);

        let mut x = Dom::top();
        x.array_store(&mut ctx, &mut diag, a, &c(4), &c(0), &c(1), false).unwrap();
        let y = Dom::top();

        let j = x.join(&y);
        assert!(x.leq(&j), "x ⊑ x ⊔ y must hold even when y has no cells for a");
        assert!(y.leq(&j), "y ⊑ x ⊔ y must hold even when y has no cells for a");
        assert!(j.layout(a).get(Offset::new(0), 4).is_some());
    }
}
