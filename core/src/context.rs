//! The explicit, owned context an analysis runs against.
//!
//! The system this crate's design is descended from kept its cell-shape
//! interning table, *and* the per-array cell layout itself, behind
//! process-wide statics shared by every abstract state in the process —
//! which is what let two unrelated verification runs alias scalar
//! identities, and what made `forget(array_var)` unable to actually drop an
//! array's layout (the global table had no notion of "this abstract state
//! is done with it"). `AnalysisContext` re-architects this: it owns only
//! the parts that must stay identical across every abstract state of one
//! run — the scalar-interning table and the tuning knobs — while the
//! per-array cell layout itself moves into the abstract state proper (see
//! [`crate::domain::ArrayExpansionDomain`]), where join/widen/forget can
//! treat it like any other lattice component.

use crate::cell_factory::CellFactory;

/// Tunable limits governing how much work the domain is willing to do
/// before falling back to a coarser, always-sound answer.
///
/// A plain `Copy` value with no interior state: construct one, tune it, and
/// pass it to [`AnalysisContext::new`]. There is no global configuration to
/// reach for instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Upper bound on how many cells `array_store_range`/`array_init` will
    /// materialize individually before giving up and treating the whole
    /// range as an opaque, unconstrained span. Guards against a
    /// caller-supplied range whose size is large but still a compile-time
    /// constant.
    pub max_range_elems: u32,

    /// Upper bound on how many offsets `OffsetMap::get_overlap_cells` scans
    /// past the query range in each direction. `None` leaves the scan
    /// unbounded (sound and exact, but the time it takes is proportional to
    /// how long the map's been accumulating stale cells).
    pub overlap_scan_bound: Option<u32>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            max_range_elems: 512,
            overlap_scan_bound: None,
        }
    }
}

/// Everything that must stay identical across every abstract state produced
/// by one verification run: the cell-shape interning table and the tuning
/// knobs that govern it.
///
/// Owned by the fixpoint driver and threaded by shared reference (or
/// `&mut` when minting a new cell) through every transfer function. Cloning
/// an `AnalysisContext` is possible but not what happens on join/widen —
/// the abstract states (`ArrayExpansionDomain` values) are what gets cloned
/// there; the context is created once per run and borrowed.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    config: AnalysisConfig,
    factory: CellFactory,
}

impl AnalysisContext {
    pub fn new(config: AnalysisConfig) -> Self {
        AnalysisContext {
            config,
            factory: CellFactory::new(),
        }
    }

    pub fn config(&self) -> AnalysisConfig {
        self.config
    }

    pub fn factory(&self) -> &CellFactory {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut CellFactory {
        &mut self.factory
    }

    /// Reset this context to empty: no interned scalars. Replaces
    /// `clear_global_state()` from the static-table design; here it's an
    /// ordinary method on an ordinary value, scoped to whichever context
    /// it's called on. Callers should also drop any `ArrayExpansionDomain`
    /// values that referenced this context's old scalar identities.
    pub fn clear(&mut self) {
        self.factory.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::ArrayElementKind;
    use crate::variable::ArrayVariable;

    fn arr(i: u32) -> ArrayVariable {
        ArrayVariable::new(i, ArrayElementKind::IntegerArray)
    }

    #[test]
    fn clear_drops_interned_scalars() {
        let mut ctx = AnalysisContext::new(AnalysisConfig::default());
        ctx.factory_mut()
            .mk_scalar(arr(0), crate::offset::Offset::new(0), 4);
        assert_eq!(ctx.factory().len(), 1);

        ctx.clear();

        assert_eq!(ctx.factory().len(), 0);
    }
}
