//! Structured reporting for analysis *imprecision* — places where the
//! domain gave a sound but weaker answer than a reader might expect,
//! distinct from the fatal [`crate::errors::ProgrammingError`]s that stop
//! the analysis outright.
//!
//! Every imprecision warning is both logged via `tracing` (so it shows up
//! in ordinary log output with no extra plumbing) and returned as data (so
//! a caller building a verifier report can collect and render them without
//! scraping log lines).

use crate::offset::Offset;
use crate::variable::ArrayVariable;

/// One place where the domain chose a sound over-approximation instead of
/// an exact answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImprecisionWarning {
    /// A non-constant index forced a read or write to be treated as
    /// touching the whole array rather than one cell.
    NonConstantIndex { array: ArrayVariable },

    /// A read at a constant `(offset, size)` straddled more than one
    /// existing cell; the domain cannot recompose their values, so the
    /// destination was forgotten instead.
    OverlappingRead {
        array: ArrayVariable,
        offset: Offset,
        size: u64,
    },

    /// `get_overlap_cells`'s bounded scan hit its step limit before it
    /// could prove it had found every overlapping cell; the result may be
    /// missing cells that do overlap, so the caller conservatively widened
    /// instead of trusting the partial list.
    OverlapScanBoundHit {
        array: ArrayVariable,
        offset: Offset,
        size: u64,
    },

    /// A requested range exceeded `max_range_elems` and was treated as one
    /// opaque unconstrained span instead of being expanded cell by cell.
    RangeTooLargeToExpand {
        array: ArrayVariable,
        offset: Offset,
        size: u64,
    },

    /// `project`, `expand` or `normalize` were called; this domain treats
    /// them as identity operations and cannot actually narrow the tracked
    /// variable set to match, so anything relying on their precision will
    /// be disappointed.
    UnsupportedRefinement { operation: &'static str },
}

impl ImprecisionWarning {
    /// Emit this warning through `tracing` at the level appropriate to its
    /// severity, then return it so the caller can also collect it.
    pub fn emit(self) -> Self {
        match &self {
            ImprecisionWarning::NonConstantIndex { array } => {
                tracing::debug!(array = array.index, "non-constant index, treating as full-array access");
            }
            ImprecisionWarning::OverlappingRead { array, offset, size } => {
                tracing::warn!(
                    array = array.index,
                    offset = offset.value(),
                    size,
                    "read straddles multiple cells, forgetting destination"
                );
            }
            ImprecisionWarning::OverlapScanBoundHit { array, offset, size } => {
                tracing::warn!(
                    array = array.index,
                    offset = offset.value(),
                    size,
                    "overlap scan bound reached, conservatively widening"
                );
            }
            ImprecisionWarning::RangeTooLargeToExpand { array, offset, size } => {
                tracing::warn!(
                    array = array.index,
                    offset = offset.value(),
                    size,
                    "range exceeds max_range_elems, treating as opaque span"
                );
            }
            ImprecisionWarning::UnsupportedRefinement { operation } => {
                tracing::warn!(operation, "operation is a no-op in this domain");
            }
        }
        self
    }
}

/// A sink collecting the imprecision warnings raised over the lifetime of
/// one analysis operation. Most call sites just push into a `Vec`; this
/// exists so the signature of every domain operation that can be imprecise
/// reads the same way: `&mut Diagnostics`.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    warnings: crate::Vec<ImprecisionWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn report(&mut self, warning: ImprecisionWarning) {
        self.warnings.push(warning.emit());
    }

    pub fn warnings(&self) -> &[ImprecisionWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn take(&mut self) -> crate::Vec<ImprecisionWarning> {
        core::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::ArrayElementKind;

    #[test]
    fn report_collects_and_logs() {
        let mut d = Diagnostics::new();
        d.report(ImprecisionWarning::NonConstantIndex {
            array: ArrayVariable::new(0, ArrayElementKind::IntegerArray),
        });
        assert_eq!(d.warnings().len(), 1);
    }

    #[test]
    fn take_drains_the_sink() {
        let mut d = Diagnostics::new();
        d.report(ImprecisionWarning::UnsupportedRefinement { operation: "project" });
        let drained = d.take();
        assert_eq!(drained.len(), 1);
        assert!(d.is_empty());
    }
}
