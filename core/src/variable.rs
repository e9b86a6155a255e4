//! Variable identities: arrays the domain reads and writes, and the
//! synthetic scalars it mints to name their contents.

use ecow::EcoString;
use serde::{Deserialize, Serialize};

use crate::offset::Offset;

/// The element type of an array variable, as reported by the caller's type
/// system. Determines the [`ElementKind`] and bit width of any scalar minted
/// to represent one of its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrayElementKind {
    BoolArray,
    IntegerArray,
    RealArray,
}

/// The kind of a synthetic scalar variable, mirroring [`ArrayElementKind`]
/// but for the scalar itself rather than the array it was carved out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Boolean,
    Integer,
    Real,
}

impl From<ArrayElementKind> for ElementKind {
    fn from(kind: ArrayElementKind) -> Self {
        match kind {
            ArrayElementKind::BoolArray => ElementKind::Boolean,
            ArrayElementKind::IntegerArray => ElementKind::Integer,
            ArrayElementKind::RealArray => ElementKind::Real,
        }
    }
}

/// Bit width carried by a synthetic scalar's identity: `1` for booleans,
/// `8 * size` for integers of `size` bytes, `0` for reals (the base numeric
/// domain is expected to treat reals as unsized).
pub fn bitwidth_for(kind: ElementKind, size_bytes: u64) -> u32 {
    match kind {
        ElementKind::Boolean => 1,
        ElementKind::Integer => 8 * size_bytes as u32,
        ElementKind::Real => 0,
    }
}

/// An array variable: an opaque identifier for a contiguous byte region
/// (a stack slot, a packet buffer, a map value, …) plus the element kind the
/// caller's type system assigns to it.
///
/// `index` must be stable and distinct for every array variable in a single
/// [`crate::context::AnalysisContext`]: it is the key under which the
/// context stores that array's [`crate::offset_map::OffsetMap`] and the
/// `CellFactory` entries derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayVariable {
    pub index: u32,
    pub element_kind: ArrayElementKind,
}

impl ArrayVariable {
    pub const fn new(index: u32, element_kind: ArrayElementKind) -> Self {
        ArrayVariable { index, element_kind }
    }
}

/// The synthetic scalar variable naming the contents of one [`crate::cell::Cell`].
///
/// Two `ScalarVar`s are equal iff their `index` is equal: `index` is the
/// stable identity minted once by [`crate::cell_factory::CellFactory`] and
/// never reused, while `name`/`kind`/`bitwidth` are descriptive metadata
/// derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScalarVar {
    pub index: u64,
    pub name: EcoString,
    pub kind: ElementKind,
    pub bitwidth: u32,
}

impl ScalarVar {
    /// Render the human-readable scalar name `"{array}[{offset}]"` or
    /// `"{array}[{offset}...{offset+size-1}]"` for a cell of the given
    /// shape. `array_name` is supplied by the caller (the `VariableFactory`)
    /// since this crate does not itself track array display names.
    pub fn mk_name(array_name: &str, offset: Offset, size: u64) -> EcoString {
        if size == 1 {
            EcoString::from(crate::format!("{array_name}[{offset}]"))
        } else {
            let end = offset.value() + size as i64 - 1;
            EcoString::from(crate::format!("{array_name}[{offset}...{end}]"))
        }
    }
}
