//! Interning table handing out stable synthetic scalar identities for
//! cells, modeled on the arena-interning table this crate's teacher uses to
//! hand out stable type-variable identities: same idea (a key derived from
//! structural shape maps to one canonically-numbered identity, minted once
//! and reused forever after), simplified because a `ScalarVar` is a small
//! owned value with no arena lifetime to thread through.

use hashbrown::HashMap;

use crate::variable::{ArrayVariable, ElementKind, ScalarVar, bitwidth_for};
use crate::offset::Offset;

/// The key a cell's scalar identity is interned under: which array, at
/// which offset, spanning how many bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellKey {
    array: u32,
    offset: Offset,
    size: u64,
}

/// Mints and interns the synthetic scalar variables that back array cells.
///
/// Two calls to [`CellFactory::mk_scalar`] with the same `(array, offset,
/// size)` always return the *same* `ScalarVar` (same `index`, same `name`):
/// this is what lets two abstract states that independently created "the
/// cell at offset 4, size 4" of the same array agree on which numeric-domain
/// variable holds its value, so joining the two states lines them up
/// correctly instead of treating them as unrelated variables.
///
/// Owned by an [`crate::context::AnalysisContext`]; never shared globally
/// across contexts.
#[derive(Debug, Clone, Default)]
pub struct CellFactory {
    index: HashMap<CellKey, u64>,
    next_index: u64,
    array_names: HashMap<u32, crate::String>,
}

impl CellFactory {
    pub fn new() -> Self {
        CellFactory {
            index: HashMap::new(),
            next_index: 0,
            array_names: HashMap::new(),
        }
    }

    /// Register the display name used when minting scalar names for cells
    /// of `array`. Idempotent; call once per array variable before minting
    /// any of its cells, or rely on the default `"array{index}"` fallback.
    pub fn register_array_name(&mut self, array: ArrayVariable, name: impl Into<crate::String>) {
        self.array_names.insert(array.index, name.into());
    }

    fn array_name(&self, array: ArrayVariable) -> crate::String {
        self.array_names
            .get(&array.index)
            .cloned()
            .unwrap_or_else(|| crate::format!("array{}", array.index))
    }

    /// Intern (or look up) the scalar variable for the cell
    /// `[offset, offset+size)` of `array`.
    pub fn mk_scalar(&mut self, array: ArrayVariable, offset: Offset, size: u64) -> ScalarVar {
        let key = CellKey {
            array: array.index,
            offset,
            size,
        };
        let kind = ElementKind::from(array.element_kind);
        let array_name = self.array_name(array);

        let index = if let Some(&idx) = self.index.get(&key) {
            idx
        } else {
            let idx = self.next_index;
            self.next_index += 1;
            self.index.insert(key, idx);
            idx
        };

        ScalarVar {
            index,
            name: ScalarVar::mk_name(&array_name, offset, size),
            kind,
            bitwidth: bitwidth_for(kind, size),
        }
    }

    /// Number of distinct scalars minted so far.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Drop all interned entries. Only meaningful when paired with
    /// clearing every `OffsetMap` that referenced this factory's scalars —
    /// see [`crate::context::AnalysisContext::clear`].
    pub fn clear(&mut self) {
        self.index.clear();
        self.next_index = 0;
        self.array_names.clear();
    }
}
