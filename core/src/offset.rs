//! Byte offsets within an array variable.
//!
//! An [`Offset`] is a signed 64-bit displacement, but it sorts by its
//! *unsigned* bit pattern: negative offsets (common for stack slots, which
//! grow down from the frame pointer) sort after all non-negative offsets.
//! This keeps [`crate::offset_map::OffsetMap`]'s forward traversal in a
//! single, consistent order regardless of the sign of the offsets it holds.

use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};

/// A byte offset into an array variable.
///
/// Arithmetic (`checked_add`, computing an interval's upper bound, …) is
/// ordinary signed `i64` arithmetic. Only [`Ord`]/[`PartialOrd`] reinterpret
/// the value as its unsigned bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset(i64);

impl Offset {
    pub const fn new(value: i64) -> Self {
        Offset(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    /// The bit pattern used for ordering, as an unsigned integer.
    const fn sort_key(self) -> u64 {
        self.0 as u64
    }

    /// `self + n`, for a byte count `n`. Panics on overflow in debug builds,
    /// matching the rest of this crate's policy of trusting well-formed
    /// callers (a real displacement plus a real size cannot overflow i64).
    pub fn offset_by(self, n: u64) -> Offset {
        Offset(self.0 + n as i64)
    }
}

impl From<i64> for Offset {
    fn from(value: i64) -> Self {
        Offset(value)
    }
}

impl PartialOrd for Offset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Offset {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A closed-open byte interval `[lb, ub)`, used to test overlap between two
/// byte ranges on the integer line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteInterval {
    pub lb: i64,
    pub ub_inclusive: i64,
}

impl ByteInterval {
    pub fn new(offset: Offset, size: u64) -> Self {
        debug_assert!(size > 0, "a byte interval must span at least one byte");
        ByteInterval {
            lb: offset.value(),
            ub_inclusive: offset.value() + size as i64 - 1,
        }
    }

    pub fn overlaps(&self, other: &ByteInterval) -> bool {
        self.lb <= other.ub_inclusive && other.lb <= self.ub_inclusive
    }
}
