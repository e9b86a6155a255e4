#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]
//! Array-expansion memory abstraction for abstract interpretation.
//!
//! This crate models an array-like memory region (an eBPF stack slot, packet
//! buffer, or map value) as a sorted collection of byte-range *cells*, each
//! backed by a synthetic scalar variable in a caller-supplied relational
//! numeric domain. It translates array `load`/`store`/`init`/`store_range`
//! operations (forward and backward) into assignments, assumptions and
//! forgets on those scalars.
//!
//! What this crate does *not* do: parse ELF objects, disassemble eBPF
//! instructions, build or simplify a control-flow graph, or provide a
//! concrete numeric domain. Those are external collaborators; this crate
//! only specifies (as the [`numeric`] traits) the contract it needs from
//! them, and (as [`fixpoint_driver`]) the shape of its caller.

extern crate alloc;

// Re-export for convenience so other modules don't need alloc:: prefix
#[allow(unused_imports)]
pub(crate) use alloc::{boxed::Box, format, string::String, string::ToString, vec, vec::Vec};

pub mod cell;
pub mod cell_factory;
pub mod context;
pub mod diagnostics;
pub mod domain;
pub mod errors;
pub mod fixpoint_driver;
pub mod numeric;
pub mod offset;
pub mod offset_map;
pub mod variable;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cell::Cell;
pub use context::{AnalysisConfig, AnalysisContext};
pub use diagnostics::{Diagnostics, ImprecisionWarning};
pub use domain::{ArrayExpansionDomain, Variable};
pub use errors::ProgrammingError;
pub use offset::Offset;
pub use offset_map::OffsetMap;
pub use variable::{ArrayVariable, ElementKind, ScalarVar};

/// Test utilities for enabling logging in tests.
#[cfg(test)]
pub(crate) mod test_utils {
    /// Initialize a `tracing` subscriber for tests that want to see the
    /// crate's diagnostic output.
    ///
    /// Call this at the start of a test where you want to see logging
    /// output; safe to call more than once.
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
