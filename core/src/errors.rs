//! Fatal, programmer-facing errors.
//!
//! Everything in this module indicates a contract violation by the
//! caller (a malformed cell request, a shape that can't exist) rather than
//! imprecision in the analysis — those are reported through
//! [`crate::diagnostics`] instead, since they don't stop the analysis from
//! continuing. Nothing in this crate panics to report one of these; every
//! fallible operation returns `Result<_, ProgrammingError>`.

use thiserror::Error;

use crate::variable::ElementKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgrammingError {
    #[error("element size must be a singleton positive integer, got a non-constant expression")]
    ElementSizeNotConstant,

    #[error("element size must be a singleton positive integer, got {value}")]
    ElementSizeNotPositive { value: i64 },

    /// `do_assign`'s lhs and rhs named element kinds that disagree (e.g. a
    /// boolean scalar assigned the value of an integer cell). This domain
    /// has no implicit conversion between element kinds; the caller's type
    /// checker should have ruled this out upstream.
    #[error("assignment between mismatched element kinds: lhs is {lhs:?}, rhs is {rhs:?}")]
    ElementKindMismatch { lhs: ElementKind, rhs: ElementKind },

    #[error("region and reference operations are not implemented by this domain")]
    RegionOperationsNotImplemented,
}
