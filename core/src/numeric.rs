//! The contract this crate needs from a relational numeric domain.
//!
//! `array-expansion` does not implement interval/polyhedra/octagon
//! arithmetic itself — it delegates all reasoning about the *values* of
//! scalars to a domain supplied by the caller (the fixpoint driver wires one
//! up per verified program). [`NumericDomain`] and [`LinearExpression`] are
//! that seam, named the way this crate needs them rather than after any one
//! concrete representation.
//!
//! A reference implementation used only by this crate's own tests lives in
//! [`crate::testing::IntervalDomain`]; it is intentionally too weak for
//! production use (no relational reasoning at all) and exists solely so the
//! scenarios in this crate's test suite have something concrete to run
//! against.

use crate::variable::ScalarVar;

/// A linear expression over scalar variables, as built and consumed by the
/// numeric domain itself.
///
/// This crate only ever constructs expressions of the shape "scalar",
/// "constant", "scalar plus constant", or the comparisons derived from them;
/// it never needs to inspect an expression's internal structure, so the
/// trait exposes only constructors and comparison helpers.
pub trait LinearExpression: Clone {
    /// A constraint type emitted by [`LinearExpression::ge`]/[`le`].
    type Constraint;

    fn from_constant(value: i64) -> Self;
    fn from_scalar(var: &ScalarVar) -> Self;

    /// `self + k` for a constant `k`. Used to build the upper bound of a
    /// byte range from its lower bound and size (`lb + (size - 1)`).
    fn add_constant(&self, k: i64) -> Self;

    /// `self >= other`.
    fn ge(&self, other: &Self) -> Self::Constraint;
    /// `self <= other`.
    fn le(&self, other: &Self) -> Self::Constraint;
    /// `self == other`.
    fn eq_constraint(&self, other: &Self) -> Self::Constraint;
}

/// The relational numeric abstract domain this crate layers array reasoning
/// on top of.
///
/// Implementations are expected to satisfy the usual abstract-interpretation
/// lattice laws (`join`/`meet` form a lattice bounded by `top`/`bottom`,
/// `widen` ensures termination of increasing chains); this crate trusts
/// those laws rather than re-checking them.
pub trait NumericDomain: Clone {
    type LinearExpression: LinearExpression;

    fn top() -> Self;
    fn bottom() -> Self;
    fn is_bottom(&self) -> bool;
    fn is_top(&self) -> bool;

    fn leq(&self, other: &Self) -> bool;
    fn join(&self, other: &Self) -> Self;
    fn meet(&self, other: &Self) -> Self;
    fn widen(&self, other: &Self) -> Self;
    fn narrow(&self, other: &Self) -> Self;

    /// `widen`, but guided by a set of caller-supplied thresholds (constants
    /// appearing in the program text, typically) that the widened bounds
    /// should jump to before giving up and widening all the way to
    /// infinity. Domains that don't implement threshold-guided widening can
    /// fall back to plain `widen`.
    fn widen_with_thresholds(&self, other: &Self, _thresholds: &[i64]) -> Self {
        self.widen(other)
    }

    /// Assign `rhs` to `lhs`, replacing any prior value.
    fn assign(&mut self, lhs: &ScalarVar, rhs: &Self::LinearExpression);

    /// Copy the value of `rhs` into `lhs`, keeping `rhs` live. Used for cell
    /// aliasing (`array_load`'s destination scalar mirrors the cell's
    /// scalar rather than replacing it).
    fn assign_var(&mut self, lhs: &ScalarVar, rhs: &ScalarVar) {
        self.assign(lhs, &Self::LinearExpression::from_scalar(rhs));
    }

    /// `assign`, for a scalar the caller's type system marks as a boolean.
    ///
    /// A domain that tracks truth values with dedicated machinery (a
    /// separate boolean lattice component, rather than encoding `false`/
    /// `true` as `0`/`1` in the same numeric lattice) overrides this; the
    /// default treats booleans as ordinary numeric scalars, which is sound
    /// but loses any precision a real boolean domain would have kept.
    fn assign_bool(&mut self, lhs: &ScalarVar, rhs: &Self::LinearExpression) {
        self.assign(lhs, rhs);
    }

    /// `assign_var`, for a scalar the caller's type system marks as a
    /// boolean. See [`NumericDomain::assign_bool`].
    fn assign_bool_var(&mut self, lhs: &ScalarVar, rhs: &ScalarVar) {
        self.assign_var(lhs, rhs);
    }

    /// A backward (precondition) assignment: given that `lhs := rhs` was
    /// executed and the post-state satisfies `invariant`, refine `self`
    /// (the state before the call, currently some over-approximation of the
    /// precondition) to rule out executions that couldn't have led there.
    ///
    /// The default re-derives the standard approximation used when a domain
    /// has no sharper backward semantics of its own: apply the assignment
    /// forward, then meet with the known post-state.
    fn backward_assign(
        &mut self,
        lhs: &ScalarVar,
        rhs: &Self::LinearExpression,
        invariant: &Self,
    ) {
        let mut post = self.clone();
        post.assign(lhs, rhs);
        *self = post.meet(invariant);
    }

    /// `backward_assign`, for a scalar the caller's type system marks as a
    /// boolean. See [`NumericDomain::assign_bool`].
    fn backward_assign_bool(&mut self, lhs: &ScalarVar, rhs: &Self::LinearExpression, invariant: &Self) {
        let mut post = self.clone();
        post.assign_bool(lhs, rhs);
        *self = post.meet(invariant);
    }

    /// Add a constraint (an assumption), narrowing `self` in place.
    fn add_constraint(&mut self, c: &<Self::LinearExpression as LinearExpression>::Constraint);

    /// Remove all trace of `var` from the domain: after this call the
    /// domain makes no claim at all about `var`'s value.
    fn forget(&mut self, var: &ScalarVar);

    /// Set `var`'s value to top without forgetting any relation other
    /// variables might still have to it indirectly (used for cells whose
    /// value is being killed but whose synthetic identity isn't dropped).
    fn havoc(&mut self, var: &ScalarVar) {
        self.forget(var);
    }

    /// Evaluate `expr` to a constant, if the domain currently proves it is
    /// exactly one value. Array addressing (`array_load`/`array_store`)
    /// needs this to decide whether an index or element size is precise
    /// enough for a strong update.
    fn to_singleton(&self, expr: &Self::LinearExpression) -> Option<i64>;

    /// Remove redundant internal representation state without changing the
    /// set of concretizations. A no-op for domains with nothing to
    /// compact; exists so the array-expansion domain has something to
    /// delegate `minimize` to.
    fn minimize(&mut self) {}
}
