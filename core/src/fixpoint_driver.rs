//! The shape of this crate's caller.
//!
//! `array-expansion` does not run a fixpoint computation itself — it has no
//! control-flow graph, no worklist, no notion of a program point. It is a
//! *memory abstraction*: one component a larger relational abstract domain
//! composes in, alongside whatever domain tracks registers and control
//! flow. This module has no types of its own; it documents, for anyone
//! implementing that composition, the contract [`crate::domain::ArrayExpansionDomain`]
//! expects from its surroundings:
//!
//! - One [`crate::context::AnalysisContext`] is created per verification run
//!   and threaded through every abstract state produced during that run's
//!   fixpoint iteration. States from two different runs must never share a
//!   context, or their cell scalar identities will silently alias.
//! - The driver is responsible for actually iterating to a fixpoint: calling
//!   `join`/`widen` at merge points, detecting convergence, and calling
//!   `narrow` afterwards if it wants tighter results. This crate only
//!   implements the lattice operations; it has no opinion on iteration
//!   strategy, widening delay, or which program points are widening points.
//! - Backward analysis (if the driver performs one, e.g. for a dead-store
//!   pass or a precondition computation) uses the `*_backward` family of
//!   operations, which take the post-state and the forward operation's
//!   original arguments and return a refined pre-state.
//! - The driver owns whatever concrete [`crate::numeric::NumericDomain`] it
//!   wants composed with this one; `array-expansion` only ever touches it
//!   through that trait.
