//! A minimal reference [`NumericDomain`] used only by this crate's own
//! tests.
//!
//! `IntervalDomain` tracks one `[lo, hi]` interval per scalar, with no
//! relational reasoning between scalars at all — it exists so the scenarios
//! in this crate's test suite have something real to run the array
//! operations against, not as a production numeric domain. A caller's
//! actual domain is expected to be far more precise (and is supplied
//! externally; see [`crate::numeric`]).

use core::cmp::{max, min};

use hashbrown::HashMap;

use crate::numeric::{LinearExpression, NumericDomain};
use crate::variable::ScalarVar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub lo: i64,
    pub hi: i64,
}

impl Interval {
    pub const fn new(lo: i64, hi: i64) -> Self {
        Interval { lo, hi }
    }

    fn top() -> Self {
        Interval::new(i64::MIN, i64::MAX)
    }

    fn is_bottom(&self) -> bool {
        self.lo > self.hi
    }

    fn join(&self, other: &Self) -> Self {
        Interval::new(min(self.lo, other.lo), max(self.hi, other.hi))
    }

    fn meet(&self, other: &Self) -> Self {
        Interval::new(max(self.lo, other.lo), min(self.hi, other.hi))
    }

    fn leq(&self, other: &Self) -> bool {
        self.is_bottom() || (other.lo <= self.lo && self.hi <= other.hi)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalExpr {
    Constant(i64),
    /// A scalar plus a constant offset (`offset` is 0 for a bare scalar
    /// reference).
    Var { index: u64, offset: i64 },
}

impl LinearExpression for IntervalExpr {
    type Constraint = IntervalConstraint;

    fn from_constant(value: i64) -> Self {
        IntervalExpr::Constant(value)
    }

    fn from_scalar(var: &ScalarVar) -> Self {
        IntervalExpr::Var {
            index: var.index,
            offset: 0,
        }
    }

    fn add_constant(&self, k: i64) -> Self {
        match *self {
            IntervalExpr::Constant(c) => IntervalExpr::Constant(c + k),
            IntervalExpr::Var { index, offset } => IntervalExpr::Var {
                index,
                offset: offset + k,
            },
        }
    }

    fn ge(&self, other: &Self) -> Self::Constraint {
        IntervalConstraint {
            lhs: *self,
            rhs: *other,
            op: CmpOp::Ge,
        }
    }

    fn le(&self, other: &Self) -> Self::Constraint {
        IntervalConstraint {
            lhs: *self,
            rhs: *other,
            op: CmpOp::Le,
        }
    }

    fn eq_constraint(&self, other: &Self) -> Self::Constraint {
        IntervalConstraint {
            lhs: *self,
            rhs: *other,
            op: CmpOp::Eq,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Ge,
    Le,
    Eq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalConstraint {
    lhs: IntervalExpr,
    rhs: IntervalExpr,
    op: CmpOp,
}

/// Non-relational interval domain: one `Interval` per scalar index, `top`
/// meaning "not yet constrained" (absence from the map, not an explicit
/// full-range entry, which keeps joins of never-touched variables cheap).
#[derive(Debug, Clone, Default)]
pub struct IntervalDomain {
    bottom: bool,
    values: HashMap<u64, Interval>,
}

impl IntervalDomain {
    fn get(&self, idx: u64) -> Interval {
        self.values.get(&idx).copied().unwrap_or_else(Interval::top)
    }

    fn eval(&self, expr: &IntervalExpr) -> Interval {
        match *expr {
            IntervalExpr::Constant(c) => Interval::new(c, c),
            IntervalExpr::Var { index, offset } => {
                let iv = self.get(index);
                if iv.is_bottom() {
                    iv
                } else {
                    Interval::new(
                        iv.lo.saturating_add(offset),
                        iv.hi.saturating_add(offset),
                    )
                }
            }
        }
    }
}

impl NumericDomain for IntervalDomain {
    type LinearExpression = IntervalExpr;

    fn top() -> Self {
        IntervalDomain {
            bottom: false,
            values: HashMap::new(),
        }
    }

    fn bottom() -> Self {
        IntervalDomain {
            bottom: true,
            values: HashMap::new(),
        }
    }

    fn is_bottom(&self) -> bool {
        self.bottom || self.values.values().any(Interval::is_bottom)
    }

    fn is_top(&self) -> bool {
        !self.bottom && self.values.is_empty()
    }

    fn leq(&self, other: &Self) -> bool {
        if self.is_bottom() {
            return true;
        }
        if other.is_bottom() {
            return false;
        }
        other
            .values
            .iter()
            .all(|(idx, other_iv)| self.get(*idx).leq(other_iv))
    }

    fn join(&self, other: &Self) -> Self {
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        let mut values = HashMap::new();
        for (idx, iv) in &self.values {
            if let Some(other_iv) = other.values.get(idx) {
                values.insert(*idx, iv.join(other_iv));
            }
        }
        IntervalDomain {
            bottom: false,
            values,
        }
    }

    fn meet(&self, other: &Self) -> Self {
        if self.is_bottom() || other.is_bottom() {
            return Self::bottom();
        }
        let mut values = self.values.clone();
        for (idx, other_iv) in &other.values {
            let merged = values.get(idx).copied().unwrap_or_else(Interval::top).meet(other_iv);
            values.insert(*idx, merged);
        }
        IntervalDomain {
            bottom: false,
            values,
        }
    }

    fn widen(&self, other: &Self) -> Self {
        if self.is_bottom() {
            return other.clone();
        }
        if other.is_bottom() {
            return self.clone();
        }
        let mut values = HashMap::new();
        for (idx, other_iv) in &other.values {
            let prev = self.values.get(idx).copied().unwrap_or_else(Interval::top);
            let lo = if other_iv.lo < prev.lo { i64::MIN } else { prev.lo };
            let hi = if other_iv.hi > prev.hi { i64::MAX } else { prev.hi };
            values.insert(*idx, Interval::new(lo, hi));
        }
        IntervalDomain {
            bottom: false,
            values,
        }
    }

    fn narrow(&self, other: &Self) -> Self {
        self.meet(other)
    }

    fn assign(&mut self, lhs: &ScalarVar, rhs: &Self::LinearExpression) {
        if self.is_bottom() {
            return;
        }
        let v = self.eval(rhs);
        self.values.insert(lhs.index, v);
    }

    fn add_constraint(&mut self, c: &IntervalConstraint) {
        if self.is_bottom() {
            return;
        }
        let lhs_iv = self.eval(&c.lhs);
        let rhs_iv = self.eval(&c.rhs);
        let refined = match c.op {
            CmpOp::Ge => Interval::new(max(lhs_iv.lo, rhs_iv.lo), lhs_iv.hi),
            CmpOp::Le => Interval::new(lhs_iv.lo, min(lhs_iv.hi, rhs_iv.hi)),
            CmpOp::Eq => lhs_iv.meet(&rhs_iv),
        };
        if let IntervalExpr::Var { index, offset } = c.lhs {
            // refined is the bound on (var + offset); subtract offset back
            // out to get the bound on var itself.
            let unshifted = Interval::new(
                refined.lo.saturating_sub(offset),
                refined.hi.saturating_sub(offset),
            );
            self.values.insert(index, unshifted);
        }
        if refined.is_bottom() {
            self.bottom = true;
        }
    }

    fn forget(&mut self, var: &ScalarVar) {
        self.values.remove(&var.index);
    }

    fn to_singleton(&self, expr: &IntervalExpr) -> Option<i64> {
        let iv = self.eval(expr);
        (!iv.is_bottom() && iv.lo == iv.hi).then_some(iv.lo)
    }
}
