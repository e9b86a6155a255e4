//! End-to-end scenarios exercising `ArrayExpansionDomain` against the
//! crate's own reference interval domain.

use array_expansion::{
    ArrayExpansionDomain, ArrayVariable, Diagnostics, ElementKind, ImprecisionWarning, Offset,
    ScalarVar, Variable,
};
use array_expansion::context::{AnalysisConfig, AnalysisContext};
use array_expansion::numeric::{LinearExpression, NumericDomain};
use array_expansion::testing::{IntervalDomain, IntervalExpr};
use array_expansion::variable::ArrayElementKind;

type Dom = ArrayExpansionDomain<IntervalDomain>;

fn arr(i: u32) -> ArrayVariable {
    ArrayVariable::new(i, ArrayElementKind::IntegerArray)
}

fn scalar(name: &str, idx: u64) -> ScalarVar {
    ScalarVar {
        index: idx,
        name: name.into(),
        kind: ElementKind::Integer,
        bitwidth: 32,
    }
}

fn k(v: i64) -> IntervalExpr {
    IntervalExpr::from_constant(v)
}

fn singleton(dom: &Dom, s: &ScalarVar) -> Option<i64> {
    dom.get_content_domain().to_singleton(&IntervalExpr::from_scalar(s))
}

#[test]
fn s4_non_constant_index_kills_symbolically_overlapping_cells() {
    let mut ctx = AnalysisContext::new(AnalysisConfig::default());
    let mut diag = Diagnostics::new();
    let a = arr(0);
    let mut d = Dom::top();

    d.array_store(&mut ctx, &mut diag, a, &k(4), &k(0), &k(1), false).unwrap();
    d.array_store(&mut ctx, &mut diag, a, &k(4), &k(4), &k(2), false).unwrap();
    d.array_store(&mut ctx, &mut diag, a, &k(4), &k(8), &k(3), false).unwrap();
    d.array_store(&mut ctx, &mut diag, a, &k(4), &k(12), &k(4), false).unwrap();

    // Constrain i to the genuine range [0, 12] rather than a point, so
    // `to_singleton` reports `None` and `array_store` takes the symbolic
    // overlap path instead of the singleton-offset path.
    let i = scalar("i", 9001);
    d.scalars_mut().add_constraint(&IntervalExpr::from_scalar(&i).ge(&k(0)));
    d.scalars_mut().add_constraint(&IntervalExpr::from_scalar(&i).le(&k(12)));

    d.array_store(
        &mut ctx,
        &mut diag,
        a,
        &k(4),
        &IntervalExpr::from_scalar(&i),
        &k(99),
        false,
    )
    .unwrap();

    assert!(d.layout(a).get(Offset::new(0), 4).is_none());
    assert!(d.layout(a).get(Offset::new(4), 4).is_none());
    assert!(d.layout(a).get(Offset::new(8), 4).is_none());
    assert!(d.layout(a).get(Offset::new(12), 4).is_none());
    assert!(
        diag.warnings()
            .iter()
            .any(|w| matches!(w, ImprecisionWarning::NonConstantIndex { .. }))
    );
}

#[test]
fn backward_load_refines_precondition_from_postcondition() {
    let mut ctx = AnalysisContext::new(AnalysisConfig::default());
    let mut diag = Diagnostics::new();
    let a = arr(0);

    let mut pre = Dom::top();
    pre.array_store(&mut ctx, &mut diag, a, &k(4), &k(0), &k(7), false).unwrap();

    let x = scalar("x", 42);
    let mut post = pre.clone();
    post.array_load(&mut ctx, &mut diag, &x, a, &k(4), &k(0)).unwrap();
    assert_eq!(singleton(&post, &x), Some(7));

    let mut refined = Dom::top();
    refined
        .backward_array_load(&mut ctx, &mut diag, &x, a, &k(4), &k(0), &post)
        .unwrap();
    assert_eq!(singleton(&refined, &x), Some(7));
}

#[test]
fn kill_idempotence() {
    let mut ctx = AnalysisContext::new(AnalysisConfig::default());
    let mut diag = Diagnostics::new();
    let a = arr(0);
    let mut d = Dom::top();
    d.array_store(&mut ctx, &mut diag, a, &k(4), &k(0), &k(1), false).unwrap();

    let mut once = d.clone();
    once.forget(&[Variable::Array(a)]);
    let mut twice = once.clone();
    twice.forget(&[Variable::Array(a)]);

    assert!(once.layout(a).is_empty());
    assert!(twice.layout(a).is_empty());
}

#[test]
fn region_operations_report_a_programming_error() {
    let d = Dom::top();
    assert!(d.region_or_reference_operation().is_err());
}
