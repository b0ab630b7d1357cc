//! Property tests for the "for all well-typed inputs" invariants: Collate/
//! flatten round-tripping, pipeline determinism, and disjoint variable
//! maps. Each draws from a small fixed pool rather than an arbitrary AST
//! generator, since `ScriptItem` has no `Arbitrary` impl to hang a fully
//! free-form strategy off of — proptest still exercises many orderings/
//! subsets/name choices per run and shrinks failures.

use proptest::prelude::*;
use starling_core::ast::{ConstraintDecl, MethodDecl, ScriptItem, ViewPattern, ViewProtoDecl};
use starling_core::ast::{Block as AstBlock, Expr};
use starling_core::collator::collate;
use starling_core::driver::{Driver, Target};
use starling_core::intern::Interner;
use starling_core::span::Span;
use starling_core::types::Ty;
use starling_core::var::Scope;

fn global(interner: &mut Interner, name: &str, ty: Ty) -> ScriptItem {
    ScriptItem::Global(starling_core::ast::VarDecl {
        scope: Scope::Shared,
        ty,
        name: interner.intern(name),
        span: Span::default(),
    })
}

fn local(interner: &mut Interner, name: &str, ty: Ty) -> ScriptItem {
    ScriptItem::Local(starling_core::ast::VarDecl {
        scope: Scope::Thread,
        ty,
        name: interner.intern(name),
        span: Span::default(),
    })
}

fn view_proto(interner: &mut Interner, name: &str) -> ScriptItem {
    ScriptItem::ViewProto(ViewProtoDecl { name: interner.intern(name), params: vec![], span: Span::default() })
}

fn constraint(interner: &mut Interner, view_name: &str) -> ScriptItem {
    ScriptItem::Constraint(ConstraintDecl {
        pattern: ViewPattern::Func(interner.intern(view_name), vec![]),
        body: Expr::BoolLit(true),
        span: Span::default(),
    })
}

fn method(interner: &mut Interner, name: &str) -> ScriptItem {
    ScriptItem::Method(MethodDecl {
        name: interner.intern(name),
        body: AstBlock::new(vec![ViewPattern::Emp, ViewPattern::Emp], vec![]),
        span: Span::default(),
    })
}

fn pool(interner: &mut Interner) -> Vec<ScriptItem> {
    vec![
        global(interner, "x", Ty::Int),
        global(interner, "flag", Ty::Bool),
        local(interner, "t", Ty::Int),
        local(interner, "s", Ty::Int),
        view_proto(interner, "holdLock"),
        view_proto(interner, "holdTick"),
        constraint(interner, "holdLock"),
        method(interner, "lock"),
        method(interner, "unlock"),
    ]
}

proptest! {
    /// spec.md §8 "Collate is inverse to flatten": flattening a collated
    /// script and re-collating yields an equal value, for any ordering and
    /// any subset of the item pool (collate is a stable bucket-sort, which
    /// doesn't care about input order or which subset is present).
    #[test]
    fn collate_then_flatten_then_collate_is_idempotent(
        indices in prop::collection::vec(0usize..9, 0..20)
    ) {
        let mut interner = Interner::new();
        let pool = pool(&mut interner);
        let items: Vec<ScriptItem> = indices.iter().map(|&i| pool[i].clone()).collect();

        let once = collate(items);
        let flattened = once.flatten();
        let twice = collate(flattened);

        prop_assert_eq!(once, twice);
    }

    /// spec.md §8 "the pipeline is deterministic": running the full
    /// pipeline twice on the same source produces an equal `Model<Graph,
    /// _>`, for any of a handful of representative programs.
    #[test]
    fn pipeline_is_deterministic_across_repeated_runs(
        src in prop_oneof![
            Just(""),
            Just("shared int x; view nonNegative(int x); constraint nonNegative(x) -> x >= 0;"),
            Just("shared int ticket; thread int t; view holdTick(int t); constraint holdTick(t) -> t >= 0; \
                  method lock() { {| emp |} < t = ticket++ > {| holdTick(t) |} }"),
            Just("shared bool locked; thread bool old; view holdLock(); constraint holdLock() -> true; \
                  method lock() { {| emp |} < CAS(locked, old, true) > {| holdLock() |} }"),
        ]
    ) {
        let mut interner_a = Interner::new();
        let mut interner_b = Interner::new();
        let driver = Driver::new();
        let a = driver.run(&src, &mut interner_a, Target::Graph);
        let b = driver.run(&src, &mut interner_b, Target::Graph);
        match (a, b) {
            (Ok(oa), Ok(ob)) => {
                prop_assert_eq!(oa.into_graphed(), ob.into_graphed());
            }
            (Err(ea), Err(eb)) => prop_assert_eq!(ea, eb),
            _ => prop_assert!(false, "one run succeeded and the other failed"),
        }
    }

    /// spec.md §8 "variable maps produced by the modeller are disjoint":
    /// for any two distinct names split one into `globals`, the other into
    /// `locals`, the model always succeeds and reports no disjointness
    /// violation.
    #[test]
    fn distinct_global_and_local_names_never_collide(
        (g, l) in prop_oneof![
            Just(("a", "b")), Just(("c", "d")), Just(("e", "f")),
            Just(("ticket", "serving")), Just(("x", "y")),
        ]
    ) {
        prop_assume!(g != l);
        let src = format!("shared int {}; thread int {};", g, l);
        let mut interner = Interner::new();
        let driver = Driver::new();
        let out = driver.run(&src, &mut interner, Target::Model);
        let model = out.expect("two distinct names must never be rejected").into_modelled().unwrap();
        prop_assert!(model.check_disjoint_scopes().is_empty());
    }
}
