//! The fixed table of atomic-primitive signatures and their Before/After
//! relation (spec.md §4.5 responsibility 4, "Atomic primitive semantics").
//!
//! Each entry is a schema: the `DFunc` names the primitive's formal
//! parameters and their types, and the paired `BoolExpr` relates
//! `Before`/`After`-marked copies of those same formal names. Instantiating
//! a schema against a specific call site's actual arguments is a downstream
//! (VC-generation) concern — the Modeller only needs to pick the right
//! schema name per atomic step (`modeller::body`) and record the table once
//! per `Model` (spec.md §1: VC generation is out of scope).

use crate::expr::{BoolExpr, GAnyExpr, IntExpr};
use crate::intern::{Interner, Symbol};
use crate::types::{Ty, TypedName};
use crate::var::{Mark, Scope, Var};
use crate::view::{DFunc, Func};

/// Canonical primitive names, interned once so callers (principally
/// `modeller::body`) can match on them without re-interning a literal every
/// time. Formal-parameter variables use `Scope::Thread` as an arbitrary but
/// fixed convention — a schema variable is not actually drawn from either
/// program scope (see DESIGN.md).
pub struct PrimNames {
    pub store_int: Symbol,
    pub store_bool: Symbol,
    pub load_int: Symbol,
    pub load_bool: Symbol,
    pub incr_int: Symbol,
    pub decr_int: Symbol,
    pub cas_int: Symbol,
    pub cas_bool: Symbol,
    pub skip: Symbol,
    pub assume: Symbol,
}

impl PrimNames {
    pub fn intern(interner: &mut Interner) -> Self {
        PrimNames {
            store_int: interner.intern("store_int"),
            store_bool: interner.intern("store_bool"),
            load_int: interner.intern("load_int"),
            load_bool: interner.intern("load_bool"),
            incr_int: interner.intern("incr_int"),
            decr_int: interner.intern("decr_int"),
            cas_int: interner.intern("cas_int"),
            cas_bool: interner.intern("cas_bool"),
            skip: interner.intern("skip"),
            assume: interner.intern("assume"),
        }
    }
}

fn formal(ty: Ty, name: Symbol, mark: Mark) -> Var {
    Var::new(ty, name, Scope::Thread).with_mark(mark)
}

fn eq_of(ty: Ty, a: Var, b: Var) -> BoolExpr {
    match ty {
        Ty::Int => BoolExpr::eq(GAnyExpr::Int(IntExpr::var(a)), GAnyExpr::Int(IntExpr::var(b))),
        Ty::Bool => BoolExpr::eq(GAnyExpr::Bool(BoolExpr::var(a)), GAnyExpr::Bool(BoolExpr::var(b))),
    }
}

fn store_schema(interner: &mut Interner, names: &PrimNames, ty: Ty, name: Symbol) -> (DFunc, BoolExpr) {
    let dest = interner.intern("dest");
    let expr = interner.intern("expr");
    let dfunc: DFunc = Func::new(name, vec![TypedName::new(ty, dest), TypedName::new(ty, expr)]);
    let dest_after = formal(ty, dest, Mark::After);
    let expr_before = formal(ty, expr, Mark::Before);
    // store<T>(dest <- expr): dest_after = expr_before.
    (dfunc, eq_of(ty, dest_after, expr_before))
}

fn load_schema(interner: &mut Interner, _names: &PrimNames, ty: Ty, name: Symbol) -> (DFunc, BoolExpr) {
    let dest = interner.intern("dest");
    let src = interner.intern("src");
    let dfunc: DFunc = Func::new(name, vec![TypedName::new(ty, dest), TypedName::new(ty, src)]);
    let dest_after = formal(ty, dest, Mark::After);
    let src_before = formal(ty, src, Mark::Before);
    let src_after = formal(ty, src, Mark::After);
    // load<T>(dest <- src, direct): dest_after = src_before /\ src_after = src_before.
    (dfunc, BoolExpr::and(vec![eq_of(ty, dest_after, src_before), eq_of(ty, src_after, src_before)]))
}

/// Fetch-and-increment/decrement: the destination receives the *old* value
/// of the source, and the source is bumped by one (the standard
/// fetch-and-add reading that the ticket lock's `t = ticket++` relies on —
/// see DESIGN.md).
fn bump_schema(interner: &mut Interner, name: Symbol, delta: i64) -> (DFunc, BoolExpr) {
    let dest = interner.intern("dest");
    let src = interner.intern("src");
    let dfunc: DFunc = Func::new(name, vec![TypedName::new(Ty::Int, dest), TypedName::new(Ty::Int, src)]);
    let dest_after = formal(Ty::Int, dest, Mark::After);
    let src_before = formal(Ty::Int, src, Mark::Before);
    let src_after = formal(Ty::Int, src, Mark::After);
    let bumped = IntExpr::add(vec![IntExpr::var(src_before), IntExpr::lit(delta)]);
    (
        dfunc,
        BoolExpr::and(vec![
            eq_of(Ty::Int, dest_after, src_before),
            BoolExpr::eq(GAnyExpr::Int(IntExpr::var(src_after)), GAnyExpr::Int(bumped)),
        ]),
    )
}

fn cas_schema(interner: &mut Interner, ty: Ty, name: Symbol) -> (DFunc, BoolExpr) {
    let dest = interner.intern("dest");
    let test = interner.intern("test");
    let set = interner.intern("set");
    let dfunc: DFunc =
        Func::new(name, vec![TypedName::new(ty, dest), TypedName::new(ty, test), TypedName::new(ty, set)]);
    let dest_before = formal(ty, dest, Mark::Before);
    let dest_after = formal(ty, dest, Mark::After);
    let test_before = formal(ty, test, Mark::Before);
    let test_after = formal(ty, test, Mark::After);
    let set_before = formal(ty, set, Mark::Before);
    // cas<T>(dest, test, set):
    //   (dest_before = test_before -> dest_after = set_before /\ test_after = test_before)
    //   /\ (dest_before != test_before -> dest_after = dest_before /\ test_after = dest_before)
    let matched = BoolExpr::implies(
        eq_of(ty, dest_before, test_before),
        BoolExpr::and(vec![eq_of(ty, dest_after, set_before), eq_of(ty, test_after, test_before)]),
    );
    let unmatched = BoolExpr::implies(
        BoolExpr::not(eq_of(ty, dest_before, test_before)),
        BoolExpr::and(vec![eq_of(ty, dest_after, dest_before), eq_of(ty, test_after, dest_before)]),
    );
    (dfunc, BoolExpr::and(vec![matched, unmatched]))
}

fn skip_schema(name: Symbol) -> (DFunc, BoolExpr) {
    // skip: no constraint at all (frame preservation is a downstream VC
    // concern, spec.md §1).
    (Func::new(name, vec![]), BoolExpr::lit(true))
}

fn assume_schema(interner: &mut Interner, name: Symbol) -> (DFunc, BoolExpr) {
    let b = interner.intern("b");
    let dfunc: DFunc = Func::new(name, vec![TypedName::new(Ty::Bool, b)]);
    let b_before = formal(Ty::Bool, b, Mark::Before);
    // assume(b): b (no state change).
    (dfunc, BoolExpr::var(b_before))
}

/// Builds the fixed semantics table recognised by the Modeller
/// (spec.md §4.5 responsibility 4).
pub fn table(interner: &mut Interner) -> (PrimNames, Vec<(DFunc, BoolExpr)>) {
    let names = PrimNames::intern(interner);
    let entries = vec![
        store_schema(interner, &names, Ty::Int, names.store_int),
        store_schema(interner, &names, Ty::Bool, names.store_bool),
        load_schema(interner, &names, Ty::Int, names.load_int),
        load_schema(interner, &names, Ty::Bool, names.load_bool),
        bump_schema(interner, names.incr_int, 1),
        bump_schema(interner, names.decr_int, -1),
        cas_schema(interner, Ty::Int, names.cas_int),
        cas_schema(interner, Ty::Bool, names.cas_bool),
        skip_schema(names.skip),
        assume_schema(interner, names.assume),
    ];
    (names, entries)
}
