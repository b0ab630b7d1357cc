//! Shared fixtures for the test suites in this crate and in `tests/`:
//! source-level programs exercising the two worked algorithms (a
//! ticket lock and a CAS-based lock), plus small builders for the typed
//! values every stage's tests construct by hand.
//!
//! Always compiled (not `#[cfg(test)]`-gated) so `tests/end_to_end.rs`
//! can reach it through the public API, the same way the fixtures a
//! library ships for its own doctests stay out of `#[cfg(test)]`.

use crate::ast::ScriptItem;
use crate::intern::Interner;
use crate::parser;
use crate::types::Ty;
use crate::var::{Mark, Scope, Var};

/// The spec.md §8 ticket-lock program: two shared counters, two
/// thread-locals, a held-ticket view and a held-lock view, a spin loop
/// that reads `serving` until it matches the caller's ticket.
pub const TICKET_LOCK_SRC: &str = "\
shared int ticket;
shared int serving;
thread int t;
thread int s;
view holdTick(int t);
view holdLock();
constraint holdTick(t) -> t >= 0;
constraint holdLock() -> true;
method lock() {
    {| emp |}
    < t = ticket++ >
    {| holdTick(t) |}
    while (s != t) {
        {| holdTick(t) |}
        < s = serving >
        {| holdTick(t) |}
    }
    {| holdLock() |}
}
method unlock() {
    {| holdLock() |}
    < s = serving++ >
    {| emp |}
}
";

/// The spec.md §8 CAS-lock program: a single shared boolean guarded by a
/// compare-and-swap, acquired in a `do ... while` retry loop.
pub const CAS_LOCK_SRC: &str = "\
shared bool locked;
thread bool old;
view holdLock();
constraint holdLock() -> true;
method lock() {
    {| emp |}
    do {
        {| emp |}
        < CAS(locked, old, true) >
        {| emp |}
    } while (old);
    {| holdLock() |}
}
method unlock() {
    {| holdLock() |}
    < locked = false >
    {| emp |}
}
";

/// A program with a single free-standing constraint and no methods, for
/// exercising the pipeline on a body with nothing to graph.
pub const SINGLE_CONSTRAINT_SRC: &str = "\
shared int x;
view nonNegative(int x);
constraint nonNegative(x) -> x >= 0;
";

/// An `if`/`else` nested inside a `while`, combining join wiring (from the
/// conditional) with loop wiring (from the enclosing loop) in one body.
pub const NESTED_IF_IN_WHILE_SRC: &str = "\
shared int x;
shared bool flag;
method m() {
    {| emp |}
    while (x > 0) {
        {| emp |}
        if (flag) {
            {| emp |}
            < x = x - 1 >
            {| emp |}
        } else {
            {| emp |}
            < skip >
            {| emp |}
        }
        {| emp |}
    }
    {| emp |}
}
";

/// An `iter[n]` multiplicity constraint, for exercising `Iterated`
/// handling through Collate and Model.
pub const ITER_CONSTRAINT_SRC: &str = "\
shared int n;
view unit();
constraint iter[n] unit() -> n >= 0;
";

/// Parses a fixture, panicking with the parse errors on failure — fixtures
/// are expected to always parse; a failure here means the fixture itself
/// is broken, not the code under test.
pub fn parse_fixture(src: &str) -> (Vec<ScriptItem>, Interner) {
    let mut interner = Interner::new();
    match parser::parse(src, &mut interner) {
        Ok(items) => (items, interner),
        Err(errs) => panic!("fixture failed to parse: {:?}", errs),
    }
}

/// An interner pre-seeded with nothing; most tests build their own
/// symbols on top of it as they go.
pub fn fresh_interner() -> Interner {
    Interner::new()
}

pub fn int_var(interner: &mut Interner, name: &str, scope: Scope) -> Var {
    Var::new(Ty::Int, interner.intern(name), scope)
}

pub fn bool_var(interner: &mut Interner, name: &str, scope: Scope) -> Var {
    Var::new(Ty::Bool, interner.intern(name), scope)
}

pub fn marked(var: Var, mark: Mark) -> Var {
    var.with_mark(mark)
}
