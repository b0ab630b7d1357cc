//! Typed arithmetic/Boolean expression trees (spec.md §4.1 "Expression &
//! Variable Core").
//!
//! Every variable position is generic over its variable representation `V`
//! so the same tree shape serves both the surface AST (where `V` would be
//! a plain identifier, pre-resolution) and the modelled core (`V = Var`,
//! post name-resolution) — see spec.md §9 "Symbolic escape hatch". The
//! core only ever instantiates `V = Var`; the `IntExpr`/`BoolExpr`/`AnyExpr`
//! aliases below fix that for everywhere past the modeller.

use crate::intern::Symbol;
use crate::var::{Mark, Var};
use std::collections::HashSet;

/// Either a regular variable or an uninterpreted symbol call. Symbols stand
/// in for constructs the core cannot natively model; their parameters are
/// real expressions and participate in substitution, but the symbol body
/// itself is opaque (spec.md §3 "Expressions").
#[derive(Debug, Clone, PartialEq)]
pub enum Sym<V> {
    Reg(V),
    Symbol { name: Symbol, args: Vec<GAnyExpr<V>> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GIntExpr<V> {
    Lit(i64),
    Var(Sym<V>),
    Add(Vec<GIntExpr<V>>),
    Sub(Vec<GIntExpr<V>>),
    Mul(Vec<GIntExpr<V>>),
    Div(Box<GIntExpr<V>>, Box<GIntExpr<V>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GBoolExpr<V> {
    Lit(bool),
    Var(Sym<V>),
    And(Vec<GBoolExpr<V>>),
    Or(Vec<GBoolExpr<V>>),
    Not(Box<GBoolExpr<V>>),
    Implies(Box<GBoolExpr<V>>, Box<GBoolExpr<V>>),
    /// Polymorphic equality: both sides must have been type-checked to the
    /// same `Ty` before this node is constructed.
    Eq(Box<GAnyExpr<V>>, Box<GAnyExpr<V>>),
    Gt(Box<GIntExpr<V>>, Box<GIntExpr<V>>),
    Lt(Box<GIntExpr<V>>, Box<GIntExpr<V>>),
    Ge(Box<GIntExpr<V>>, Box<GIntExpr<V>>),
    Le(Box<GIntExpr<V>>, Box<GIntExpr<V>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GAnyExpr<V> {
    Int(GIntExpr<V>),
    Bool(GBoolExpr<V>),
}

pub type IntExpr = GIntExpr<Var>;
pub type BoolExpr = GBoolExpr<Var>;
pub type AnyExpr = GAnyExpr<Var>;

// ───────────────────────────────────────────────────────────────────────
// Smart constructors (peephole simplification only where meaning-preserving)
// ───────────────────────────────────────────────────────────────────────

impl<V> GIntExpr<V> {
    pub fn lit(n: i64) -> Self {
        GIntExpr::Lit(n)
    }

    pub fn var(v: V) -> Self {
        GIntExpr::Var(Sym::Reg(v))
    }

    pub fn symbol(name: Symbol, args: Vec<GAnyExpr<V>>) -> Self {
        GIntExpr::Var(Sym::Symbol { name, args })
    }

    pub fn add(terms: Vec<GIntExpr<V>>) -> Self {
        GIntExpr::Add(terms)
    }

    pub fn sub(terms: Vec<GIntExpr<V>>) -> Self {
        GIntExpr::Sub(terms)
    }

    pub fn mul(terms: Vec<GIntExpr<V>>) -> Self {
        GIntExpr::Mul(terms)
    }

    pub fn div(num: GIntExpr<V>, den: GIntExpr<V>) -> Self {
        GIntExpr::Div(Box::new(num), Box::new(den))
    }
}

impl<V> GBoolExpr<V> {
    pub fn lit(b: bool) -> Self {
        GBoolExpr::Lit(b)
    }

    pub fn var(v: V) -> Self {
        GBoolExpr::Var(Sym::Reg(v))
    }

    pub fn symbol(name: Symbol, args: Vec<GAnyExpr<V>>) -> Self {
        GBoolExpr::Var(Sym::Symbol { name, args })
    }

    /// `and []` → true; `and [x]` → x; otherwise `And(terms)`.
    pub fn and(mut terms: Vec<GBoolExpr<V>>) -> Self {
        if terms.is_empty() {
            return GBoolExpr::Lit(true);
        }
        if terms.len() == 1 {
            return terms.pop().unwrap();
        }
        GBoolExpr::And(terms)
    }

    /// `or []` → false; `or [x]` → x; otherwise `Or(terms)`.
    pub fn or(mut terms: Vec<GBoolExpr<V>>) -> Self {
        if terms.is_empty() {
            return GBoolExpr::Lit(false);
        }
        if terms.len() == 1 {
            return terms.pop().unwrap();
        }
        GBoolExpr::Or(terms)
    }

    pub fn not(e: GBoolExpr<V>) -> Self {
        GBoolExpr::Not(Box::new(e))
    }

    /// `implies(false, _)` → true; `implies(_, true)` → true; otherwise
    /// `Implies(a, b)`. Deliberately does NOT fold `implies(x, x)` or any
    /// other syntactic-identity shortcut — see module docs on `eq`.
    pub fn implies(a: GBoolExpr<V>, b: GBoolExpr<V>) -> Self {
        if matches!(a, GBoolExpr::Lit(false)) {
            return GBoolExpr::Lit(true);
        }
        if matches!(b, GBoolExpr::Lit(true)) {
            return GBoolExpr::Lit(true);
        }
        GBoolExpr::Implies(Box::new(a), Box::new(b))
    }

    /// Polymorphic equality. Syntactic-identity folding (`eq(x, x)` → true)
    /// is deliberately NOT performed: a symbol compared to itself may still
    /// denote different values across calls, and folding would be unsound
    /// once symbols are underapproximated (spec.md §4.1).
    pub fn eq(a: GAnyExpr<V>, b: GAnyExpr<V>) -> Self {
        GBoolExpr::Eq(Box::new(a), Box::new(b))
    }

    pub fn gt(a: GIntExpr<V>, b: GIntExpr<V>) -> Self {
        GBoolExpr::Gt(Box::new(a), Box::new(b))
    }

    pub fn lt(a: GIntExpr<V>, b: GIntExpr<V>) -> Self {
        GBoolExpr::Lt(Box::new(a), Box::new(b))
    }

    pub fn ge(a: GIntExpr<V>, b: GIntExpr<V>) -> Self {
        GBoolExpr::Ge(Box::new(a), Box::new(b))
    }

    pub fn le(a: GIntExpr<V>, b: GIntExpr<V>) -> Self {
        GBoolExpr::Le(Box::new(a), Box::new(b))
    }
}

// ───────────────────────────────────────────────────────────────────────
// Marking
// ───────────────────────────────────────────────────────────────────────

/// Replace every regular variable with its marked form. Symbol parameters
/// are remarked recursively; the symbol's name is left untouched
/// (spec.md §4.1 "A marking operation").
pub fn mark_int(e: &IntExpr, mark: Mark) -> IntExpr {
    match e {
        GIntExpr::Lit(n) => GIntExpr::Lit(*n),
        GIntExpr::Var(sym) => GIntExpr::Var(mark_sym(sym, mark)),
        GIntExpr::Add(xs) => GIntExpr::Add(xs.iter().map(|x| mark_int(x, mark)).collect()),
        GIntExpr::Sub(xs) => GIntExpr::Sub(xs.iter().map(|x| mark_int(x, mark)).collect()),
        GIntExpr::Mul(xs) => GIntExpr::Mul(xs.iter().map(|x| mark_int(x, mark)).collect()),
        GIntExpr::Div(a, b) => GIntExpr::Div(Box::new(mark_int(a, mark)), Box::new(mark_int(b, mark))),
    }
}

pub fn mark_bool(e: &BoolExpr, mark: Mark) -> BoolExpr {
    match e {
        GBoolExpr::Lit(b) => GBoolExpr::Lit(*b),
        GBoolExpr::Var(sym) => GBoolExpr::Var(mark_sym(sym, mark)),
        GBoolExpr::And(xs) => GBoolExpr::And(xs.iter().map(|x| mark_bool(x, mark)).collect()),
        GBoolExpr::Or(xs) => GBoolExpr::Or(xs.iter().map(|x| mark_bool(x, mark)).collect()),
        GBoolExpr::Not(x) => GBoolExpr::Not(Box::new(mark_bool(x, mark))),
        GBoolExpr::Implies(a, b) => {
            GBoolExpr::Implies(Box::new(mark_bool(a, mark)), Box::new(mark_bool(b, mark)))
        }
        GBoolExpr::Eq(a, b) => GBoolExpr::Eq(Box::new(mark_any(a, mark)), Box::new(mark_any(b, mark))),
        GBoolExpr::Gt(a, b) => GBoolExpr::Gt(Box::new(mark_int(a, mark)), Box::new(mark_int(b, mark))),
        GBoolExpr::Lt(a, b) => GBoolExpr::Lt(Box::new(mark_int(a, mark)), Box::new(mark_int(b, mark))),
        GBoolExpr::Ge(a, b) => GBoolExpr::Ge(Box::new(mark_int(a, mark)), Box::new(mark_int(b, mark))),
        GBoolExpr::Le(a, b) => GBoolExpr::Le(Box::new(mark_int(a, mark)), Box::new(mark_int(b, mark))),
    }
}

pub fn mark_any(e: &AnyExpr, mark: Mark) -> AnyExpr {
    match e {
        GAnyExpr::Int(i) => GAnyExpr::Int(mark_int(i, mark)),
        GAnyExpr::Bool(b) => GAnyExpr::Bool(mark_bool(b, mark)),
    }
}

fn mark_sym(sym: &Sym<Var>, mark: Mark) -> Sym<Var> {
    match sym {
        Sym::Reg(v) => Sym::Reg(v.with_mark(mark)),
        Sym::Symbol { name, args } => Sym::Symbol {
            name: *name,
            args: args.iter().map(|a| mark_any(a, mark)).collect(),
        },
    }
}

// ───────────────────────────────────────────────────────────────────────
// Position context & symbol underapproximation
// ───────────────────────────────────────────────────────────────────────

/// The polarity a subexpression occurs in, threaded explicitly through the
/// underapproximation traversal (never as ambient/thread-local state —
/// spec.md §9). Flips on negation and on the antecedent of implication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn flip(self) -> Polarity {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }
}

/// Replace every symbol occurring in Boolean position with `false` in
/// positive polarity and `true` in negative polarity — a sound weakening
/// that removes symbols ahead of SMT encoding. Integer positions are left
/// untouched (spec.md §4.1).
pub fn underapproximate_bool(e: &BoolExpr, polarity: Polarity) -> BoolExpr {
    match e {
        GBoolExpr::Lit(b) => GBoolExpr::Lit(*b),
        GBoolExpr::Var(Sym::Reg(v)) => GBoolExpr::Var(Sym::Reg(*v)),
        GBoolExpr::Var(Sym::Symbol { .. }) => GBoolExpr::Lit(polarity == Polarity::Negative),
        GBoolExpr::And(xs) => GBoolExpr::And(xs.iter().map(|x| underapproximate_bool(x, polarity)).collect()),
        GBoolExpr::Or(xs) => GBoolExpr::Or(xs.iter().map(|x| underapproximate_bool(x, polarity)).collect()),
        GBoolExpr::Not(x) => GBoolExpr::Not(Box::new(underapproximate_bool(x, polarity.flip()))),
        GBoolExpr::Implies(a, b) => GBoolExpr::Implies(
            Box::new(underapproximate_bool(a, polarity.flip())),
            Box::new(underapproximate_bool(b, polarity)),
        ),
        // Equality/comparisons are not themselves in a polarity-flippable
        // shape internally (their operands are Int/Bool values, not
        // propositions at this node) but a symbol nested as an operand's
        // sub-term is still reachable through Eq-on-Bool.
        GBoolExpr::Eq(a, b) => {
            GBoolExpr::Eq(Box::new(underapproximate_any(a, polarity)), Box::new(underapproximate_any(b, polarity)))
        }
        GBoolExpr::Gt(a, b) => GBoolExpr::Gt(a.clone(), b.clone()),
        GBoolExpr::Lt(a, b) => GBoolExpr::Lt(a.clone(), b.clone()),
        GBoolExpr::Ge(a, b) => GBoolExpr::Ge(a.clone(), b.clone()),
        GBoolExpr::Le(a, b) => GBoolExpr::Le(a.clone(), b.clone()),
    }
}

/// Integer positions are untouched by underapproximation, but a symbol
/// nested inside an integer expression can still carry Boolean-valued
/// arguments (via `Sym::Symbol` args), so we still recurse to reach those.
pub fn underapproximate_int(e: &IntExpr, polarity: Polarity) -> IntExpr {
    match e {
        GIntExpr::Lit(n) => GIntExpr::Lit(*n),
        GIntExpr::Var(Sym::Reg(v)) => GIntExpr::Var(Sym::Reg(*v)),
        GIntExpr::Var(Sym::Symbol { name, args }) => GIntExpr::Var(Sym::Symbol {
            name: *name,
            args: args.iter().map(|a| underapproximate_any(a, polarity)).collect(),
        }),
        GIntExpr::Add(xs) => GIntExpr::Add(xs.iter().map(|x| underapproximate_int(x, polarity)).collect()),
        GIntExpr::Sub(xs) => GIntExpr::Sub(xs.iter().map(|x| underapproximate_int(x, polarity)).collect()),
        GIntExpr::Mul(xs) => GIntExpr::Mul(xs.iter().map(|x| underapproximate_int(x, polarity)).collect()),
        GIntExpr::Div(a, b) => GIntExpr::Div(
            Box::new(underapproximate_int(a, polarity)),
            Box::new(underapproximate_int(b, polarity)),
        ),
    }
}

pub fn underapproximate_any(e: &AnyExpr, polarity: Polarity) -> AnyExpr {
    match e {
        GAnyExpr::Int(i) => GAnyExpr::Int(underapproximate_int(i, polarity)),
        GAnyExpr::Bool(b) => GAnyExpr::Bool(underapproximate_bool(b, polarity)),
    }
}

// ───────────────────────────────────────────────────────────────────────
// Symbol removal (used downstream by SMT encoding; a failure here means
// underapproximation was skipped or left a Sym::Symbol in an Int position)
// ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRemainsError;

pub fn remove_symbols_bool(e: &BoolExpr) -> Result<BoolExpr, SymbolRemainsError> {
    Ok(match e {
        GBoolExpr::Lit(b) => GBoolExpr::Lit(*b),
        GBoolExpr::Var(Sym::Reg(v)) => GBoolExpr::Var(Sym::Reg(*v)),
        GBoolExpr::Var(Sym::Symbol { .. }) => return Err(SymbolRemainsError),
        GBoolExpr::And(xs) => GBoolExpr::And(
            xs.iter().map(remove_symbols_bool).collect::<Result<_, _>>()?,
        ),
        GBoolExpr::Or(xs) => GBoolExpr::Or(
            xs.iter().map(remove_symbols_bool).collect::<Result<_, _>>()?,
        ),
        GBoolExpr::Not(x) => GBoolExpr::Not(Box::new(remove_symbols_bool(x)?)),
        GBoolExpr::Implies(a, b) => {
            GBoolExpr::Implies(Box::new(remove_symbols_bool(a)?), Box::new(remove_symbols_bool(b)?))
        }
        GBoolExpr::Eq(a, b) => {
            GBoolExpr::Eq(Box::new(remove_symbols_any(a)?), Box::new(remove_symbols_any(b)?))
        }
        GBoolExpr::Gt(a, b) => GBoolExpr::Gt(Box::new(remove_symbols_int(a)?), Box::new(remove_symbols_int(b)?)),
        GBoolExpr::Lt(a, b) => GBoolExpr::Lt(Box::new(remove_symbols_int(a)?), Box::new(remove_symbols_int(b)?)),
        GBoolExpr::Ge(a, b) => GBoolExpr::Ge(Box::new(remove_symbols_int(a)?), Box::new(remove_symbols_int(b)?)),
        GBoolExpr::Le(a, b) => GBoolExpr::Le(Box::new(remove_symbols_int(a)?), Box::new(remove_symbols_int(b)?)),
    })
}

pub fn remove_symbols_int(e: &IntExpr) -> Result<IntExpr, SymbolRemainsError> {
    Ok(match e {
        GIntExpr::Lit(n) => GIntExpr::Lit(*n),
        GIntExpr::Var(Sym::Reg(v)) => GIntExpr::Var(Sym::Reg(*v)),
        GIntExpr::Var(Sym::Symbol { .. }) => return Err(SymbolRemainsError),
        GIntExpr::Add(xs) => GIntExpr::Add(xs.iter().map(remove_symbols_int).collect::<Result<_, _>>()?),
        GIntExpr::Sub(xs) => GIntExpr::Sub(xs.iter().map(remove_symbols_int).collect::<Result<_, _>>()?),
        GIntExpr::Mul(xs) => GIntExpr::Mul(xs.iter().map(remove_symbols_int).collect::<Result<_, _>>()?),
        GIntExpr::Div(a, b) => {
            GIntExpr::Div(Box::new(remove_symbols_int(a)?), Box::new(remove_symbols_int(b)?))
        }
    })
}

fn remove_symbols_any(e: &AnyExpr) -> Result<AnyExpr, SymbolRemainsError> {
    Ok(match e {
        GAnyExpr::Int(i) => GAnyExpr::Int(remove_symbols_int(i)?),
        GAnyExpr::Bool(b) => GAnyExpr::Bool(remove_symbols_bool(b)?),
    })
}

// ───────────────────────────────────────────────────────────────────────
// Free variables & intermediate-stage queries
// ───────────────────────────────────────────────────────────────────────

pub fn free_vars_bool(e: &BoolExpr, out: &mut HashSet<Var>) {
    match e {
        GBoolExpr::Lit(_) => {}
        GBoolExpr::Var(sym) => free_vars_sym(sym, out),
        GBoolExpr::And(xs) | GBoolExpr::Or(xs) => xs.iter().for_each(|x| free_vars_bool(x, out)),
        GBoolExpr::Not(x) => free_vars_bool(x, out),
        GBoolExpr::Implies(a, b) => {
            free_vars_bool(a, out);
            free_vars_bool(b, out);
        }
        GBoolExpr::Eq(a, b) => {
            free_vars_any(a, out);
            free_vars_any(b, out);
        }
        GBoolExpr::Gt(a, b) | GBoolExpr::Lt(a, b) | GBoolExpr::Ge(a, b) | GBoolExpr::Le(a, b) => {
            free_vars_int(a, out);
            free_vars_int(b, out);
        }
    }
}

pub fn free_vars_int(e: &IntExpr, out: &mut HashSet<Var>) {
    match e {
        GIntExpr::Lit(_) => {}
        GIntExpr::Var(sym) => free_vars_sym(sym, out),
        GIntExpr::Add(xs) | GIntExpr::Sub(xs) | GIntExpr::Mul(xs) => {
            xs.iter().for_each(|x| free_vars_int(x, out))
        }
        GIntExpr::Div(a, b) => {
            free_vars_int(a, out);
            free_vars_int(b, out);
        }
    }
}

fn free_vars_any(e: &AnyExpr, out: &mut HashSet<Var>) {
    match e {
        GAnyExpr::Int(i) => free_vars_int(i, out),
        GAnyExpr::Bool(b) => free_vars_bool(b, out),
    }
}

fn free_vars_sym(sym: &Sym<Var>, out: &mut HashSet<Var>) {
    match sym {
        Sym::Reg(v) => {
            out.insert(*v);
        }
        Sym::Symbol { args, .. } => args.iter().for_each(|a| free_vars_any(a, out)),
    }
}

/// The highest `Intermediate(k)`/`Goal(k)` stage referenced anywhere in the
/// expression, used during sequential composition to pick a fresh stage
/// number for the next primitive.
pub fn highest_intermediate_bool(e: &BoolExpr) -> Option<u32> {
    let mut vars = HashSet::new();
    free_vars_bool(e, &mut vars);
    vars.into_iter().filter_map(|v| v.mark.stage()).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;
    use crate::types::Ty;
    use crate::var::Scope;

    fn var(interner: &mut Interner, name: &str, ty: Ty) -> Var {
        Var::new(ty, interner.intern(name), Scope::Shared)
    }

    #[test]
    fn and_of_empty_is_true() {
        assert_eq!(BoolExpr::and(vec![]), GBoolExpr::Lit(true));
    }

    #[test]
    fn or_of_empty_is_false() {
        assert_eq!(BoolExpr::or(vec![]), GBoolExpr::Lit(false));
    }

    #[test]
    fn and_of_singleton_unwraps() {
        let mut interner = Interner::new();
        let x = var(&mut interner, "x", Ty::Bool);
        let e = BoolExpr::and(vec![BoolExpr::var(x)]);
        assert_eq!(e, BoolExpr::var(x));
    }

    #[test]
    fn implies_false_antecedent_is_true() {
        let mut interner = Interner::new();
        let x = var(&mut interner, "x", Ty::Bool);
        let e = BoolExpr::implies(BoolExpr::lit(false), BoolExpr::var(x));
        assert_eq!(e, GBoolExpr::Lit(true));
    }

    #[test]
    fn implies_true_consequent_is_true() {
        let mut interner = Interner::new();
        let x = var(&mut interner, "x", Ty::Bool);
        let e = BoolExpr::implies(BoolExpr::var(x), BoolExpr::lit(true));
        assert_eq!(e, GBoolExpr::Lit(true));
    }

    #[test]
    fn eq_does_not_fold_identical_operands() {
        let mut interner = Interner::new();
        let x = var(&mut interner, "x", Ty::Int);
        let e = BoolExpr::eq(GAnyExpr::Int(IntExpr::var(x)), GAnyExpr::Int(IntExpr::var(x)));
        assert!(matches!(e, GBoolExpr::Eq(..)));
    }

    #[test]
    fn marking_stamps_regular_variables() {
        let mut interner = Interner::new();
        let x = var(&mut interner, "x", Ty::Int);
        let e = IntExpr::var(x);
        let marked = mark_int(&e, Mark::Before);
        match marked {
            GIntExpr::Var(Sym::Reg(v)) => assert_eq!(v.mark, Mark::Before),
            _ => panic!("expected a regular variable"),
        }
    }

    #[test]
    fn marking_recurses_into_symbol_args_but_not_the_name() {
        let mut interner = Interner::new();
        let x = var(&mut interner, "x", Ty::Int);
        let sym_name = interner.intern("Reach");
        let e = BoolExpr::symbol(sym_name, vec![GAnyExpr::Int(IntExpr::var(x))]);
        let marked = mark_bool(&e, Mark::After);
        match marked {
            GBoolExpr::Var(Sym::Symbol { name, args }) => {
                assert_eq!(name, sym_name);
                match &args[0] {
                    GAnyExpr::Int(GIntExpr::Var(Sym::Reg(v))) => assert_eq!(v.mark, Mark::After),
                    _ => panic!("expected marked regular variable in symbol args"),
                }
            }
            _ => panic!("expected a symbol"),
        }
    }

    #[test]
    fn underapproximate_replaces_symbol_with_false_in_positive_position() {
        let sym_name = Interner::new().intern("Unknown");
        let e = BoolExpr::symbol(sym_name, vec![]);
        let weak = underapproximate_bool(&e, Polarity::Positive);
        assert_eq!(weak, GBoolExpr::Lit(false));
    }

    #[test]
    fn underapproximate_replaces_symbol_with_true_in_negative_position() {
        let sym_name = Interner::new().intern("Unknown");
        let e = BoolExpr::symbol(sym_name, vec![]);
        let weak = underapproximate_bool(&e, Polarity::Negative);
        assert_eq!(weak, GBoolExpr::Lit(true));
    }

    #[test]
    fn underapproximate_flips_polarity_under_not() {
        let sym_name = Interner::new().intern("Unknown");
        let e = BoolExpr::not(BoolExpr::symbol(sym_name, vec![]));
        let weak = underapproximate_bool(&e, Polarity::Positive);
        // inside Not, positive becomes negative -> symbol becomes true,
        // then wrapped in Not -> Not(true)
        assert_eq!(weak, GBoolExpr::Not(Box::new(GBoolExpr::Lit(true))));
    }

    /// Open question #3 (spec.md §9): verify
    /// `implies(implies(sym, sym), sym)` underapproximates the middle
    /// symbol at positive polarity (negative-then-negative).
    #[test]
    fn nested_implies_antecedent_of_antecedent_is_positive() {
        let sym_name = Interner::new().intern("P");
        let inner = BoolExpr::implies(BoolExpr::symbol(sym_name, vec![]), BoolExpr::symbol(sym_name, vec![]));
        let outer = BoolExpr::implies(inner, BoolExpr::symbol(sym_name, vec![]));
        let weak = underapproximate_bool(&outer, Polarity::Positive);
        // outer Implies(inner, sym): inner is antecedent -> Negative;
        // inner Implies(sym, sym): its antecedent is antecedent-of-antecedent
        // -> Negative.flip() = Positive, so the middle symbol -> false.
        // inner's consequent stays at inner's polarity (Negative) -> true.
        // outer's consequent (rightmost sym) is at outer's polarity
        // (Positive) -> false.
        let expected = GBoolExpr::Implies(
            Box::new(GBoolExpr::Implies(
                Box::new(GBoolExpr::Lit(false)),
                Box::new(GBoolExpr::Lit(true)),
            )),
            Box::new(GBoolExpr::Lit(false)),
        );
        assert_eq!(weak, expected);
    }

    #[test]
    fn free_vars_includes_symbol_arguments_but_not_symbol_name() {
        let mut interner = Interner::new();
        let x = var(&mut interner, "x", Ty::Int);
        let sym_name = interner.intern("Reach");
        let e = BoolExpr::symbol(sym_name, vec![GAnyExpr::Int(IntExpr::var(x))]);
        let mut out = HashSet::new();
        free_vars_bool(&e, &mut out);
        assert_eq!(out.len(), 1);
        assert!(out.contains(&x));
    }

    #[test]
    fn remove_symbols_fails_when_a_symbol_remains() {
        let sym_name = Interner::new().intern("Unknown");
        let e = BoolExpr::symbol(sym_name, vec![]);
        assert!(remove_symbols_bool(&e).is_err());
    }

    #[test]
    fn remove_symbols_succeeds_on_symbol_free_expr() {
        let mut interner = Interner::new();
        let x = var(&mut interner, "x", Ty::Int);
        let e = BoolExpr::gt(IntExpr::var(x), IntExpr::lit(0));
        assert!(remove_symbols_bool(&e).is_ok());
    }

    #[test]
    fn highest_intermediate_stage_finds_the_max() {
        let mut interner = Interner::new();
        let a = Var::new(Ty::Int, interner.intern("a"), Scope::Shared).with_mark(Mark::Intermediate(2));
        let b = Var::new(Ty::Int, interner.intern("b"), Scope::Shared).with_mark(Mark::Intermediate(5));
        let e = BoolExpr::eq(GAnyExpr::Int(IntExpr::var(a)), GAnyExpr::Int(IntExpr::var(b)));
        assert_eq!(highest_intermediate_bool(&e), Some(5));
    }
}
