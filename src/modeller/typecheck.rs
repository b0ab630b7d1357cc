//! Expression type inference (surface `ast::Expr` → typed `expr::{IntExpr,
//! BoolExpr}`) and the sibling pass resolving a source-level view pattern
//! into a `CView` (spec.md §4.5 responsibilities 3 and 5).

use crate::ast::{self, ViewPattern};
use crate::cview::{CFunc, CView};
use crate::error::ModelError;
use crate::expr::{AnyExpr, BoolExpr, GAnyExpr, IntExpr};
use crate::modeller::vartable::{ProtoTable, VarMap};
use crate::types::{Ty, TypedName};
use crate::var::Var;
use crate::view::{Func, Multiset, VFunc};

/// An identifier's declared type, without committing to a particular
/// expected type — needed to discover the shared operand type of `==`/`!=`
/// before either side is checked (spec.md §4.5: "symbols type-check to
/// whatever the context expects", so only the non-symbol side can anchor
/// the comparison).
fn natural_ty(e: &ast::Expr, vars: &VarMap) -> Option<Ty> {
    use ast::Expr::*;
    match e {
        IntLit(_) | Add(_) | Sub(_) | Mul(_) | Div(..) => Some(Ty::Int),
        BoolLit(_) | And(_) | Or(_) | Not(_) | Implies(..) | Eq(..) | Ne(..) | Gt(..) | Lt(..) | Ge(..)
        | Le(..) => Some(Ty::Bool),
        Ident(name) => vars.lookup(*name).ok().map(|(ty, _)| ty),
        SymbolCall(..) => None,
    }
}

fn mismatch(expected: Ty, got: &str, location: &str) -> ModelError {
    ModelError::TypeMismatch { expected: expected.to_string(), got: got.to_string(), location: location.to_string() }
}

pub fn check_any(e: &ast::Expr, expected: Ty, vars: &VarMap) -> Result<AnyExpr, ModelError> {
    match expected {
        Ty::Int => check_int(e, vars).map(GAnyExpr::Int),
        Ty::Bool => check_bool(e, vars).map(GAnyExpr::Bool),
    }
}

pub fn check_int(e: &ast::Expr, vars: &VarMap) -> Result<IntExpr, ModelError> {
    use ast::Expr::*;
    match e {
        IntLit(n) => Ok(IntExpr::lit(*n)),
        Ident(name) => {
            let (ty, scope) = vars.lookup(*name)?;
            if ty != Ty::Int {
                return Err(mismatch(Ty::Int, &ty.to_string(), "identifier"));
            }
            Ok(IntExpr::var(Var::new(Ty::Int, *name, scope)))
        }
        SymbolCall(name, args) => Ok(IntExpr::symbol(*name, check_args(args, vars)?)),
        Add(xs) => Ok(IntExpr::add(check_int_list(xs, vars)?)),
        Sub(xs) => Ok(IntExpr::sub(check_int_list(xs, vars)?)),
        Mul(xs) => Ok(IntExpr::mul(check_int_list(xs, vars)?)),
        Div(a, b) => Ok(IntExpr::div(check_int(a, vars)?, check_int(b, vars)?)),
        other => Err(mismatch(Ty::Int, &format!("{:?}", other), "expression")),
    }
}

fn check_int_list(xs: &[ast::Expr], vars: &VarMap) -> Result<Vec<IntExpr>, ModelError> {
    xs.iter().map(|x| check_int(x, vars)).collect()
}

pub fn check_bool(e: &ast::Expr, vars: &VarMap) -> Result<BoolExpr, ModelError> {
    use ast::Expr::*;
    match e {
        BoolLit(b) => Ok(BoolExpr::lit(*b)),
        Ident(name) => {
            let (ty, scope) = vars.lookup(*name)?;
            if ty != Ty::Bool {
                return Err(mismatch(Ty::Bool, &ty.to_string(), "identifier"));
            }
            Ok(BoolExpr::var(Var::new(Ty::Bool, *name, scope)))
        }
        SymbolCall(name, args) => Ok(BoolExpr::symbol(*name, check_args(args, vars)?)),
        And(xs) => Ok(BoolExpr::and(check_bool_list(xs, vars)?)),
        Or(xs) => Ok(BoolExpr::or(check_bool_list(xs, vars)?)),
        Not(x) => Ok(BoolExpr::not(check_bool(x, vars)?)),
        Implies(a, b) => Ok(BoolExpr::implies(check_bool(a, vars)?, check_bool(b, vars)?)),
        Eq(a, b) => check_eq(a, b, vars),
        Ne(a, b) => Ok(BoolExpr::not(check_eq(a, b, vars)?)),
        Gt(a, b) => Ok(BoolExpr::gt(check_int(a, vars)?, check_int(b, vars)?)),
        Lt(a, b) => Ok(BoolExpr::lt(check_int(a, vars)?, check_int(b, vars)?)),
        Ge(a, b) => Ok(BoolExpr::ge(check_int(a, vars)?, check_int(b, vars)?)),
        Le(a, b) => Ok(BoolExpr::le(check_int(a, vars)?, check_int(b, vars)?)),
        other => Err(mismatch(Ty::Bool, &format!("{:?}", other), "expression")),
    }
}

fn check_bool_list(xs: &[ast::Expr], vars: &VarMap) -> Result<Vec<BoolExpr>, ModelError> {
    xs.iter().map(|x| check_bool(x, vars)).collect()
}

/// Exposed to `modeller::body` for a standalone symbol-call statement's
/// top-level arguments, which face the same type-anchoring ambiguity as a
/// nested symbol call's arguments.
pub(crate) fn check_args(args: &[ast::Expr], vars: &VarMap) -> Result<Vec<AnyExpr>, ModelError> {
    args.iter()
        .map(|a| match natural_ty(a, vars) {
            Some(ty) => check_any(a, ty, vars),
            // A bare symbol call nested as another symbol's argument has no
            // anchoring type; default to Int (documented in DESIGN.md).
            None => check_any(a, Ty::Int, vars),
        })
        .collect()
}

/// `a == b` / `a != b`: neither side has an expected type up front, so the
/// non-symbol side (if any) anchors the comparison's type; if both sides are
/// bare symbol calls, default to `Int` (spec.md §3 "Expressions": symbols
/// "type-check to whatever the context expects").
fn check_eq(a: &ast::Expr, b: &ast::Expr, vars: &VarMap) -> Result<BoolExpr, ModelError> {
    let ty = natural_ty(a, vars).or_else(|| natural_ty(b, vars)).unwrap_or(Ty::Int);
    let ea = check_any(a, ty, vars)?;
    let eb = check_any(b, ty, vars)?;
    Ok(BoolExpr::eq(ea, eb))
}

/// Resolves a source-level view pattern (as it occurs inside a method body)
/// into its `CView` normal form, leaving nested `if`-views as `CFunc::Ite`
/// (spec.md §4.5 responsibility 5).
pub fn pattern_to_cview(pat: &ViewPattern, vars: &VarMap, protos: &ProtoTable) -> Result<CView, ModelError> {
    match pat {
        ViewPattern::Emp => Ok(Multiset::new()),
        ViewPattern::Func(name, args) => {
            let param_tys = protos
                .get(*name)
                .ok_or(ModelError::UnknownIdentifier(*name))?
                .to_vec();
            if param_tys.len() != args.len() {
                return Err(ModelError::ArityMismatch { proto: *name, expected: param_tys.len(), got: args.len() });
            }
            let params = args
                .iter()
                .zip(param_tys.iter())
                .map(|(a, ty)| check_any(a, *ty, vars))
                .collect::<Result<Vec<_>, _>>()?;
            let f: VFunc = Func::new(*name, params);
            Ok(Multiset::singleton(CFunc::plain(f)))
        }
        ViewPattern::Star(lhs, rhs) => {
            let l = pattern_to_cview(lhs, vars, protos)?;
            let r = pattern_to_cview(rhs, vars, protos)?;
            Ok(l.union(r))
        }
        ViewPattern::Iter(mult, inner) => {
            // `iter[n] v` denotes `n` copies of each element of `v`; since
            // `CView` is a multiset with integer multiplicities, a constant
            // `n` can be laid out directly, while a symbolic `n` is left as
            // a single `Ite`-free copy wrapped by a `search`-style marker
            // is out of scope (the core only normalises constant repeats
            // inside `DView`, spec.md §4.2) — here we require a literal so
            // the multiset can actually be built.
            let inner_cview = pattern_to_cview(inner, vars, protos)?;
            let n = match check_int(mult, vars)? {
                IntExpr::Lit(n) if n >= 0 => n as u32,
                _ => {
                    return Err(ModelError::TypeMismatch {
                        expected: "a non-negative integer literal".to_string(),
                        got: "a non-constant multiplicity".to_string(),
                        location: "iter[...] inside a method body view assertion".to_string(),
                    })
                }
            };
            let mut out = Multiset::new();
            for (item, mult) in inner_cview.to_vec() {
                out.insert(item, mult * n);
            }
            Ok(out)
        }
        ViewPattern::If(cond, then_v, else_v) => {
            let cond = check_bool(cond, vars)?;
            let then_cview = pattern_to_cview(then_v, vars, protos)?;
            let else_cview = pattern_to_cview(else_v, vars, protos)?;
            Ok(Multiset::singleton(CFunc::ite(cond, then_cview, else_cview)))
        }
    }
}

/// Resolves a constraint's view pattern into a `DView` signature: every
/// `Func` argument must be a bare identifier naming the bound parameter
/// (spec.md §4.5 responsibility 3: "type-check every constraint's view
/// signature against the prototype table").
pub fn pattern_to_dview(
    pat: &ViewPattern,
    protos: &ProtoTable,
) -> Result<Vec<crate::view::Iterated<crate::view::DFunc>>, ModelError> {
    use crate::view::Iterated;
    match pat {
        ViewPattern::Emp => Ok(Vec::new()),
        ViewPattern::Func(name, args) => {
            let param_tys = protos.get(*name).ok_or(ModelError::UnknownIdentifier(*name))?.to_vec();
            if param_tys.len() != args.len() {
                return Err(ModelError::ArityMismatch { proto: *name, expected: param_tys.len(), got: args.len() });
            }
            let params = args
                .iter()
                .zip(param_tys.iter())
                .map(|(a, ty)| match a {
                    ast::Expr::Ident(n) => Ok(TypedName::new(*ty, *n)),
                    _ => Err(ModelError::TypeMismatch {
                        expected: "a bound parameter name".to_string(),
                        got: "a non-identifier expression".to_string(),
                        location: "view-definition pattern".to_string(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(vec![Iterated::single(Func::new(*name, params))])
        }
        ViewPattern::Star(lhs, rhs) => {
            let mut l = pattern_to_dview(lhs, protos)?;
            l.extend(pattern_to_dview(rhs, protos)?);
            Ok(l)
        }
        ViewPattern::Iter(mult, inner) => {
            let inner_dview = pattern_to_dview(inner, protos)?;
            let k = match mult {
                ast::Expr::IntLit(n) => IntExpr::lit(*n),
                ast::Expr::Ident(name) => IntExpr::var(Var::new(Ty::Int, *name, crate::var::Scope::Thread)),
                _ => {
                    return Err(ModelError::TypeMismatch {
                        expected: "an integer literal or bound name".to_string(),
                        got: "a compound expression".to_string(),
                        location: "iter[...] in a view-definition pattern".to_string(),
                    })
                }
            };
            Ok(inner_dview.into_iter().map(|it| crate::view::normalise(it, k.clone())).collect())
        }
        ViewPattern::If(..) => Err(ModelError::TypeMismatch {
            expected: "an unconditional view-definition pattern".to_string(),
            got: "an if/then/else view".to_string(),
            location: "view-definition pattern".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;
    use std::collections::HashMap;

    fn empty_vars() -> (HashMap<Symbol, Ty>, HashMap<Symbol, Ty>) {
        (HashMap::new(), HashMap::new())
    }

    use crate::intern::Symbol;

    #[test]
    fn arithmetic_checks_as_int() {
        let (g, l) = empty_vars();
        let vars = VarMap::new(&g, &l);
        let e = ast::Expr::Add(vec![ast::Expr::IntLit(1), ast::Expr::IntLit(2)]);
        assert_eq!(check_int(&e, &vars).unwrap(), IntExpr::add(vec![IntExpr::lit(1), IntExpr::lit(2)]));
    }

    #[test]
    fn identifier_with_wrong_type_is_a_mismatch() {
        let mut interner = Interner::new();
        let mut g = HashMap::new();
        let name = interner.intern("flag");
        g.insert(name, Ty::Bool);
        let l = HashMap::new();
        let vars = VarMap::new(&g, &l);
        let e = ast::Expr::Ident(name);
        assert!(check_int(&e, &vars).is_err());
    }

    #[test]
    fn equality_anchors_on_the_non_symbol_operand() {
        let (g, l) = empty_vars();
        let vars = VarMap::new(&g, &l);
        let e = ast::Expr::Eq(Box::new(ast::Expr::IntLit(1)), Box::new(ast::Expr::IntLit(1)));
        assert!(matches!(check_bool(&e, &vars), Ok(BoolExpr::Eq(..))));
    }

    #[test]
    fn emp_pattern_is_an_empty_cview() {
        let (g, l) = empty_vars();
        let vars = VarMap::new(&g, &l);
        let protos = ProtoTable(HashMap::new());
        let cview = pattern_to_cview(&ViewPattern::Emp, &vars, &protos).unwrap();
        assert!(cview.is_empty());
    }

    #[test]
    fn func_pattern_checks_arity_against_prototype() {
        let mut interner = Interner::new();
        let (g, l) = empty_vars();
        let vars = VarMap::new(&g, &l);
        let name = interner.intern("holdLock");
        let mut protos = HashMap::new();
        protos.insert(name, vec![]);
        let protos = ProtoTable(protos);
        let cview = pattern_to_cview(&ViewPattern::Func(name, vec![]), &vars, &protos).unwrap();
        assert_eq!(cview.len(), 1);
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let mut interner = Interner::new();
        let (g, l) = empty_vars();
        let vars = VarMap::new(&g, &l);
        let name = interner.intern("holdTick");
        let mut protos = HashMap::new();
        protos.insert(name, vec![Ty::Int]);
        let protos = ProtoTable(protos);
        let result = pattern_to_cview(&ViewPattern::Func(name, vec![]), &vars, &protos);
        assert!(matches!(result, Err(ModelError::ArityMismatch { .. })));
    }

    #[test]
    fn if_view_pattern_becomes_an_ite_cfunc() {
        let mut interner = Interner::new();
        let (g, l) = empty_vars();
        let vars = VarMap::new(&g, &l);
        let lock = interner.intern("holdLock");
        let tick = interner.intern("holdTick");
        let mut protos = HashMap::new();
        protos.insert(lock, vec![]);
        protos.insert(tick, vec![]);
        let protos = ProtoTable(protos);
        let pat = ViewPattern::If(
            ast::Expr::BoolLit(true),
            Box::new(ViewPattern::Func(lock, vec![])),
            Box::new(ViewPattern::Func(tick, vec![])),
        );
        let cview = pattern_to_cview(&pat, &vars, &protos).unwrap();
        let (item, n) = &cview.to_vec()[0];
        assert_eq!(*n, 1);
        assert!(matches!(item, CFunc::Ite(..)));
    }
}
