//! Lowers a method's surface `ast::Block` into a `command::Block<CView>`
//! (spec.md §4.5 responsibility 5).
//!
//! Every `AtomicStmt` becomes a call to one of the fixed primitives built by
//! `modeller::semantics`; `if`/`while` become the matching `PartCmd`
//! variant, recursing into their nested blocks; every `ViewPattern` becomes
//! a `CView` via `typecheck::pattern_to_cview`, wrapped `mandatory` (there is
//! no surface syntax for an advisory view assertion — see DESIGN.md).
//!
//! A multi-statement atomic block (`<{ s1; s2; … }>`) does not fit the
//! single-`VFunc` shape of `PartCmd::Prim`; it is lowered instead to a
//! single `PartCmd::Seq` carrying one composed `Command` (spec.md §3
//! "Command"), so the whole bracket remains one atomic step — one graph
//! edge, not one per statement. Each statement's call site is marked to its
//! place in the sequence: the first statement's reads use `Before`, the
//! last statement's writes use `After`, and every internal boundary between
//! them uses `Intermediate(k)` (spec.md §3 "Variables").

use crate::ast::{self, AtomicStmt, FetchMode, Stmt};
use crate::command::{Block, Command, CommandType, PartCmd};
use crate::cview::CView;
use crate::error::ModelError;
use crate::expr::{mark_any, GAnyExpr};
use crate::intern::Symbol;
use crate::modeller::semantics::PrimNames;
use crate::modeller::typecheck::{self, pattern_to_cview};
use crate::modeller::vartable::{ProtoTable, VarMap};
use crate::types::Ty;
use crate::var::{Mark, Var};
use crate::view::{Func, VFunc};
use crate::viewdef::ViewExpr;

fn ident_ty(name: Symbol, vars: &VarMap) -> Result<Ty, ModelError> {
    vars.lookup(name).map(|(ty, _)| ty)
}

fn ident_expr(name: Symbol, ty: Ty, vars: &VarMap) -> Result<crate::expr::AnyExpr, ModelError> {
    typecheck::check_any(&ast::Expr::Ident(name), ty, vars)
}

/// Resolves one `AtomicStmt` to its `VFunc` call against the fixed
/// semantics table (spec.md §4.5: "every atomic step ... is reduced to a
/// call to one such primitive").
fn atomic_to_vfunc(stmt: &AtomicStmt, names: &PrimNames, vars: &VarMap) -> Result<VFunc, ModelError> {
    match stmt {
        AtomicStmt::Assign { dest, expr, .. } => {
            let ty = ident_ty(*dest, vars)?;
            let dest_expr = ident_expr(*dest, ty, vars)?;
            let val_expr = typecheck::check_any(expr, ty, vars)?;
            let name = match ty {
                Ty::Int => names.store_int,
                Ty::Bool => names.store_bool,
            };
            Ok(Func::new(name, vec![dest_expr, val_expr]))
        }
        AtomicStmt::Fetch { dest, src, mode, .. } => {
            let dest_ty = ident_ty(*dest, vars)?;
            let src_ty = ident_ty(*src, vars)?;
            if dest_ty != src_ty {
                return Err(ModelError::TypeMismatch {
                    expected: dest_ty.to_string(),
                    got: src_ty.to_string(),
                    location: "fetch statement (destination and source must agree)".to_string(),
                });
            }
            let name = match (mode, dest_ty) {
                (FetchMode::Direct, Ty::Int) => names.load_int,
                (FetchMode::Direct, Ty::Bool) => names.load_bool,
                (FetchMode::Increment, Ty::Int) => names.incr_int,
                (FetchMode::Decrement, Ty::Int) => names.decr_int,
                (FetchMode::Increment, Ty::Bool) | (FetchMode::Decrement, Ty::Bool) => {
                    return Err(ModelError::BadAtomicBlock(
                        "increment/decrement fetch requires an int source and destination".to_string(),
                    ));
                }
            };
            let dest_expr = ident_expr(*dest, dest_ty, vars)?;
            let src_expr = ident_expr(*src, dest_ty, vars)?;
            Ok(Func::new(name, vec![dest_expr, src_expr]))
        }
        AtomicStmt::Cas { dest, test, set, .. } => {
            let dest_ty = ident_ty(*dest, vars)?;
            let test_ty = ident_ty(*test, vars)?;
            if dest_ty != test_ty {
                return Err(ModelError::TypeMismatch {
                    expected: dest_ty.to_string(),
                    got: test_ty.to_string(),
                    location: "cas statement (destination and test must agree)".to_string(),
                });
            }
            let name = match dest_ty {
                Ty::Int => names.cas_int,
                Ty::Bool => names.cas_bool,
            };
            let dest_expr = ident_expr(*dest, dest_ty, vars)?;
            let test_expr = ident_expr(*test, dest_ty, vars)?;
            let set_expr = typecheck::check_any(set, dest_ty, vars)?;
            Ok(Func::new(name, vec![dest_expr, test_expr, set_expr]))
        }
        AtomicStmt::Skip { .. } => Ok(Func::new(names.skip, vec![])),
        AtomicStmt::Assume { cond, .. } => {
            let b = typecheck::check_bool(cond, vars)?;
            Ok(Func::new(names.assume, vec![GAnyExpr::Bool(b)]))
        }
        AtomicStmt::SymbolCall { name, args, .. } => {
            let params = typecheck::check_args(args, vars)?;
            Ok(Func::new(*name, params))
        }
    }
}

/// The variables a statement's primitive call writes into — the `results`
/// of its `CommandType` (spec.md §3 "CommandType"). `Skip`/`Assume`/a bare
/// symbol call write nothing.
fn stmt_results(stmt: &AtomicStmt, vars: &VarMap) -> Result<Vec<Var>, ModelError> {
    match stmt {
        AtomicStmt::Assign { dest, .. } | AtomicStmt::Fetch { dest, .. } => {
            let (ty, scope) = vars.lookup(*dest)?;
            Ok(vec![Var::new(ty, *dest, scope)])
        }
        AtomicStmt::Cas { dest, test, .. } => {
            let (dest_ty, dest_scope) = vars.lookup(*dest)?;
            let (test_ty, test_scope) = vars.lookup(*test)?;
            Ok(vec![Var::new(dest_ty, *dest, dest_scope), Var::new(test_ty, *test, test_scope)])
        }
        AtomicStmt::Skip { .. } | AtomicStmt::Assume { .. } | AtomicStmt::SymbolCall { .. } => Ok(Vec::new()),
    }
}

/// Lowers one statement of a multi-statement atomic bracket to a
/// `CommandType`, marking its call site to its place in the sequence:
/// `index == 0` reads `Before`, `index == last` writes `After`, and every
/// other boundary is `Intermediate(k)` (spec.md §3 "Variables":
/// "Intermediate(k): the k-th internal step of a composed command").
fn atomic_to_command_type(
    stmt: &AtomicStmt,
    names: &PrimNames,
    vars: &VarMap,
    index: usize,
    last: usize,
) -> Result<CommandType, ModelError> {
    let f = atomic_to_vfunc(stmt, names, vars)?;
    let pre_mark = if index == 0 { Mark::Before } else { Mark::Intermediate(index as u32 - 1) };
    let post_mark = if index == last { Mark::After } else { Mark::Intermediate(index as u32) };
    let params = f.params.iter().map(|p| mark_any(p, pre_mark)).collect();
    let results = stmt_results(stmt, vars)?.into_iter().map(|v| v.with_mark(post_mark)).collect();
    Ok(CommandType { results, name: f.name, params })
}

/// An atomic bracket's statements, lowered to a single step: `Prim` for one
/// statement (no composition needed), `Seq` of a composed `Command` for
/// more than one (see module docs).
fn atomic_block_to_steps(
    stmts: &[AtomicStmt],
    names: &PrimNames,
    vars: &VarMap,
) -> Result<Vec<PartCmd<CView>>, ModelError> {
    if stmts.is_empty() {
        return Err(ModelError::BadAtomicBlock("an atomic block must contain at least one statement".to_string()));
    }
    if stmts.len() == 1 {
        let f = atomic_to_vfunc(&stmts[0], names, vars)?;
        return Ok(vec![PartCmd::Prim(f)]);
    }
    let last = stmts.len() - 1;
    let command: Command = stmts
        .iter()
        .enumerate()
        .map(|(i, stmt)| atomic_to_command_type(stmt, names, vars, i, last))
        .collect::<Result<_, _>>()?;
    Ok(vec![PartCmd::Seq(command)])
}

/// Walks one surface `ast::Block`, producing a `command::Block<CView>`
/// whose view assertions and steps alternate per-statement; a multi-statement
/// atomic bracket still contributes exactly one step (`PartCmd::Seq`), so it
/// never needs an interior view of its own.
pub fn build(block: &ast::Block, names: &PrimNames, vars: &VarMap, protos: &ProtoTable) -> Result<Block<CView>, ModelError> {
    if !block.is_well_formed() {
        return Err(ModelError::BadAtomicBlock("block views and steps are out of alignment".to_string()));
    }
    let mut views = Vec::new();
    let mut steps = Vec::new();
    views.push(ViewExpr::mandatory(pattern_to_cview(&block.views[0], vars, protos)?));
    for (stmt, next_view) in block.steps.iter().zip(block.views[1..].iter()) {
        match stmt {
            Stmt::Atomic(atomic_stmts) => {
                let inner_steps = atomic_block_to_steps(atomic_stmts, names, vars)?;
                steps.extend(inner_steps);
            }
            Stmt::If { cond, then_branch, else_branch, .. } => {
                let cond = typecheck::check_bool(cond, vars)?;
                let then_block = build(then_branch, names, vars, protos)?;
                let else_block = build(else_branch, names, vars, protos)?;
                steps.push(PartCmd::ITE {
                    cond,
                    then_branch: Box::new(then_block),
                    else_branch: Box::new(else_block),
                });
            }
            Stmt::While { is_do_while, cond, body, .. } => {
                let cond = typecheck::check_bool(cond, vars)?;
                let inner = build(body, names, vars, protos)?;
                steps.push(PartCmd::While { is_do_while: *is_do_while, cond, inner: Box::new(inner) });
            }
        }
        views.push(ViewExpr::mandatory(pattern_to_cview(next_view, vars, protos)?));
    }
    Ok(Block::new(views, steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;
    use crate::parser::parse;
    use crate::span::Span;
    use crate::var::Scope;
    use std::collections::HashMap;

    fn vars_for<'a>(globals: &'a HashMap<Symbol, Ty>, locals: &'a HashMap<Symbol, Ty>) -> VarMap<'a> {
        VarMap::new(globals, locals)
    }

    #[test]
    fn skip_statement_lowers_to_the_skip_primitive() {
        let mut interner = Interner::new();
        let (names, _) = crate::modeller::semantics::table(&mut interner);
        let globals = HashMap::new();
        let locals = HashMap::new();
        let vars = vars_for(&globals, &locals);
        let protos = ProtoTable(HashMap::new());
        let src = "method lock() { {| emp |} < skip > {| emp |} }";
        let items = parse(src, &mut interner).unwrap();
        let method = match &items[0] {
            ast::ScriptItem::Method(m) => m,
            _ => panic!("expected a method"),
        };
        let built = build(&method.body, &names, &vars, &protos).unwrap();
        assert_eq!(built.steps.len(), 1);
        match &built.steps[0] {
            PartCmd::Prim(f) => assert_eq!(f.name, names.skip),
            _ => panic!("expected a Prim step"),
        }
    }

    #[test]
    fn store_statement_picks_the_typed_primitive() {
        let mut interner = Interner::new();
        let (names, _) = crate::modeller::semantics::table(&mut interner);
        let mut globals = HashMap::new();
        let ticket = interner.intern("ticket");
        globals.insert(ticket, Ty::Int);
        let locals = HashMap::new();
        let vars = vars_for(&globals, &locals);
        let protos = ProtoTable(HashMap::new());
        let src = "method bump() { {| emp |} < ticket = 1 > {| emp |} }";
        let items = parse(src, &mut interner).unwrap();
        let method = match &items[0] {
            ast::ScriptItem::Method(m) => m,
            _ => panic!("expected a method"),
        };
        let built = build(&method.body, &names, &vars, &protos).unwrap();
        match &built.steps[0] {
            PartCmd::Prim(f) => assert_eq!(f.name, names.store_int),
            _ => panic!("expected a Prim step"),
        }
    }

    #[test]
    fn multi_statement_atomic_block_becomes_one_seq_step() {
        let mut interner = Interner::new();
        let (names, _) = crate::modeller::semantics::table(&mut interner);
        let mut globals = HashMap::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        globals.insert(a, Ty::Int);
        globals.insert(b, Ty::Int);
        let locals = HashMap::new();
        let vars = vars_for(&globals, &locals);
        let protos = ProtoTable(HashMap::new());
        let src = "method both() { {| emp |} <{ a = 1; b = 2; }> {| emp |} }";
        let items = parse(src, &mut interner).unwrap();
        let method = match &items[0] {
            ast::ScriptItem::Method(m) => m,
            _ => panic!("expected a method"),
        };
        let built = build(&method.body, &names, &vars, &protos).unwrap();
        assert_eq!(built.steps.len(), 1);
        assert_eq!(built.views.len(), 2);
        match &built.steps[0] {
            PartCmd::Seq(cmd) => {
                assert_eq!(cmd.len(), 2);
                assert_eq!(cmd[0].name, names.store_int);
                assert_eq!(cmd[0].results[0].mark, Mark::Intermediate(0));
                assert_eq!(cmd[1].name, names.store_int);
                assert_eq!(cmd[1].results[0].mark, Mark::After);
                // the second statement's own params read the Intermediate(0)
                // state the first statement's result was marked with.
                let GAnyExpr::Int(crate::expr::GIntExpr::Lit(_)) = &cmd[1].params[1] else {
                    panic!("expected the literal value param to survive marking unchanged");
                };
            }
            _ => panic!("expected a Seq step"),
        }
    }

    #[test]
    fn if_statement_lowers_to_ite_with_both_branches_built() {
        let mut interner = Interner::new();
        let (names, _) = crate::modeller::semantics::table(&mut interner);
        let mut globals = HashMap::new();
        let flag = interner.intern("flag");
        globals.insert(flag, Ty::Bool);
        let locals = HashMap::new();
        let vars = vars_for(&globals, &locals);
        let protos = ProtoTable(HashMap::new());
        let src = "method branch() { {| emp |} if (flag) { {| emp |} < skip > {| emp |} } \
                   else { {| emp |} < skip > {| emp |} } {| emp |} }";
        let items = parse(src, &mut interner).unwrap();
        let method = match &items[0] {
            ast::ScriptItem::Method(m) => m,
            _ => panic!("expected a method"),
        };
        let built = build(&method.body, &names, &vars, &protos).unwrap();
        assert_eq!(built.steps.len(), 1);
        assert!(matches!(&built.steps[0], PartCmd::ITE { .. }));
        let _ = Span::new(0, 0);
        let _ = Scope::Shared;
    }
}
