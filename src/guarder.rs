//! Transforms every `CView` produced by the Modeller into a `GView`,
//! expanding `Ite` CFuncs into guards distributed over their leaves
//! (spec.md §4.6 "Guarder").
//!
//! The conditional-expansion itself reuses `gview::guard_all`/`canonicalize`
//! — this module only walks the `CFunc` tree and the `PartCmd`/`Model`
//! shapes that wrap it.

use crate::command::{Block, PartCmd};
use crate::cview::{CFunc, CView};
use crate::expr::BoolExpr;
use crate::gview::{canonicalize, GFunc, GView};
use crate::model::Model;
use crate::view::Multiset;
use crate::viewdef::ViewExpr;

/// Expands a single `CView` under the current accumulated guard (`true` at
/// the top level) into a `GView`, recursing through nested `Ite`s
/// (spec.md §4.6: "every func in `t` guarded with `b ∧ current-guard`,
/// unioned with every func in `e` guarded with `¬b ∧ current-guard`,
/// recursively").
fn expand(cv: &CView, guard: &BoolExpr) -> GView {
    let mut out = GView::new();
    for (cfunc, n) in cv.iter() {
        let expanded = match cfunc {
            CFunc::Plain(f) => {
                let mut m = GView::new();
                m.insert(GFunc::new(guard.clone(), f.clone()), *n);
                m
            }
            CFunc::Ite(cond, then_view, else_view) => {
                let not_cond = BoolExpr::not(cond.clone());
                let (then_guard, else_guard) = if matches!(guard, BoolExpr::Lit(true)) {
                    (cond.clone(), not_cond)
                } else {
                    (
                        BoolExpr::and(vec![guard.clone(), cond.clone()]),
                        BoolExpr::and(vec![guard.clone(), not_cond]),
                    )
                };
                let merged = expand(then_view, &then_guard).union(expand(else_view, &else_guard));
                // `n` copies of a conditional view each contribute one copy
                // of both branches' expansions.
                let mut scaled = GView::new();
                for (gf, m) in merged.to_vec() {
                    scaled.insert(gf, m * n);
                }
                scaled
            }
        };
        out = out.union(expanded);
    }
    out
}

fn guard_view(cv: &CView) -> GView {
    canonicalize(expand(cv, &BoolExpr::lit(true)))
}

fn guard_view_expr(ve: &ViewExpr<CView>) -> ViewExpr<GView> {
    ViewExpr { kind: ve.kind, view: guard_view(&ve.view) }
}

fn guard_part_cmd(cmd: &PartCmd<CView>) -> PartCmd<GView> {
    match cmd {
        PartCmd::Prim(f) => PartCmd::Prim(f.clone()),
        PartCmd::Seq(cmd) => PartCmd::Seq(cmd.clone()),
        PartCmd::While { is_do_while, cond, inner } => PartCmd::While {
            is_do_while: *is_do_while,
            cond: cond.clone(),
            inner: Box::new(guard_block(inner)),
        },
        PartCmd::ITE { cond, then_branch, else_branch } => PartCmd::ITE {
            cond: cond.clone(),
            then_branch: Box::new(guard_block(then_branch)),
            else_branch: Box::new(guard_block(else_branch)),
        },
    }
}

/// Transforms one method's `Block<CView>` into a `Block<GView>`.
pub fn guard_block(block: &Block<CView>) -> Block<GView> {
    let views = block.views.iter().map(guard_view_expr).collect();
    let steps = block.steps.iter().map(guard_part_cmd).collect();
    Block::new(views, steps)
}

/// Runs the Guarder over an entire `Model`, leaving `semantics` and
/// `view_defs` untouched (they are not expressed in terms of `CView`).
pub fn guard(model: Model<Block<CView>, crate::viewdef::ViewDef>) -> Model<Block<GView>, crate::viewdef::ViewDef> {
    let mut out: Model<Block<GView>, crate::viewdef::ViewDef> = Model::empty();
    out.globals = model.globals;
    out.locals = model.locals;
    out.semantics = model.semantics;
    out.view_defs = model.view_defs;
    for (name, block) in model.axioms {
        out.insert_axiom(name, guard_block(&block));
    }
    out
}
