//! Structured commands: the shape method bodies take once the Modeller
//! has resolved atomic steps to primitive calls, before the Grapher
//! flattens them into a control-flow graph (spec.md §3 "Commands").
//!
//! `Block`/`PartCmd`/`Axiom` are generic over the view representation in
//! play: the Modeller builds `Block<CView>`, the Guarder rewrites it to
//! `Block<GView>`, and only the Grapher consumes the latter into a
//! `Graph` that no longer has this shape at all.

use crate::expr::AnyExpr;
use crate::intern::Symbol;
use crate::var::Var;
use crate::view::VFunc;
use crate::viewdef::ViewExpr;

/// A single call to a recognised atomic primitive: which variables receive
/// the result, the primitive's name, and its argument expressions
/// (spec.md §3 "CommandType").
#[derive(Debug, Clone, PartialEq)]
pub struct CommandType {
    pub results: Vec<Var>,
    pub name: Symbol,
    pub params: Vec<AnyExpr>,
}

/// Sequential composition of primitive calls.
pub type Command = Vec<CommandType>;

/// A structured command: a primitive step, or one of the two control-flow
/// forms the source language exposes (spec.md §3 "PartCmd").
#[derive(Debug, Clone, PartialEq)]
pub enum PartCmd<Vw> {
    Prim(VFunc),
    /// A multi-statement atomic block (`<{ s1; s2; … }>`): one sequentially
    /// composed `Command` carried as a single step, so it becomes one
    /// atomic edge rather than one edge per statement (spec.md §3
    /// "Command"; §4.7 "Prim(cmd): single edge").
    Seq(Command),
    While {
        is_do_while: bool,
        cond: crate::expr::BoolExpr,
        inner: Box<Block<Vw>>,
    },
    ITE {
        cond: crate::expr::BoolExpr,
        then_branch: Box<Block<Vw>>,
        else_branch: Box<Block<Vw>>,
    },
}

/// `{v0} s1 {v1} s2 … sn {vn}` — views and structured commands alternate,
/// so `views.len() == steps.len() + 1` always holds (spec.md §3 "block").
#[derive(Debug, Clone, PartialEq)]
pub struct Block<Vw> {
    pub views: Vec<ViewExpr<Vw>>,
    pub steps: Vec<PartCmd<Vw>>,
}

impl<Vw> Block<Vw> {
    pub fn new(views: Vec<ViewExpr<Vw>>, steps: Vec<PartCmd<Vw>>) -> Self {
        debug_assert_eq!(views.len(), steps.len() + 1, "block must alternate view, step, view, …");
        Block { views, steps }
    }

    pub fn entry_view(&self) -> &ViewExpr<Vw> {
        &self.views[0]
    }

    pub fn exit_view(&self) -> &ViewExpr<Vw> {
        self.views.last().expect("block always has at least one view")
    }

    pub fn is_well_formed(&self) -> bool {
        self.views.len() == self.steps.len() + 1
    }
}

/// What an axiom's command slot may hold: a single atomic step, or a
/// sequentially-composed run of primitive calls (spec.md §3 "Axiom").
#[derive(Debug, Clone, PartialEq)]
pub enum AxiomCmd {
    Prim(VFunc),
    Seq(Command),
}

/// A Hoare triple over views (spec.md §3 "Axiom").
#[derive(Debug, Clone, PartialEq)]
pub struct Axiom<Vw> {
    pub pre: ViewExpr<Vw>,
    pub cmd: AxiomCmd,
    pub post: ViewExpr<Vw>,
}

impl<Vw> Axiom<Vw> {
    pub fn new(pre: ViewExpr<Vw>, cmd: AxiomCmd, post: ViewExpr<Vw>) -> Self {
        Axiom { pre, cmd, post }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;
    use crate::view::{Func, View};

    #[test]
    fn block_with_one_step_has_two_views() {
        let mut interner = Interner::new();
        let name = interner.intern("holdLock");
        let f: VFunc = Func::new(name, vec![]);
        let v0: ViewExpr<View> = ViewExpr::mandatory(View::new());
        let v1: ViewExpr<View> = ViewExpr::mandatory(View::new());
        let block = Block::new(vec![v0, v1], vec![PartCmd::Prim(f)]);
        assert!(block.is_well_formed());
    }

    #[test]
    fn empty_block_has_exactly_one_view_and_no_steps() {
        let v0: ViewExpr<View> = ViewExpr::mandatory(View::new());
        let block: Block<View> = Block::new(vec![v0], vec![]);
        assert!(block.is_well_formed());
        assert_eq!(block.steps.len(), 0);
    }

    #[test]
    fn entry_and_exit_view_are_first_and_last() {
        let v0: ViewExpr<View> = ViewExpr::mandatory(View::new());
        let v1: ViewExpr<View> = ViewExpr::advisory(View::new());
        let mut interner = Interner::new();
        let name = interner.intern("step");
        let f: VFunc = Func::new(name, vec![]);
        let block = Block::new(vec![v0.clone(), v1.clone()], vec![PartCmd::Prim(f)]);
        assert_eq!(block.entry_view(), &v0);
        assert_eq!(block.exit_view(), &v1);
    }
}
