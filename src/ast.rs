//! The parser's output shape: a sequence of top-level script items, each
//! carrying its own typed-but-unresolved expression trees and a span
//! (spec.md §4.3 "Parser").
//!
//! Names here are plain `Symbol`s rather than `Var`s — scope and marking
//! are assigned later by the Modeller (spec.md §4.5 step 1).

use crate::intern::Symbol;
use crate::span::Span;
use crate::types::Ty;
use crate::var::Scope;

/// A surface-level expression, before name resolution or type-checking.
/// Mirrors the typed trees in `expr.rs` but is untyped and uses bare
/// identifiers in variable position.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLit(i64),
    BoolLit(bool),
    Ident(Symbol),
    SymbolCall(Symbol, Vec<Expr>),
    Add(Vec<Expr>),
    Sub(Vec<Expr>),
    Mul(Vec<Expr>),
    Div(Box<Expr>, Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    Implies(Box<Expr>, Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    Gt(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Ge(Box<Expr>, Box<Expr>),
    Le(Box<Expr>, Box<Expr>),
}

/// A view assertion as written in source: `emp`, a func application, a
/// multiset union (`*`), or `iter[n] v` / `if c then v1 else v2` nested
/// inside the assertion (spec.md §3 "View pattern").
#[derive(Debug, Clone, PartialEq)]
pub enum ViewPattern {
    Emp,
    Func(Symbol, Vec<Expr>),
    Star(Box<ViewPattern>, Box<ViewPattern>),
    Iter(Expr, Box<ViewPattern>),
    If(Expr, Box<ViewPattern>, Box<ViewPattern>),
}

/// A `shared`/`thread` variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub scope: Scope,
    pub ty: Ty,
    pub name: Symbol,
    pub span: Span,
}

/// A `view name(params)` prototype declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewProtoDecl {
    pub name: Symbol,
    pub params: Vec<(Ty, Symbol)>,
    pub span: Span,
}

/// A `constraint <view-pattern> -> <bool-expression>;` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDecl {
    pub pattern: ViewPattern,
    pub body: Expr,
    pub span: Span,
}

/// How a `load`-family atomic step selects its result: a plain read, or a
/// read-modify-write that also increments/decrements the source
/// (spec.md §4.5 "Fetch mode selects direct/increment/decrement").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Direct,
    Increment,
    Decrement,
}

/// A single atomic primitive invocation, the content of a `< … >` bracket
/// (one statement) or an entry in a `<{ … }>` bracket (several,
/// sequentially composed).
#[derive(Debug, Clone, PartialEq)]
pub enum AtomicStmt {
    /// `dest = expr;`
    Assign { dest: Symbol, expr: Expr, span: Span },
    /// `dest = src;` / `dest = src++;` / `dest = src--;`
    Fetch { dest: Symbol, src: Symbol, mode: FetchMode, span: Span },
    /// `CAS(dest, test, set)`
    Cas { dest: Symbol, test: Symbol, set: Expr, span: Span },
    /// `skip;`
    Skip { span: Span },
    /// `assume(b);`
    Assume { cond: Expr, span: Span },
    /// `%{ name }(args);` used as a standalone atomic statement.
    SymbolCall { name: Symbol, args: Vec<Expr>, span: Span },
}

/// A structured statement inside a method body.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `< stmt >` or `<{ s1; s2; … }>`.
    Atomic(Vec<AtomicStmt>),
    If { cond: Expr, then_branch: Block, else_branch: Block, span: Span },
    While { is_do_while: bool, cond: Expr, body: Block, span: Span },
}

/// `{v0} s1 {v1} s2 … sn {vn}` at the AST level: views and statements
/// alternate (spec.md §3 "block").
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub views: Vec<ViewPattern>,
    pub steps: Vec<Stmt>,
}

impl Block {
    pub fn new(views: Vec<ViewPattern>, steps: Vec<Stmt>) -> Self {
        Block { views, steps }
    }

    pub fn is_well_formed(&self) -> bool {
        self.views.len() == self.steps.len() + 1
    }
}

/// A `method name(...) { body }` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: Symbol,
    pub body: Block,
    pub span: Span,
}

/// A single top-level item produced by the parser (spec.md §4.3:
/// "a sequence of ScriptItems — each a global decl, local decl, view
/// prototype, constraint, or method").
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptItem {
    Global(VarDecl),
    Local(VarDecl),
    ViewProto(ViewProtoDecl),
    Constraint(ConstraintDecl),
    Method(MethodDecl),
}

impl ScriptItem {
    pub fn span(&self) -> Span {
        match self {
            ScriptItem::Global(d) | ScriptItem::Local(d) => d.span,
            ScriptItem::ViewProto(d) => d.span,
            ScriptItem::Constraint(d) => d.span,
            ScriptItem::Method(d) => d.span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;

    #[test]
    fn well_formed_block_has_one_more_view_than_step() {
        let block = Block::new(vec![ViewPattern::Emp, ViewPattern::Emp], vec![Stmt::Atomic(vec![])]);
        assert!(block.is_well_formed());
    }

    #[test]
    fn malformed_block_is_detected() {
        let block = Block::new(vec![ViewPattern::Emp], vec![Stmt::Atomic(vec![])]);
        assert!(!block.is_well_formed());
    }

    #[test]
    fn script_item_span_reaches_through_every_variant() {
        let mut interner = Interner::new();
        let name = interner.intern("ticket");
        let span = Span::new(0, 10);
        let item = ScriptItem::Global(VarDecl { scope: Scope::Shared, ty: Ty::Int, name, span });
        assert_eq!(item.span(), span);
    }
}
