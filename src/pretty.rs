//! Internal `Display`-style rendering of the surface AST, back into
//! source text the parser accepts. This exists only so tests can assert
//! "parse, pretty-print, re-parse" round-trips an equivalent tree; it is
//! not part of the public contract and nothing downstream of the parser
//! consumes its output.
//!
//! Every compound expression and view pattern is rendered fully
//! parenthesised. That is more punctuation than a human would write, but
//! it sidesteps re-deriving the parser's precedence table here a second
//! time, and redundant parens are transparent to `primary_expr`/
//! `view_atom`, so the round-trip still holds.

use crate::ast::{AtomicStmt, Block, ConstraintDecl, Expr, FetchMode, MethodDecl, ScriptItem, Stmt, VarDecl, ViewPattern, ViewProtoDecl};
use crate::intern::{Interner, Symbol};
use crate::types::Ty;

fn name(s: Symbol, interner: &Interner) -> &str {
    interner.resolve(s)
}

fn join_exprs(exprs: &[Expr], interner: &Interner) -> String {
    exprs.iter().map(|e| print_expr(e, interner)).collect::<Vec<_>>().join(", ")
}

/// Renders an expression. Every variant but the four primaries (int/bool
/// literal, identifier, symbol call) wraps itself in parens.
pub fn print_expr(e: &Expr, interner: &Interner) -> String {
    match e {
        Expr::IntLit(n) => n.to_string(),
        Expr::BoolLit(b) => b.to_string(),
        Expr::Ident(s) => name(*s, interner).to_string(),
        Expr::SymbolCall(sym, args) => format!("%{{{}}}({})", name(*sym, interner), join_exprs(args, interner)),
        Expr::Add(terms) => parens_join(terms, " + ", interner),
        Expr::Sub(terms) => parens_join(terms, " - ", interner),
        Expr::Mul(terms) => parens_join(terms, " * ", interner),
        Expr::Div(l, r) => format!("({} / {})", print_expr(l, interner), print_expr(r, interner)),
        Expr::And(terms) => parens_join(terms, " && ", interner),
        Expr::Or(terms) => parens_join(terms, " || ", interner),
        Expr::Not(inner) => format!("!({})", print_expr(inner, interner)),
        // No surface syntax produces `Expr::Implies` (the parser only ever
        // uses `->` between a constraint's pattern and its body, not inside
        // expressions); rendered for completeness, not round-trip safety.
        Expr::Implies(a, b) => format!("({} -> {})", print_expr(a, interner), print_expr(b, interner)),
        Expr::Eq(a, b) => format!("({} == {})", print_expr(a, interner), print_expr(b, interner)),
        Expr::Ne(a, b) => format!("({} != {})", print_expr(a, interner), print_expr(b, interner)),
        Expr::Gt(a, b) => format!("({} > {})", print_expr(a, interner), print_expr(b, interner)),
        Expr::Lt(a, b) => format!("({} < {})", print_expr(a, interner), print_expr(b, interner)),
        Expr::Ge(a, b) => format!("({} >= {})", print_expr(a, interner), print_expr(b, interner)),
        Expr::Le(a, b) => format!("({} <= {})", print_expr(a, interner), print_expr(b, interner)),
    }
}

fn parens_join(terms: &[Expr], sep: &str, interner: &Interner) -> String {
    format!("({})", terms.iter().map(|t| print_expr(t, interner)).collect::<Vec<_>>().join(sep))
}

fn print_view_atom_operand(v: &ViewPattern, interner: &Interner) -> String {
    if matches!(v, ViewPattern::Star(..)) {
        format!("({})", print_view_pattern(v, interner))
    } else {
        print_view_pattern(v, interner)
    }
}

pub fn print_view_pattern(v: &ViewPattern, interner: &Interner) -> String {
    match v {
        ViewPattern::Emp => "emp".to_string(),
        ViewPattern::Func(sym, args) => format!("{}({})", name(*sym, interner), join_exprs(args, interner)),
        ViewPattern::Star(l, r) => {
            format!("{} * {}", print_view_atom_operand(l, interner), print_view_atom_operand(r, interner))
        }
        ViewPattern::Iter(mult, inner) => {
            format!("iter[{}] {}", print_expr(mult, interner), print_view_atom_operand(inner, interner))
        }
        ViewPattern::If(cond, then_v, else_v) => format!(
            "if {} then {} else {}",
            print_expr(cond, interner),
            print_view_pattern(then_v, interner),
            print_view_pattern(else_v, interner)
        ),
    }
}

fn print_view_assertion(v: &ViewPattern, interner: &Interner) -> String {
    format!("{{| {} |}}", print_view_pattern(v, interner))
}

fn print_atomic_stmt(s: &AtomicStmt, interner: &Interner) -> String {
    match s {
        AtomicStmt::Assign { dest, expr, .. } => format!("{} = {}", name(*dest, interner), print_expr(expr, interner)),
        AtomicStmt::Fetch { dest, src, mode, .. } => match mode {
            FetchMode::Direct => format!("{} = {}", name(*dest, interner), name(*src, interner)),
            FetchMode::Increment => format!("{} = {}++", name(*dest, interner), name(*src, interner)),
            FetchMode::Decrement => format!("{} = {}--", name(*dest, interner), name(*src, interner)),
        },
        AtomicStmt::Cas { dest, test, set, .. } => {
            format!("CAS({}, {}, {})", name(*dest, interner), name(*test, interner), print_expr(set, interner))
        }
        AtomicStmt::Skip { .. } => "skip".to_string(),
        AtomicStmt::Assume { cond, .. } => format!("assume({})", print_expr(cond, interner)),
        AtomicStmt::SymbolCall { name: sym, args, .. } => {
            format!("%{{{}}}({})", name(*sym, interner), join_exprs(args, interner))
        }
    }
}

/// `< … >` for a single statement, `<{ … }>` for several — the inverse of
/// `parser::Parser::stmt`'s `TokKind::Lt` arm.
fn print_atomic_block(stmts: &[AtomicStmt], interner: &Interner) -> String {
    match stmts {
        [one] => format!("< {} >", print_atomic_stmt(one, interner)),
        many => {
            let body = many.iter().map(|s| format!("{};", print_atomic_stmt(s, interner))).collect::<Vec<_>>().join(" ");
            format!("<{{ {} }}>", body)
        }
    }
}

fn print_stmt(s: &Stmt, interner: &Interner) -> String {
    match s {
        Stmt::Atomic(stmts) => print_atomic_block(stmts, interner),
        Stmt::If { cond, then_branch, else_branch, .. } => format!(
            "if ({}) {{ {} }} else {{ {} }}",
            print_expr(cond, interner),
            print_block(then_branch, interner),
            print_block(else_branch, interner)
        ),
        Stmt::While { is_do_while: true, cond, body, .. } => {
            format!("do {{ {} }} while ({});", print_block(body, interner), print_expr(cond, interner))
        }
        Stmt::While { is_do_while: false, cond, body, .. } => {
            format!("while ({}) {{ {} }}", print_expr(cond, interner), print_block(body, interner))
        }
    }
}

/// `{v0} s1 {v1} s2 … sn {vn}`, the inverse of `parser::Parser::block`.
pub fn print_block(b: &Block, interner: &Interner) -> String {
    let mut parts = vec![print_view_assertion(&b.views[0], interner)];
    for (stmt, view) in b.steps.iter().zip(b.views[1..].iter()) {
        parts.push(print_stmt(stmt, interner));
        parts.push(print_view_assertion(view, interner));
    }
    parts.join(" ")
}

fn print_var_decl(keyword: &str, d: &VarDecl, interner: &Interner) -> String {
    format!("{} {} {};", keyword, d.ty, name(d.name, interner))
}

fn print_view_proto_decl(d: &ViewProtoDecl, interner: &Interner) -> String {
    let params = d.params.iter().map(|(ty, n)| format!("{} {}", ty, name(*n, interner))).collect::<Vec<_>>().join(", ");
    format!("view {}({});", name(d.name, interner), params)
}

fn print_constraint_decl(d: &ConstraintDecl, interner: &Interner) -> String {
    format!("constraint {} -> {};", print_view_pattern(&d.pattern, interner), print_expr(&d.body, interner))
}

fn print_method_decl(d: &MethodDecl, interner: &Interner) -> String {
    format!("method {}() {{ {} }}", name(d.name, interner), print_block(&d.body, interner))
}

fn print_item(item: &ScriptItem, interner: &Interner) -> String {
    match item {
        ScriptItem::Global(d) => print_var_decl("shared", d, interner),
        ScriptItem::Local(d) => print_var_decl("thread", d, interner),
        ScriptItem::ViewProto(d) => print_view_proto_decl(d, interner),
        ScriptItem::Constraint(d) => print_constraint_decl(d, interner),
        ScriptItem::Method(d) => print_method_decl(d, interner),
    }
}

/// Renders a complete parsed program back to source text, one item per
/// line, in the order the parser produced them.
pub fn print_program(items: &[ScriptItem], interner: &Interner) -> String {
    items.iter().map(|item| print_item(item, interner)).collect::<Vec<_>>().join("\n")
}

/// Types are an `Ty`'s own `Display`, not reimplemented here.
pub fn ty_name(ty: Ty) -> String {
    ty.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn roundtrip(src: &str) {
        let mut interner = Interner::new();
        let items = parse(src, &mut interner).expect("fixture must parse");
        let printed = print_program(&items, &interner);
        let reparsed = parse(&printed, &mut interner).unwrap_or_else(|e| panic!("pretty-printed output failed to reparse: {:?}\n---\n{}", e, printed));
        assert_eq!(items, reparsed, "pretty-printed output: {}", printed);
    }

    #[test]
    fn roundtrips_global_and_local_declarations() {
        roundtrip("shared int ticket; shared int serving; thread int t;");
    }

    #[test]
    fn roundtrips_view_prototype_and_constraint() {
        roundtrip("view holdTick(int t); constraint holdTick(t) -> t >= 0;");
    }

    #[test]
    fn roundtrips_star_and_iter_patterns() {
        roundtrip("view holdLock(); view holdTick(int t); constraint holdLock() * iter[2] holdTick(t) -> true;");
    }

    #[test]
    fn roundtrips_conditional_view_pattern() {
        roundtrip("method m() { {| if t == 1 then holdLock() else holdTick(t) |} < skip > {| emp |} }");
    }

    #[test]
    fn roundtrips_fetch_increment() {
        roundtrip("method lock() { {| emp |} < t = ticket++ > {| emp |} }");
    }

    #[test]
    fn roundtrips_multi_statement_atomic_block() {
        roundtrip("method both() { {| emp |} <{ a = 1; b = 2; }> {| emp |} }");
    }

    #[test]
    fn roundtrips_cas_statement() {
        roundtrip("method m() { {| emp |} < CAS(lock, test, true) > {| emp |} }");
    }

    #[test]
    fn roundtrips_if_else_and_while() {
        roundtrip(
            "method m() { {| emp |} if (flag) { {| emp |} < skip > {| emp |} } else { {| emp |} < skip > {| emp |} } \
             {| emp |} while (flag) { {| emp |} < skip > {| emp |} } {| emp |} }",
        );
    }

    #[test]
    fn roundtrips_do_while() {
        roundtrip("method m() { {| emp |} do { {| emp |} < skip > {| emp |} } while (true); {| emp |} }");
    }

    #[test]
    fn roundtrips_arithmetic_precedence() {
        roundtrip("constraint emp -> 1 + 2 * 3 == 7;");
    }

    #[test]
    fn roundtrips_nested_not_and_boolean_connectives() {
        roundtrip("constraint emp -> !(true && false) || true;");
    }
}
