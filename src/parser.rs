//! Recursive-descent parser: token stream → `Vec<ScriptItem>`
//! (spec.md §4.3 "Parser").
//!
//! Top-level items are independent of each other, so a bad item is
//! recovered from by skipping to the next `;` and continuing — this
//! realizes the "accumulating warnings is permitted" allowance from
//! spec.md §7 where it's cheapest. Parsing *inside* a method body is not
//! error-recovering: spec.md gives no guidance on resuming mid-statement,
//! so the first error there aborts the whole parse.

use crate::ast::*;
use crate::error::ParseError;
use crate::intern::{Interner, Symbol};
use crate::lexer::{tokenize, TokKind, Token};
use crate::types::Ty;
use crate::var::Scope;

pub struct Parser<'a> {
    toks: &'a [Token],
    pos: usize,
    interner: &'a Interner,
}

impl<'a> Parser<'a> {
    pub fn new(toks: &'a [Token], interner: &'a Interner) -> Self {
        Parser { toks, pos: 0, interner }
    }

    fn cur(&self) -> Token {
        self.toks[self.pos.min(self.toks.len() - 1)]
    }

    fn kind_at(&self, offset: usize) -> TokKind {
        self.toks[(self.pos + offset).min(self.toks.len() - 1)].kind
    }

    fn at(&self, kind: TokKind) -> bool {
        self.cur().kind == kind
    }

    fn bump(&mut self) -> Token {
        let t = self.cur();
        if !matches!(t.kind, TokKind::Eof) {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, kind: TokKind, what: &str) -> Result<Token, ParseError> {
        if self.cur().kind == kind {
            Ok(self.bump())
        } else {
            Err(ParseError::new(format!("expected {}", what), self.cur().span))
        }
    }

    fn ident(&mut self) -> Result<Symbol, ParseError> {
        match self.cur().kind {
            TokKind::Ident(s) => {
                self.bump();
                Ok(s)
            }
            _ => Err(ParseError::new("expected an identifier", self.cur().span)),
        }
    }

    fn ty(&mut self) -> Result<Ty, ParseError> {
        match self.cur().kind {
            TokKind::KwInt => {
                self.bump();
                Ok(Ty::Int)
            }
            TokKind::KwBool => {
                self.bump();
                Ok(Ty::Bool)
            }
            _ => Err(ParseError::new("expected `int` or `bool`", self.cur().span)),
        }
    }

    // ── expressions ──────────────────────────────────────────────────

    fn expr(&mut self) -> Result<Expr, ParseError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut terms = vec![self.and_expr()?];
        while self.at(TokKind::PipePipe) {
            self.bump();
            terms.push(self.and_expr()?);
        }
        Ok(if terms.len() == 1 { terms.pop().unwrap() } else { Expr::Or(terms) })
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut terms = vec![self.eq_expr()?];
        while self.at(TokKind::AmpAmp) {
            self.bump();
            terms.push(self.eq_expr()?);
        }
        Ok(if terms.len() == 1 { terms.pop().unwrap() } else { Expr::And(terms) })
    }

    fn eq_expr(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.rel_expr()?;
        Ok(match self.cur().kind {
            TokKind::EqEq => {
                self.bump();
                Expr::Eq(Box::new(lhs), Box::new(self.rel_expr()?))
            }
            TokKind::Ne => {
                self.bump();
                Expr::Ne(Box::new(lhs), Box::new(self.rel_expr()?))
            }
            _ => lhs,
        })
    }

    fn rel_expr(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.add_expr()?;
        Ok(match self.cur().kind {
            TokKind::Lt => {
                self.bump();
                Expr::Lt(Box::new(lhs), Box::new(self.add_expr()?))
            }
            TokKind::Le => {
                self.bump();
                Expr::Le(Box::new(lhs), Box::new(self.add_expr()?))
            }
            TokKind::Gt => {
                self.bump();
                Expr::Gt(Box::new(lhs), Box::new(self.add_expr()?))
            }
            TokKind::Ge => {
                self.bump();
                Expr::Ge(Box::new(lhs), Box::new(self.add_expr()?))
            }
            _ => lhs,
        })
    }

    fn add_expr(&mut self) -> Result<Expr, ParseError> {
        let mut terms = vec![self.mul_expr()?];
        let mut op = None;
        loop {
            match self.cur().kind {
                TokKind::Plus if op.is_none() || op == Some(true) => {
                    self.bump();
                    op = Some(true);
                    terms.push(self.mul_expr()?);
                }
                TokKind::Minus if op.is_none() || op == Some(false) => {
                    self.bump();
                    op = Some(false);
                    terms.push(self.mul_expr()?);
                }
                _ => break,
            }
        }
        Ok(match op {
            None => terms.pop().unwrap(),
            Some(true) => Expr::Add(terms),
            Some(false) => Expr::Sub(terms),
        })
    }

    fn mul_expr(&mut self) -> Result<Expr, ParseError> {
        let mut terms = vec![self.unary_expr()?];
        loop {
            match self.cur().kind {
                TokKind::Star => {
                    self.bump();
                    terms.push(self.unary_expr()?);
                }
                TokKind::Slash => {
                    self.bump();
                    let rhs = self.unary_expr()?;
                    let lhs = if terms.len() == 1 { terms.pop().unwrap() } else { Expr::Mul(terms) };
                    return Ok(Expr::Div(Box::new(lhs), Box::new(rhs)));
                }
                _ => break,
            }
        }
        Ok(if terms.len() == 1 { terms.pop().unwrap() } else { Expr::Mul(terms) })
    }

    fn unary_expr(&mut self) -> Result<Expr, ParseError> {
        if self.at(TokKind::Bang) {
            self.bump();
            return Ok(Expr::Not(Box::new(self.unary_expr()?)));
        }
        self.primary_expr()
    }

    fn primary_expr(&mut self) -> Result<Expr, ParseError> {
        match self.cur().kind {
            TokKind::Int(n) => {
                self.bump();
                Ok(Expr::IntLit(n))
            }
            TokKind::True => {
                self.bump();
                Ok(Expr::BoolLit(true))
            }
            TokKind::False => {
                self.bump();
                Ok(Expr::BoolLit(false))
            }
            TokKind::LParen => {
                self.bump();
                let e = self.expr()?;
                self.expect(TokKind::RParen, "`)`")?;
                Ok(e)
            }
            TokKind::PercentBrace => {
                self.bump();
                let name = self.ident()?;
                self.expect(TokKind::RBrace, "`}` closing a symbol name")?;
                self.expect(TokKind::LParen, "`(` after a symbol name")?;
                let args = self.expr_list()?;
                self.expect(TokKind::RParen, "`)` closing symbol arguments")?;
                Ok(Expr::SymbolCall(name, args))
            }
            TokKind::Ident(name) => {
                self.bump();
                Ok(Expr::Ident(name))
            }
            _ => Err(ParseError::new("expected an expression", self.cur().span)),
        }
    }

    fn expr_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut out = Vec::new();
        if self.at(TokKind::RParen) {
            return Ok(out);
        }
        out.push(self.expr()?);
        while self.at(TokKind::Comma) {
            self.bump();
            out.push(self.expr()?);
        }
        Ok(out)
    }

    // ── view patterns ────────────────────────────────────────────────

    fn view_pattern(&mut self) -> Result<ViewPattern, ParseError> {
        let mut v = self.view_atom()?;
        while self.at(TokKind::Star) {
            self.bump();
            let rhs = self.view_atom()?;
            v = ViewPattern::Star(Box::new(v), Box::new(rhs));
        }
        Ok(v)
    }

    fn view_atom(&mut self) -> Result<ViewPattern, ParseError> {
        match self.cur().kind {
            TokKind::Emp => {
                self.bump();
                Ok(ViewPattern::Emp)
            }
            TokKind::If => {
                self.bump();
                let cond = self.expr()?;
                self.expect(TokKind::Then, "`then` in a conditional view")?;
                let then_v = self.view_pattern()?;
                self.expect(TokKind::Else, "`else` in a conditional view")?;
                let else_v = self.view_pattern()?;
                Ok(ViewPattern::If(cond, Box::new(then_v), Box::new(else_v)))
            }
            TokKind::Iter => {
                self.bump();
                self.expect(TokKind::LBracket, "`[` after `iter`")?;
                let mult = self.expr()?;
                self.expect(TokKind::RBracket, "`]` closing an `iter` multiplicity")?;
                let inner = self.view_atom()?;
                Ok(ViewPattern::Iter(mult, Box::new(inner)))
            }
            TokKind::LParen => {
                self.bump();
                let v = self.view_pattern()?;
                self.expect(TokKind::RParen, "`)` closing a parenthesised view")?;
                Ok(v)
            }
            TokKind::Ident(name) => {
                self.bump();
                self.expect(TokKind::LParen, "`(` after a view predicate name")?;
                let args = self.expr_list()?;
                self.expect(TokKind::RParen, "`)` closing view predicate arguments")?;
                Ok(ViewPattern::Func(name, args))
            }
            _ => Err(ParseError::new("expected a view pattern", self.cur().span)),
        }
    }

    fn view_assertion(&mut self) -> Result<ViewPattern, ParseError> {
        self.expect(TokKind::ViewOpen, "`{|` opening a view assertion")?;
        let v = self.view_pattern()?;
        self.expect(TokKind::ViewClose, "`|}` closing a view assertion")?;
        Ok(v)
    }

    // ── atomic statements ────────────────────────────────────────────

    fn atomic_stmt(&mut self) -> Result<AtomicStmt, ParseError> {
        let start = self.cur().span;
        match self.cur().kind {
            TokKind::Cas => {
                self.bump();
                self.expect(TokKind::LParen, "`(` after `CAS`")?;
                let dest = self.ident()?;
                self.expect(TokKind::Comma, "`,` after CAS destination")?;
                let test = self.ident()?;
                self.expect(TokKind::Comma, "`,` after CAS test variable")?;
                let set = self.expr()?;
                let end = self.cur().span;
                self.expect(TokKind::RParen, "`)` closing `CAS`")?;
                Ok(AtomicStmt::Cas { dest, test, set, span: start.join(end) })
            }
            TokKind::PercentBrace => {
                self.bump();
                let name = self.ident()?;
                self.expect(TokKind::RBrace, "`}` closing a symbol name")?;
                self.expect(TokKind::LParen, "`(` after a symbol name")?;
                let args = self.expr_list()?;
                let end = self.cur().span;
                self.expect(TokKind::RParen, "`)` closing symbol arguments")?;
                Ok(AtomicStmt::SymbolCall { name, args, span: start.join(end) })
            }
            TokKind::Ident(name) if self.word(name) == "skip" => {
                self.bump();
                Ok(AtomicStmt::Skip { span: start })
            }
            TokKind::Ident(name) if self.word(name) == "assume" => {
                self.bump();
                self.expect(TokKind::LParen, "`(` after `assume`")?;
                let cond = self.expr()?;
                let end = self.cur().span;
                self.expect(TokKind::RParen, "`)` closing `assume`")?;
                Ok(AtomicStmt::Assume { cond, span: start.join(end) })
            }
            TokKind::Ident(dest) => {
                self.bump();
                self.expect(TokKind::Eq, "`=` in an atomic statement")?;
                // Fetch forms: `dest = src;` / `dest = src++;` / `dest = src--;`
                if let TokKind::Ident(src) = self.cur().kind {
                    match self.kind_at(1) {
                        TokKind::PlusPlus => {
                            self.bump();
                            let end = self.cur().span;
                            self.bump();
                            return Ok(AtomicStmt::Fetch {
                                dest,
                                src,
                                mode: FetchMode::Increment,
                                span: start.join(end),
                            });
                        }
                        TokKind::MinusMinus => {
                            self.bump();
                            let end = self.cur().span;
                            self.bump();
                            return Ok(AtomicStmt::Fetch {
                                dest,
                                src,
                                mode: FetchMode::Decrement,
                                span: start.join(end),
                            });
                        }
                        TokKind::Semi | TokKind::Gt => {
                            let end = self.cur().span;
                            self.bump();
                            return Ok(AtomicStmt::Fetch { dest, src, mode: FetchMode::Direct, span: start.join(end) });
                        }
                        _ => {}
                    }
                }
                let expr = self.expr()?;
                let end = self.cur().span;
                Ok(AtomicStmt::Assign { dest, expr, span: start.join(end) })
            }
            _ => Err(ParseError::new("expected an atomic statement", self.cur().span)),
        }
    }

    /// `skip`/`assume` are never reserved words (spec.md §6 deliberately
    /// omits them from the reserved-word list), so the lexer always hands
    /// them back as plain `Ident`s; recognise them by resolving the
    /// symbol's text instead.
    fn word(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    // ── statements & blocks ──────────────────────────────────────────

    fn stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.cur().kind {
            TokKind::Lt => {
                let start = self.cur().span;
                self.bump();
                if self.at(TokKind::LBrace) {
                    self.bump();
                    let mut stmts = Vec::new();
                    while !self.at(TokKind::RBrace) {
                        stmts.push(self.atomic_stmt()?);
                        self.expect(TokKind::Semi, "`;` after an atomic statement")?;
                    }
                    self.bump();
                    self.expect(TokKind::Gt, "`>` closing an atomic block")?;
                    Ok(Stmt::Atomic(stmts))
                } else {
                    let one = self.atomic_stmt()?;
                    self.expect(TokKind::Gt, "`>` closing an atomic step")?;
                    let _ = start;
                    Ok(Stmt::Atomic(vec![one]))
                }
            }
            TokKind::If => {
                let start = self.cur().span;
                self.bump();
                self.expect(TokKind::LParen, "`(` after `if`")?;
                let cond = self.expr()?;
                self.expect(TokKind::RParen, "`)` closing an `if` condition")?;
                self.expect(TokKind::LBrace, "`{` opening the `if` branch")?;
                let then_branch = self.block()?;
                self.expect(TokKind::RBrace, "`}` closing the `if` branch")?;
                self.expect(TokKind::Else, "`else` (both branches are required)")?;
                self.expect(TokKind::LBrace, "`{` opening the `else` branch")?;
                let else_branch = self.block()?;
                let end = self.cur().span;
                self.expect(TokKind::RBrace, "`}` closing the `else` branch")?;
                Ok(Stmt::If { cond, then_branch, else_branch, span: start.join(end) })
            }
            TokKind::Do => {
                let start = self.cur().span;
                self.bump();
                self.expect(TokKind::LBrace, "`{` opening a `do` body")?;
                let body = self.block()?;
                self.expect(TokKind::RBrace, "`}` closing a `do` body")?;
                self.expect(TokKind::While, "`while` closing a `do` loop")?;
                self.expect(TokKind::LParen, "`(` after `while`")?;
                let cond = self.expr()?;
                let end = self.cur().span;
                self.expect(TokKind::RParen, "`)` closing a `while` condition")?;
                self.expect(TokKind::Semi, "`;` ending a `do ... while` loop")?;
                Ok(Stmt::While { is_do_while: true, cond, body, span: start.join(end) })
            }
            TokKind::While => {
                let start = self.cur().span;
                self.bump();
                self.expect(TokKind::LParen, "`(` after `while`")?;
                let cond = self.expr()?;
                self.expect(TokKind::RParen, "`)` closing a `while` condition")?;
                self.expect(TokKind::LBrace, "`{` opening a `while` body")?;
                let body = self.block()?;
                let end = self.cur().span;
                self.expect(TokKind::RBrace, "`}` closing a `while` body")?;
                Ok(Stmt::While { is_do_while: false, cond, body, span: start.join(end) })
            }
            _ => Err(ParseError::new("expected a statement", self.cur().span)),
        }
    }

    fn block(&mut self) -> Result<Block, ParseError> {
        let mut views = vec![self.view_assertion()?];
        let mut steps = Vec::new();
        while !self.at(TokKind::RBrace) && !self.at(TokKind::Eof) {
            steps.push(self.stmt()?);
            views.push(self.view_assertion()?);
        }
        Ok(Block::new(views, steps))
    }

    // ── top-level items ──────────────────────────────────────────────

    fn var_decl(&mut self, scope: Scope) -> Result<VarDecl, ParseError> {
        let start = self.cur().span;
        self.bump(); // `shared` / `thread`
        let ty = self.ty()?;
        let name = self.ident()?;
        let end = self.cur().span;
        self.expect(TokKind::Semi, "`;` after a variable declaration")?;
        Ok(VarDecl { scope, ty, name, span: start.join(end) })
    }

    fn view_proto_decl(&mut self) -> Result<ViewProtoDecl, ParseError> {
        let start = self.cur().span;
        self.bump(); // `view`
        let name = self.ident()?;
        self.expect(TokKind::LParen, "`(` after a view prototype name")?;
        let mut params = Vec::new();
        if !self.at(TokKind::RParen) {
            loop {
                let ty = self.ty()?;
                let pname = self.ident()?;
                params.push((ty, pname));
                if self.at(TokKind::Comma) {
                    self.bump();
                    continue;
                }
                break;
            }
        }
        let end = self.cur().span;
        self.expect(TokKind::RParen, "`)` closing view prototype parameters")?;
        self.expect(TokKind::Semi, "`;` after a view prototype")?;
        Ok(ViewProtoDecl { name, params, span: start.join(end) })
    }

    fn constraint_decl(&mut self) -> Result<ConstraintDecl, ParseError> {
        let start = self.cur().span;
        self.bump(); // `constraint`
        let pattern = self.view_pattern()?;
        self.expect(TokKind::Arrow, "`->` in a constraint")?;
        let body = self.expr()?;
        let end = self.cur().span;
        self.expect(TokKind::Semi, "`;` after a constraint")?;
        Ok(ConstraintDecl { pattern, body, span: start.join(end) })
    }

    fn method_decl(&mut self) -> Result<MethodDecl, ParseError> {
        let start = self.cur().span;
        self.bump(); // `method`
        let name = self.ident()?;
        self.expect(TokKind::LParen, "`(` after a method name")?;
        self.expect(TokKind::RParen, "`)` (methods take no parameters)")?;
        self.expect(TokKind::LBrace, "`{` opening a method body")?;
        let body = self.block()?;
        let end = self.cur().span;
        self.expect(TokKind::RBrace, "`}` closing a method body")?;
        Ok(MethodDecl { name, body, span: start.join(end) })
    }

    fn item(&mut self) -> Result<ScriptItem, ParseError> {
        match self.cur().kind {
            TokKind::Shared => Ok(ScriptItem::Global(self.var_decl(Scope::Shared)?)),
            TokKind::Thread => Ok(ScriptItem::Local(self.var_decl(Scope::Thread)?)),
            TokKind::View => Ok(ScriptItem::ViewProto(self.view_proto_decl()?)),
            TokKind::Constraint => Ok(ScriptItem::Constraint(self.constraint_decl()?)),
            TokKind::Method => Ok(ScriptItem::Method(self.method_decl()?)),
            _ => Err(ParseError::new(
                "expected `shared`, `thread`, `view`, `constraint`, or `method`",
                self.cur().span,
            )),
        }
    }

    /// Skip forward to just past the next `;` (or to EOF), for top-level
    /// error recovery (spec.md §4.3 "accumulating ... errors").
    fn recover(&mut self) {
        while !matches!(self.cur().kind, TokKind::Semi | TokKind::Eof) {
            self.bump();
        }
        if self.at(TokKind::Semi) {
            self.bump();
        }
    }
}

/// Parse a complete source program into its top-level items, accumulating
/// one `ParseError` per bad item and recovering to the next `;`
/// (spec.md §4.3, §6).
pub fn parse(src: &str, interner: &mut Interner) -> Result<Vec<ScriptItem>, Vec<ParseError>> {
    let toks = match tokenize(src, interner) {
        Ok(toks) => toks,
        Err(e) => return Err(vec![e]),
    };
    let mut p = Parser::new(&toks, interner);
    let mut items = Vec::new();
    let mut errors = Vec::new();
    while !p.at(TokKind::Eof) {
        match p.item() {
            Ok(item) => items.push(item),
            Err(e) => {
                errors.push(e);
                p.recover();
            }
        }
    }
    if errors.is_empty() {
        Ok(items)
    } else {
        Err(errors)
    }
}
