//! Tokenizer for the source language (spec.md §4.3 "Parser", §6 "Source
//! language (bit-exact)").
//!
//! Produces a flat token stream; the parser drives it with one token of
//! lookahead. Nested `/* */` comments are tracked with a depth counter
//! rather than recursion, so comment depth is not bounded by stack size
//! (spec.md §5).

use crate::error::ParseError;
use crate::intern::{Interner, Symbol};
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    Ident(Symbol),
    Int(i64),

    // reserved words
    Shared,
    Thread,
    View,
    Constraint,
    Method,
    Iter,
    If,
    Then,
    Else,
    Do,
    While,
    Emp,
    True,
    False,
    KwInt,
    KwBool,
    Search,
    Cas,

    // multi-character operators
    PlusPlus,
    MinusMinus,
    AmpAmp,
    PipePipe,
    EqEq,
    Ne,
    Le,
    Ge,
    Arrow,

    // single-character operators
    Plus,
    Minus,
    Star,
    Slash,
    Lt,
    Gt,
    Bang,
    Eq,

    // punctuation
    Comma,
    Semi,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // view-assertion / symbol brackets
    ViewOpen,  // {|
    ViewClose, // |}
    PercentBrace, // %{

    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokKind,
    pub span: Span,
}

fn keyword(word: &str) -> Option<TokKind> {
    Some(match word {
        "shared" => TokKind::Shared,
        "thread" => TokKind::Thread,
        "view" => TokKind::View,
        "constraint" => TokKind::Constraint,
        "method" => TokKind::Method,
        "iter" => TokKind::Iter,
        "if" => TokKind::If,
        "then" => TokKind::Then,
        "else" => TokKind::Else,
        "do" => TokKind::Do,
        "while" => TokKind::While,
        "emp" => TokKind::Emp,
        "true" => TokKind::True,
        "false" => TokKind::False,
        "int" => TokKind::KwInt,
        "bool" => TokKind::KwBool,
        "search" => TokKind::Search,
        "CAS" => TokKind::Cas,
        _ => return None,
    })
}

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    interner: &'a mut Interner,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, interner: &'a mut Interner) -> Self {
        Lexer { src: src.as_bytes(), pos: 0, interner }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.pos += 1;
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start = self.pos;
                    self.pos += 2;
                    let mut depth = 1usize;
                    while depth > 0 {
                        match (self.peek(), self.peek_at(1)) {
                            (Some(b'/'), Some(b'*')) => {
                                depth += 1;
                                self.pos += 2;
                            }
                            (Some(b'*'), Some(b'/')) => {
                                depth -= 1;
                                self.pos += 2;
                            }
                            (Some(_), _) => self.pos += 1,
                            (None, _) => {
                                return Err(ParseError::new(
                                    "unterminated block comment",
                                    Span::new(start, self.pos),
                                ));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut out = Vec::new();
        loop {
            self.skip_trivia()?;
            let start = self.pos;
            let Some(c) = self.peek() else {
                out.push(Token { kind: TokKind::Eof, span: Span::new(start, start) });
                break;
            };

            let kind = match c {
                b'0'..=b'9' => self.lex_int(),
                b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.lex_ident(),
                b'{' if self.peek_at(1) == Some(b'|') => {
                    self.pos += 2;
                    TokKind::ViewOpen
                }
                b'|' if self.peek_at(1) == Some(b'}') => {
                    self.pos += 2;
                    TokKind::ViewClose
                }
                b'%' if self.peek_at(1) == Some(b'{') => {
                    self.pos += 2;
                    TokKind::PercentBrace
                }
                b'{' => {
                    self.pos += 1;
                    TokKind::LBrace
                }
                b'}' => {
                    self.pos += 1;
                    TokKind::RBrace
                }
                b'(' => {
                    self.pos += 1;
                    TokKind::LParen
                }
                b')' => {
                    self.pos += 1;
                    TokKind::RParen
                }
                b'[' => {
                    self.pos += 1;
                    TokKind::LBracket
                }
                b']' => {
                    self.pos += 1;
                    TokKind::RBracket
                }
                b',' => {
                    self.pos += 1;
                    TokKind::Comma
                }
                b';' => {
                    self.pos += 1;
                    TokKind::Semi
                }
                b'*' => {
                    self.pos += 1;
                    TokKind::Star
                }
                b'/' => {
                    self.pos += 1;
                    TokKind::Slash
                }
                b'+' if self.peek_at(1) == Some(b'+') => {
                    self.pos += 2;
                    TokKind::PlusPlus
                }
                b'+' => {
                    self.pos += 1;
                    TokKind::Plus
                }
                b'-' if self.peek_at(1) == Some(b'-') => {
                    self.pos += 2;
                    TokKind::MinusMinus
                }
                b'-' if self.peek_at(1) == Some(b'>') => {
                    self.pos += 2;
                    TokKind::Arrow
                }
                b'-' => {
                    self.pos += 1;
                    TokKind::Minus
                }
                b'&' if self.peek_at(1) == Some(b'&') => {
                    self.pos += 2;
                    TokKind::AmpAmp
                }
                b'|' if self.peek_at(1) == Some(b'|') => {
                    self.pos += 2;
                    TokKind::PipePipe
                }
                b'=' if self.peek_at(1) == Some(b'=') => {
                    self.pos += 2;
                    TokKind::EqEq
                }
                b'=' => {
                    self.pos += 1;
                    TokKind::Eq
                }
                b'!' if self.peek_at(1) == Some(b'=') => {
                    self.pos += 2;
                    TokKind::Ne
                }
                b'!' => {
                    self.pos += 1;
                    TokKind::Bang
                }
                b'<' if self.peek_at(1) == Some(b'=') => {
                    self.pos += 2;
                    TokKind::Le
                }
                b'<' => {
                    self.pos += 1;
                    TokKind::Lt
                }
                b'>' if self.peek_at(1) == Some(b'=') => {
                    self.pos += 2;
                    TokKind::Ge
                }
                b'>' => {
                    self.pos += 1;
                    TokKind::Gt
                }
                other => {
                    return Err(ParseError::new(
                        format!("unexpected character `{}`", other as char),
                        Span::new(start, start + 1),
                    ));
                }
            };

            out.push(Token { kind, span: Span::new(start, self.pos) });
        }
        Ok(out)
    }

    fn lex_int(&mut self) -> TokKind {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        TokKind::Int(text.parse().unwrap_or(i64::MAX))
    }

    fn lex_ident(&mut self) -> TokKind {
        let start = self.pos;
        while matches!(self.peek(), Some(b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_')) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        if let Some(kw) = keyword(text) {
            return kw;
        }
        TokKind::Ident(self.interner.intern(text))
    }
}

pub fn tokenize(src: &str, interner: &mut Interner) -> Result<Vec<Token>, ParseError> {
    Lexer::new(src, interner).tokenize()
}
