//! Error taxonomy threaded through every pipeline stage (spec.md §7).

use crate::intern::Symbol;
use crate::span::Span;
use std::fmt;

/// Which pipeline stage produced an error, used by the driver to tag
/// diagnostics (spec.md §4.8, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Collate,
    Model,
    Guard,
    Graph,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parse => "parse",
            Stage::Collate => "collate",
            Stage::Model => "model",
            Stage::Guard => "guard",
            Stage::Graph => "graph",
        };
        write!(f, "{}", name)
    }
}

/// A single-string diagnostic carrying file position; fatal for the
/// invocation (spec.md §7 "ParseError").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError { message: message.into(), span }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}: {}", self.span.start, self.span.end, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Which scope a duplicate or misused name belongs to, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameScope {
    Global,
    Local,
    ViewProto,
}

impl fmt::Display for NameScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NameScope::Global => "global",
            NameScope::Local => "local",
            NameScope::ViewProto => "view prototype",
        };
        write!(f, "{}", s)
    }
}

/// Structured modelling errors (spec.md §7 "ModelError").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    UnknownIdentifier(Symbol),
    TypeMismatch {
        expected: String,
        got: String,
        location: String,
    },
    ArityMismatch {
        proto: Symbol,
        expected: usize,
        got: usize,
    },
    BadAtomicBlock(String),
    DuplicateName(Symbol, NameScope),
    ConstraintScopeViolation(Symbol),
}

impl ModelError {
    pub fn display(&self, interner: &crate::intern::Interner) -> String {
        match self {
            ModelError::UnknownIdentifier(name) => {
                format!("unknown identifier `{}`", interner.resolve(*name))
            }
            ModelError::TypeMismatch { expected, got, location } => {
                format!("type mismatch in {}: expected {}, got {}", location, expected, got)
            }
            ModelError::ArityMismatch { proto, expected, got } => format!(
                "view prototype `{}` expects {} argument(s), got {}",
                interner.resolve(*proto),
                expected,
                got
            ),
            ModelError::BadAtomicBlock(reason) => format!("malformed atomic block: {}", reason),
            ModelError::DuplicateName(name, scope) => {
                format!("duplicate {} name `{}`", scope, interner.resolve(*name))
            }
            ModelError::ConstraintScopeViolation(name) => format!(
                "constraint references thread-local variable `{}`, which must be proof-global",
                interner.resolve(*name)
            ),
        }
    }
}

/// Structural malformation detected by the grapher; should be unreachable
/// from valid Modeller/Guarder output (spec.md §7 "GraphError").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphError {
    pub reason: String,
}

impl GraphError {
    pub fn new(reason: impl Into<String>) -> Self {
        GraphError { reason: reason.into() }
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed method body: {}", self.reason)
    }
}

impl std::error::Error for GraphError {}

/// The kind of error that can occur within a stage, before it is tagged
/// with `Stage` by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Parse(ParseError),
    Model(ModelError),
    Graph(GraphError),
}

/// An error tagged with the stage that produced it (spec.md §7
/// "Propagation policy").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageError {
    pub stage: Stage,
    pub kind: ErrorKind,
}

impl StageError {
    pub fn parse(err: ParseError) -> Self {
        StageError { stage: Stage::Parse, kind: ErrorKind::Parse(err) }
    }

    pub fn model(stage: Stage, err: ModelError) -> Self {
        StageError { stage, kind: ErrorKind::Model(err) }
    }

    pub fn graph(err: GraphError) -> Self {
        StageError { stage: Stage::Graph, kind: ErrorKind::Graph(err) }
    }

    pub fn display(&self, interner: &crate::intern::Interner) -> String {
        let body = match &self.kind {
            ErrorKind::Parse(e) => e.to_string(),
            ErrorKind::Model(e) => e.display(interner),
            ErrorKind::Graph(e) => e.to_string(),
        };
        format!("[{}] {}", self.stage, body)
    }
}

/// A non-empty batch of errors from a single stage (spec.md §7: "every
/// stage returns either the produced value or a non-empty sequence of
/// errors").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageErrors(pub Vec<StageError>);

impl StageErrors {
    pub fn single(err: StageError) -> Self {
        StageErrors(vec![err])
    }

    pub fn errors(&self) -> &[StageError] {
        &self.0
    }
}

pub type StageResult<T> = Result<T, StageErrors>;
