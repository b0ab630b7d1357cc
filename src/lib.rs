//! A verification-condition frontend for a small concurrent proof
//! language: source text goes in, a per-method control-flow graph of
//! atomic Hoare-triple edges comes out, ready for a separate VC-solving
//! backend this crate does not provide.
//!
//! The pipeline is five stages, each its own module, composed by
//! [`driver::Driver`]:
//!
//! - [`parser`] — source text to a surface [`ast`].
//! - [`collator`] turns the flat [`ast::ScriptItem`] list into
//!   [`collator::Collated`] tables (globals, locals, view prototypes,
//!   constraints, methods).
//! - [`modeller`] type-checks and lowers each method body into a
//!   [`model::Model`] over [`command::Block<cview::CView>`].
//! - [`guarder`] expands conditional views into [`gview::GView`]s with
//!   explicit boolean guards.
//! - [`grapher`] flattens each guarded block into a [`grapher::Graph`].
//!
//! [`pretty`] and [`test_support`] back the test suites only; neither is
//! part of the pipeline.

pub mod ast;
pub mod collator;
pub mod command;
pub mod cview;
pub mod driver;
pub mod error;
pub mod expr;
pub mod grapher;
pub mod guarder;
pub mod gview;
pub mod intern;
pub mod lexer;
pub mod model;
pub mod modeller;
pub mod parser;
pub mod pretty;
pub mod span;
pub mod test_support;
pub mod types;
pub mod var;
pub mod view;
pub mod viewdef;

pub use driver::{Driver, Output, Target, DEFAULT_MAX_DEPTH};
pub use error::{
    GraphError, ModelError, NameScope, ParseError, Stage, StageError, StageErrors, StageResult,
};
pub use intern::{Interner, Symbol};
pub use model::Model;
pub use types::Ty;
pub use var::{Mark, Scope, Var};
