//! Frontend driver: composes the five stages with error threading, and
//! exposes the five stopping points the caller may choose between
//! (spec.md §4.8 "Frontend Driver").
//!
//! The stages themselves are pure and carry no logging (spec.md §9,
//! SPEC_FULL.md §2 "Logging"); the driver is the one place that runs
//! several of them back to back, so it is the natural place to record
//! which stage ran and whether it failed, via the `log` facade. Selecting
//! and installing a subscriber is left to the caller.

use crate::ast::ScriptItem;
use crate::collator::{self, Collated};
use crate::command::Block;
use crate::cview::CView;
use crate::error::{ParseError, Stage, StageError, StageErrors, StageResult};
use crate::grapher::{self, Graph};
use crate::guarder;
use crate::gview::GView;
use crate::intern::Interner;
use crate::model::Model;
use crate::modeller;
use crate::parser;
use crate::viewdef::ViewDef;

/// How far to run the pipeline (spec.md §4.8 "Exposes five targets").
/// Ordered so `Stage::Graph > Stage::Guard > Stage::Model > Stage::Collate
/// > Stage::Parse` (SPEC_FULL.md §3 "C8"), used only to decide how far to
/// run, never compared for any other purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Target {
    Parse,
    Collate,
    Model,
    Guard,
    Graph,
}

/// Default recursion/nesting guard, matching spec.md §5's "tolerate
/// inputs with expression depth in the low thousands" (SPEC_FULL.md §2
/// "Configuration").
pub const DEFAULT_MAX_DEPTH: u32 = 4096;

pub struct Driver {
    max_depth: u32,
}

impl Default for Driver {
    fn default() -> Self {
        Driver { max_depth: DEFAULT_MAX_DEPTH }
    }
}

/// The pipeline's result at a given stopping point; only the variant
/// matching the requested `Target` is ever populated.
pub enum Output {
    Parsed(Vec<ScriptItem>),
    Collated(Collated),
    Modelled(Model<Block<CView>, ViewDef>),
    Guarded(Model<Block<GView>, ViewDef>),
    Graphed(Model<Graph, ViewDef>),
}

impl Driver {
    pub fn new() -> Self {
        Driver::default()
    }

    /// Overrides the default recursion/nesting guard (SPEC_FULL.md §2
    /// "Configuration": "the only configurable knobs the core exposes").
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    fn run_parse(&self, src: &str, interner: &mut Interner) -> StageResult<Vec<ScriptItem>> {
        log::debug!("driver: running stage `parse`");
        parser::parse(src, interner).map_err(|errs| {
            log::warn!("driver: stage `parse` failed with {} error(s)", errs.len());
            StageErrors(errs.into_iter().map(StageError::parse).collect())
        })
    }

    fn run_collate(&self, items: Vec<ScriptItem>) -> StageResult<Collated> {
        log::debug!("driver: running stage `collate`");
        Ok(collator::collate(items))
    }

    fn run_model(&self, collated: Collated, interner: &mut Interner) -> StageResult<Model<Block<CView>, ViewDef>> {
        log::debug!("driver: running stage `model`");
        modeller::model(collated, interner).map_err(|errs| {
            log::warn!("driver: stage `model` failed with {} error(s)", errs.0.len());
            errs
        })
    }

    fn run_guard(&self, model: Model<Block<CView>, ViewDef>) -> Model<Block<GView>, ViewDef> {
        log::debug!("driver: running stage `guard`");
        guarder::guard(model)
    }

    fn run_graph(
        &self,
        model: Model<Block<GView>, ViewDef>,
        interner: &mut Interner,
    ) -> StageResult<Model<Graph, ViewDef>> {
        log::debug!("driver: running stage `graph`");
        grapher::graph(model, interner).map_err(|errs| {
            log::warn!("driver: stage `graph` failed with {} error(s)", errs.0.len());
            errs
        })
    }

    /// Runs the pipeline up to (and including) `target`, returning the
    /// result at that stopping point or the first stage's errors
    /// (spec.md §4.8 "runs the pipeline up to the named stage ... or the
    /// first error encountered, tagged with its originating stage";
    /// spec.md §7 "the driver stops at the first failing stage").
    pub fn run(&self, src: &str, interner: &mut Interner, target: Target) -> StageResult<Output> {
        let items = self.run_parse(src, interner)?;
        if target == Target::Parse {
            return Ok(Output::Parsed(items));
        }

        let collated = self.run_collate(items)?;
        if target == Target::Collate {
            return Ok(Output::Collated(collated));
        }

        let modelled = self.run_model(collated, interner)?;
        if target == Target::Model {
            return Ok(Output::Modelled(modelled));
        }

        let guarded = self.run_guard(modelled);
        if target == Target::Guard {
            return Ok(Output::Guarded(guarded));
        }

        let graphed = self.run_graph(guarded, interner)?;
        Ok(Output::Graphed(graphed))
    }
}

impl Output {
    pub fn into_parsed(self) -> Option<Vec<ScriptItem>> {
        match self {
            Output::Parsed(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_collated(self) -> Option<Collated> {
        match self {
            Output::Collated(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_modelled(self) -> Option<Model<Block<CView>, ViewDef>> {
        match self {
            Output::Modelled(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_guarded(self) -> Option<Model<Block<GView>, ViewDef>> {
        match self {
            Output::Guarded(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_graphed(self) -> Option<Model<Graph, ViewDef>> {
        match self {
            Output::Graphed(v) => Some(v),
            _ => None,
        }
    }
}

/// True when every `StageError` in `errs` belongs to `stage` — test
/// helper for asserting which stage produced a failure.
pub fn all_from_stage(errs: &StageErrors, stage: Stage) -> bool {
    errs.errors().iter().all(|e| e.stage == stage)
}

/// Adapts a bare parse failure (before any stage tagging exists) to the
/// same `StageErrors` shape the driver returns, for callers that only
/// want to run the lexer/parser directly.
pub fn tag_parse_errors(errs: Vec<ParseError>) -> StageErrors {
    StageErrors(errs.into_iter().map(StageError::parse).collect())
}
