//! Top-level Modeller orchestration (spec.md §4.5): ties together name
//! resolution (`vartable`), the fixed atomic-primitive semantics table
//! (`semantics`), view/expression type-checking (`typecheck`), and method
//! body lowering (`body`) into a complete `Model<Block<CView>, ViewDef>`.

pub mod body;
pub mod semantics;
pub mod typecheck;
pub mod vartable;

use crate::ast::Expr;
use crate::collator::Collated;
use crate::command::Block;
use crate::cview::CView;
use crate::error::{ModelError, Stage, StageError, StageErrors, StageResult};
use crate::expr::BoolExpr;
use crate::intern::{Interner, Symbol};
use crate::model::Model;
use crate::types::Ty;
use crate::view::DView;
use crate::viewdef::ViewDef;
use std::collections::HashMap;
use vartable::VarMap;

fn tag(errors: Vec<ModelError>) -> Vec<StageError> {
    errors.into_iter().map(|e| StageError::model(Stage::Model, e)).collect()
}

fn bound_params(sig: &DView) -> HashMap<Symbol, Ty> {
    let mut out = HashMap::new();
    for iterated in sig {
        for p in &iterated.item.params {
            out.insert(p.name, p.ty);
        }
    }
    out
}

/// Type-checks one constraint's body against `globals` plus its own
/// pattern-bound parameters, remapping an unknown-identifier failure into
/// `ConstraintScopeViolation` when the name is a genuine thread-local
/// (spec.md §4.5 "Errors": "use of thread-local in a constraint that must
/// be proof-global").
fn check_constraint_body(
    body: &Expr,
    bound: &HashMap<Symbol, Ty>,
    globals: &HashMap<Symbol, Ty>,
    real_locals: &HashMap<Symbol, Ty>,
) -> Result<BoolExpr, ModelError> {
    let vars = VarMap::new(globals, bound);
    typecheck::check_bool(body, &vars).map_err(|e| match e {
        ModelError::UnknownIdentifier(name) if real_locals.contains_key(&name) => {
            ModelError::ConstraintScopeViolation(name)
        }
        other => other,
    })
}

/// Runs the Modeller: builds variable maps, the view prototype table, the
/// view-definition list, the fixed semantics table, and the per-method
/// `PartCmd<CView>` tree (spec.md §4.5).
pub fn model(collated: Collated, interner: &mut Interner) -> StageResult<Model<Block<CView>, ViewDef>> {
    let (maps, var_errors) = vartable::build(&collated.globals, &collated.locals);
    let (protos, proto_errors) = vartable::build_protos(&collated.protos);
    let mut errors = Vec::new();
    errors.extend(var_errors);
    errors.extend(proto_errors);

    let vars = VarMap::new(&maps.globals, &maps.locals);

    let mut view_defs = Vec::new();
    for c in &collated.constraints {
        match typecheck::pattern_to_dview(&c.pattern, &protos) {
            Ok(sig) => {
                let bound = bound_params(&sig);
                match check_constraint_body(&c.body, &bound, &maps.globals, &maps.locals) {
                    Ok(body_expr) => view_defs.push(ViewDef::Definite(sig, body_expr)),
                    Err(e) => errors.push(e),
                }
            }
            Err(e) => errors.push(e),
        }
    }

    let (names, semantics) = semantics::table(interner);

    let mut built_model: Model<Block<CView>, ViewDef> = Model::empty();
    built_model.globals = maps.globals.clone();
    built_model.locals = maps.locals.clone();
    built_model.semantics = semantics;
    built_model.view_defs = view_defs;

    for m in &collated.methods {
        match body::build(&m.body, &names, &vars, &protos) {
            Ok(built) => built_model.insert_axiom(m.name, built),
            Err(e) => errors.push(e),
        }
    }

    errors.extend(built_model.check_disjoint_scopes());
    errors.extend(built_model.check_one_viewdef_per_prototype());

    if errors.is_empty() {
        Ok(built_model)
    } else {
        Err(StageErrors(tag(errors)))
    }
}
