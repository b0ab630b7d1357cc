//! The top-level pipeline value: variable maps, per-method axioms, atomic
//! primitive semantics, and view definitions (spec.md §3 "Model").

use crate::error::{ModelError, NameScope};
use crate::expr::BoolExpr;
use crate::intern::Symbol;
use crate::types::Ty;
use crate::view::DFunc;
use crate::viewdef::HasSignature;
use std::collections::HashMap;

/// The top-level container, parameterised by axiom-type and
/// view-def-type: the Modeller and Guarder instantiate `Ax` with
/// `Block<CView>`/`Block<GView>`, the Grapher instantiates it with
/// `Graph` (spec.md §3 "Model").
#[derive(Debug, Clone, PartialEq)]
pub struct Model<Ax, Vd> {
    pub globals: HashMap<Symbol, Ty>,
    pub locals: HashMap<Symbol, Ty>,
    /// Ordered map method-name → axiom-like value; insertion order is
    /// preserved for deterministic output (spec.md §9 "Multisets" applies
    /// equally here).
    pub axioms: Vec<(Symbol, Ax)>,
    /// Definition of each atomic primitive recognised by the Modeller.
    pub semantics: Vec<(DFunc, BoolExpr)>,
    pub view_defs: Vec<Vd>,
}

impl<Ax, Vd> Model<Ax, Vd> {
    pub fn empty() -> Self {
        Model {
            globals: HashMap::new(),
            locals: HashMap::new(),
            axioms: Vec::new(),
            semantics: Vec::new(),
            view_defs: Vec::new(),
        }
    }

    pub fn axiom(&self, method: Symbol) -> Option<&Ax> {
        self.axioms.iter().find(|(name, _)| *name == method).map(|(_, ax)| ax)
    }

    pub fn insert_axiom(&mut self, method: Symbol, axiom: Ax) {
        self.axioms.push((method, axiom));
    }

    pub fn method_names(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.axioms.iter().map(|(name, _)| *name)
    }

    /// Every name in `globals` and `locals` is unique within its scope and
    /// the two scopes are disjoint (spec.md §3 "Invariants").
    pub fn check_disjoint_scopes(&self) -> Vec<ModelError> {
        self.globals
            .keys()
            .filter(|name| self.locals.contains_key(*name))
            .map(|name| ModelError::DuplicateName(*name, NameScope::Local))
            .collect()
    }
}

impl<Ax, Vd: HasSignature> Model<Ax, Vd> {
    /// Every view prototype referenced by a `view_defs` entry must have
    /// exactly one entry; this returns the prototypes that have more than
    /// one (spec.md §3 "Invariants").
    pub fn check_one_viewdef_per_prototype(&self) -> Vec<ModelError> {
        let mut seen: HashMap<Symbol, usize> = HashMap::new();
        for vd in &self.view_defs {
            for iterated in vd.signature() {
                *seen.entry(iterated.item.name).or_insert(0) += 1;
            }
        }
        seen.into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| ModelError::DuplicateName(name, NameScope::ViewProto))
            .collect()
    }

    /// Builds name+arity+parameter-types prototype table derived from the
    /// declared view definitions (spec.md §3 "Invariants": "Every VFunc in
    /// any view refers by name+arity+parameter-types to a declared
    /// prototype").
    pub fn prototype_table(&self) -> HashMap<Symbol, Vec<Ty>> {
        let mut table = HashMap::new();
        for vd in &self.view_defs {
            for iterated in vd.signature() {
                let tys = iterated.item.params.iter().map(|p| p.ty).collect();
                table.insert(iterated.item.name, tys);
            }
        }
        table
    }
}
