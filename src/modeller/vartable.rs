//! Name resolution: builds the global/local variable maps and the view
//! prototype table, rejecting duplicate names (spec.md §4.5 responsibilities
//! 1-2).

use crate::ast::{VarDecl, ViewProtoDecl};
use crate::error::{ModelError, NameScope};
use crate::intern::Symbol;
use crate::types::Ty;
use crate::var::Scope;
use std::collections::HashMap;

/// `globals`/`locals` built from the collated declaration lists. Disjointness
/// between the two maps is checked later via `Model::check_disjoint_scopes`,
/// once both have been folded into a `Model` (spec.md §3 "Invariants").
pub struct VarMaps {
    pub globals: HashMap<Symbol, Ty>,
    pub locals: HashMap<Symbol, Ty>,
}

fn build_one_scope(decls: &[VarDecl], scope: NameScope) -> (HashMap<Symbol, Ty>, Vec<ModelError>) {
    let mut map = HashMap::new();
    let mut errors = Vec::new();
    for d in decls {
        if map.insert(d.name, d.ty).is_some() {
            errors.push(ModelError::DuplicateName(d.name, scope));
        }
    }
    (map, errors)
}

pub fn build(globals: &[VarDecl], locals: &[VarDecl]) -> (VarMaps, Vec<ModelError>) {
    let (globals, mut errors) = build_one_scope(globals, NameScope::Global);
    let (locals, local_errors) = build_one_scope(locals, NameScope::Local);
    errors.extend(local_errors);
    (VarMaps { globals, locals }, errors)
}

/// Read-only view over the two variable maps, used by `typecheck` to
/// resolve identifiers to their declared type and scope.
pub struct VarMap<'a> {
    pub globals: &'a HashMap<Symbol, Ty>,
    pub locals: &'a HashMap<Symbol, Ty>,
}

impl<'a> VarMap<'a> {
    pub fn new(globals: &'a HashMap<Symbol, Ty>, locals: &'a HashMap<Symbol, Ty>) -> Self {
        VarMap { globals, locals }
    }

    pub fn lookup(&self, name: Symbol) -> Result<(Ty, Scope), ModelError> {
        if let Some(ty) = self.globals.get(&name) {
            return Ok((*ty, Scope::Shared));
        }
        if let Some(ty) = self.locals.get(&name) {
            return Ok((*ty, Scope::Thread));
        }
        Err(ModelError::UnknownIdentifier(name))
    }
}

/// name → declared parameter types, built directly from the `view` proto
/// declarations (spec.md §4.5 responsibility 2: "name → (parameter types,
/// iteration flag, anonymity flag)" — the iteration/anonymity flags are
/// derived from `Iterated::mult` presence where a prototype is used, rather
/// than stored here; see DESIGN.md).
pub struct ProtoTable(pub HashMap<Symbol, Vec<Ty>>);

impl ProtoTable {
    pub fn get(&self, name: Symbol) -> Option<&[Ty]> {
        self.0.get(&name).map(|v| v.as_slice())
    }
}

pub fn build_protos(protos: &[ViewProtoDecl]) -> (ProtoTable, Vec<ModelError>) {
    let mut table = HashMap::new();
    let mut errors = Vec::new();
    for p in protos {
        let tys = p.params.iter().map(|(ty, _)| *ty).collect();
        if table.insert(p.name, tys).is_some() {
            errors.push(ModelError::DuplicateName(p.name, NameScope::ViewProto));
        }
    }
    (ProtoTable(table), errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;
    use crate::span::Span;

    fn decl(interner: &mut Interner, name: &str, ty: Ty) -> VarDecl {
        VarDecl { scope: Scope::Shared, ty, name: interner.intern(name), span: Span::new(0, 0) }
    }

    #[test]
    fn duplicate_global_name_is_reported() {
        let mut interner = Interner::new();
        let a = decl(&mut interner, "x", Ty::Int);
        let b = decl(&mut interner, "x", Ty::Bool);
        let (_, errors) = build(&[a, b], &[]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn lookup_finds_global_and_local_with_correct_scope() {
        let mut interner = Interner::new();
        let g = decl(&mut interner, "ticket", Ty::Int);
        let l = decl(&mut interner, "t", Ty::Int);
        let (maps, errors) = build(&[g], &[l]);
        assert!(errors.is_empty());
        let vm = VarMap::new(&maps.globals, &maps.locals);
        assert_eq!(vm.lookup(interner.intern("ticket")), Ok((Ty::Int, Scope::Shared)));
        assert_eq!(vm.lookup(interner.intern("t")), Ok((Ty::Int, Scope::Thread)));
    }

    #[test]
    fn unknown_identifier_is_reported() {
        let mut interner = Interner::new();
        let maps = VarMaps { globals: HashMap::new(), locals: HashMap::new() };
        let vm = VarMap::new(&maps.globals, &maps.locals);
        let name = interner.intern("nope");
        assert_eq!(vm.lookup(name), Err(ModelError::UnknownIdentifier(name)));
    }
}
