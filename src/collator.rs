//! Partitions a parsed script into its five declaration kinds, preserving
//! source order within each bucket (spec.md §4.4).
//!
//! Pure; the only thing that can go wrong here is a malformed `ScriptItem`
//! list, which the parser never produces, so this stage has no error type.

use crate::ast::{ConstraintDecl, MethodDecl, ScriptItem, VarDecl, ViewProtoDecl};

/// A script's items, partitioned by kind. Each field keeps the items' source
/// order (spec.md §4.4: "preserving source order").
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collated {
    pub globals: Vec<VarDecl>,
    pub locals: Vec<VarDecl>,
    pub protos: Vec<ViewProtoDecl>,
    pub constraints: Vec<ConstraintDecl>,
    pub methods: Vec<MethodDecl>,
}

impl Collated {
    /// Flattens back into a single item list, in bucket order
    /// `globals ++ locals ++ vprotos ++ constraints ++ methods`
    /// (spec.md §8 "Collate is inverse to flatten").
    pub fn flatten(&self) -> Vec<ScriptItem> {
        let mut out = Vec::with_capacity(
            self.globals.len()
                + self.locals.len()
                + self.protos.len()
                + self.constraints.len()
                + self.methods.len(),
        );
        out.extend(self.globals.iter().cloned().map(ScriptItem::Global));
        out.extend(self.locals.iter().cloned().map(ScriptItem::Local));
        out.extend(self.protos.iter().cloned().map(ScriptItem::ViewProto));
        out.extend(self.constraints.iter().cloned().map(ScriptItem::Constraint));
        out.extend(self.methods.iter().cloned().map(ScriptItem::Method));
        out
    }
}

/// One pass over `items`, sorting each into its bucket (spec.md §4.4:
/// "a single pass ... pure; no validation beyond shape").
pub fn collate(items: Vec<ScriptItem>) -> Collated {
    let mut out = Collated::default();
    for item in items {
        match item {
            ScriptItem::Global(d) => out.globals.push(d),
            ScriptItem::Local(d) => out.locals.push(d),
            ScriptItem::ViewProto(d) => out.protos.push(d),
            ScriptItem::Constraint(d) => out.constraints.push(d),
            ScriptItem::Method(d) => out.methods.push(d),
        }
    }
    out
}
