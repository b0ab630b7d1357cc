//! View usage kinds and the per-prototype semantic constraints that give
//! view predicates their meaning (spec.md §3 "ViewExpr", "ViewDef").

use crate::expr::BoolExpr;
use crate::intern::Symbol;
use crate::view::DView;

/// Whether a view assertion must be exercised by the proof, or may be
/// elided. Guarder, grapher, and any downstream VC generator must respect
/// this tag (spec.md §3 "ViewExpr").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Mandatory,
    Advisory,
}

/// A view assertion together with its usage kind. Generic over the view
/// representation in play at a given pipeline stage: `CView` after the
/// Modeller, `GView` after the Guarder (spec.md §3 "ViewExpr").
#[derive(Debug, Clone, PartialEq)]
pub struct ViewExpr<Vw> {
    pub kind: ViewKind,
    pub view: Vw,
}

impl<Vw> ViewExpr<Vw> {
    pub fn mandatory(view: Vw) -> Self {
        ViewExpr { kind: ViewKind::Mandatory, view }
    }

    pub fn advisory(view: Vw) -> Self {
        ViewExpr { kind: ViewKind::Advisory, view }
    }

    pub fn is_mandatory(&self) -> bool {
        self.kind == ViewKind::Mandatory
    }
}

/// The semantic constraint attached to a declared view prototype
/// (spec.md §3 "ViewDef").
#[derive(Debug, Clone, PartialEq)]
pub enum ViewDef {
    /// The view is semantically equivalent to the Boolean body.
    Definite(DView, BoolExpr),
    /// Body is to be synthesised later; out of scope for the core.
    Indefinite(DView),
    /// Body is an opaque symbol, named by `Symbol`.
    Uninterpreted(DView, Symbol),
}

impl ViewDef {
    pub fn signature(&self) -> &DView {
        match self {
            ViewDef::Definite(sig, _) => sig,
            ViewDef::Indefinite(sig) => sig,
            ViewDef::Uninterpreted(sig, _) => sig,
        }
    }
}

/// Lets `Model`'s invariant checks reach a view-def's signature without
/// fixing the view-def type (spec.md §3 "Model ... parameterised by
/// axiom-type and view-def-type").
pub trait HasSignature {
    fn signature(&self) -> &DView;
}

impl HasSignature for ViewDef {
    fn signature(&self) -> &DView {
        ViewDef::signature(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;
    use crate::types::Ty;
    use crate::view::{Func, Iterated, View};

    #[test]
    fn mandatory_view_expr_reports_mandatory() {
        let view: View = View::new();
        let ve = ViewExpr::mandatory(view);
        assert!(ve.is_mandatory());
    }

    #[test]
    fn advisory_view_expr_reports_not_mandatory() {
        let view: View = View::new();
        let ve = ViewExpr::advisory(view);
        assert!(!ve.is_mandatory());
    }

    #[test]
    fn view_def_signature_accessor_covers_all_variants() {
        let mut interner = Interner::new();
        let name = interner.intern("holdLock");
        let dfunc = Func::new(name, vec![]);
        let sig: DView = vec![Iterated::single(dfunc)];

        let definite = ViewDef::Definite(sig.clone(), BoolExpr::lit(true));
        assert_eq!(definite.signature().len(), 1);

        let indefinite = ViewDef::Indefinite(sig.clone());
        assert_eq!(indefinite.signature().len(), 1);

        let sym_name = interner.intern("Opaque");
        let uninterpreted = ViewDef::Uninterpreted(sig, sym_name);
        assert_eq!(uninterpreted.signature().len(), 1);
        let _ = Ty::Bool;
    }
}
