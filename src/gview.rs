//! Guarded views: the Guarder's output shape, where every conditional
//! nest has been flattened into a conjunction of path conditions on each
//! leaf func (spec.md §3 "GView", §4.6 "Guarder").

use crate::expr::BoolExpr;
use crate::view::{Multiset, VFunc};

/// A func paired with the Boolean condition under which it is present.
#[derive(Debug, Clone, PartialEq)]
pub struct GFunc {
    pub guard: BoolExpr,
    pub item: VFunc,
}

impl GFunc {
    pub fn new(guard: BoolExpr, item: VFunc) -> Self {
        GFunc { guard, item }
    }
}

/// A multiset of guarded funcs (spec.md §3 "GView").
pub type GView = Multiset<GFunc>;

/// Conjoin `g` onto every element's existing guard (spec.md §4.2 "Guarded
/// views compose by distributing guards").
pub fn guard_all(g: &BoolExpr, view: GView) -> GView {
    view.map(|gf| GFunc::new(BoolExpr::and(vec![g.clone(), gf.guard]), gf.item))
}

/// Merge structurally equal guarded funcs (same underlying `VFunc`) by
/// or-ing their guards together. Improves downstream VC size; not required
/// for soundness (spec.md §4.6).
pub fn canonicalize(view: GView) -> GView {
    let mut out: Vec<GFunc> = Vec::new();
    for (gf, n) in view.to_vec() {
        if let Some(existing) = out.iter_mut().find(|e| e.item == gf.item) {
            existing.guard = BoolExpr::or(vec![existing.guard.clone(), gf.guard]);
        } else {
            for _ in 0..n {
                out.push(gf.clone());
            }
        }
    }
    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;
    use crate::view::Func;

    #[test]
    fn guard_all_conjoins_onto_every_element() {
        let mut interner = Interner::new();
        let name = interner.intern("holdLock");
        let f: VFunc = Func::new(name, vec![]);
        let view: GView = Multiset::singleton(GFunc::new(BoolExpr::lit(true), f));
        let guarded = guard_all(&BoolExpr::lit(false), view);
        let entries = guarded.to_vec();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].0.guard,
            BoolExpr::and(vec![BoolExpr::lit(false), BoolExpr::lit(true)])
        );
    }

    #[test]
    fn canonicalize_ors_guards_of_structurally_equal_funcs() {
        let mut interner = Interner::new();
        let name = interner.intern("holdLock");
        let f: VFunc = Func::new(name, vec![]);
        let mut view: GView = Multiset::new();
        view.insert(GFunc::new(BoolExpr::lit(true), f.clone()), 1);
        view.insert(GFunc::new(BoolExpr::lit(false), f), 1);
        let merged = canonicalize(view);
        let entries = merged.to_vec();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].0.guard,
            BoolExpr::or(vec![BoolExpr::lit(true), BoolExpr::lit(false)])
        );
    }

    #[test]
    fn canonicalize_leaves_distinct_funcs_separate() {
        let mut interner = Interner::new();
        let hold_lock = interner.intern("holdLock");
        let hold_tick = interner.intern("holdTick");
        let mut view: GView = Multiset::new();
        view.insert(GFunc::new(BoolExpr::lit(true), Func::new(hold_lock, vec![])), 1);
        view.insert(GFunc::new(BoolExpr::lit(true), Func::new(hold_tick, vec![])), 1);
        let merged = canonicalize(view);
        assert_eq!(merged.len(), 2);
    }
}
