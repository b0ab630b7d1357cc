//! Conditional views: the Modeller's view-assertion output shape, where a
//! source-level `if`-expression nested inside a view assertion becomes an
//! `Ite` CFunc rather than being resolved immediately (spec.md §3 "CView").

use crate::expr::BoolExpr;
use crate::view::{Multiset, VFunc};

/// Either a plain func application or a conditional expansion over two
/// nested conditional views.
#[derive(Debug, Clone, PartialEq)]
pub enum CFunc {
    Plain(VFunc),
    Ite(BoolExpr, CView, CView),
}

impl CFunc {
    pub fn plain(f: VFunc) -> Self {
        CFunc::Plain(f)
    }

    pub fn ite(cond: BoolExpr, then_view: CView, else_view: CView) -> Self {
        CFunc::Ite(cond, then_view, else_view)
    }
}

/// A multiset of CFuncs — the Modeller's normal form for a view assertion
/// (spec.md §3 "CView").
pub type CView = Multiset<CFunc>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;
    use crate::view::Func;

    #[test]
    fn plain_cview_has_one_entry() {
        let mut interner = Interner::new();
        let name = interner.intern("holdLock");
        let f: VFunc = Func::new(name, vec![]);
        let cv: CView = Multiset::singleton(CFunc::plain(f));
        assert_eq!(cv.len(), 1);
    }

    #[test]
    fn ite_cfunc_nests_two_cviews() {
        let mut interner = Interner::new();
        let hold_lock = interner.intern("holdLock");
        let hold_tick = interner.intern("holdTick");
        let then_view: CView = Multiset::singleton(CFunc::plain(Func::new(hold_lock, vec![])));
        let else_view: CView = Multiset::singleton(CFunc::plain(Func::new(hold_tick, vec![])));
        let ite = CFunc::ite(BoolExpr::lit(true), then_view.clone(), else_view.clone());
        match ite {
            CFunc::Ite(cond, t, e) => {
                assert_eq!(cond, BoolExpr::lit(true));
                assert_eq!(t, then_view);
                assert_eq!(e, else_view);
            }
            _ => panic!("expected Ite"),
        }
    }
}
