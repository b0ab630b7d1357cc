//! Transforms each method's `Block<GView>` into a per-method control-flow
//! graph of atomic Hoare-triple edges (spec.md §4.7 "Grapher").
//!
//! The four structural cases (Block, Prim, ITE, While/do-while) are
//! implemented exactly as spec.md §4.7 states them; `assume` edges reuse
//! the same primitive name the Modeller's semantics table already
//! recognises, and join/loop-entry wiring that carries no primitive uses an
//! empty `AxiomCmd::Seq` as its epsilon edge. A multi-statement atomic
//! block (`PartCmd::Seq`) reuses the same `AxiomCmd::Seq` shape non-empty,
//! carrying the Modeller's composed `Command` as one atomic edge.

use crate::command::{AxiomCmd, Block, Command, PartCmd};
use crate::error::{GraphError, StageError, StageErrors, StageResult};
use crate::expr::{BoolExpr, GAnyExpr};
use crate::gview::GView;
use crate::intern::{Interner, Symbol};
use crate::model::Model;
use crate::modeller::semantics::{self, PrimNames};
use crate::view::{Func, VFunc};
use crate::viewdef::{HasSignature, ViewExpr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub cmd: AxiomCmd,
}

/// A per-method control-flow graph: nodes carry a view assertion, edges
/// carry the atomic command executed along that transition. Entry and exit
/// nodes are distinguished (spec.md §3 "Graph").
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub method: Symbol,
    nodes: Vec<ViewExpr<GView>>,
    edges: Vec<Edge>,
    entry: NodeId,
    exit: NodeId,
}

impl Graph {
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    pub fn exit(&self) -> NodeId {
        self.exit
    }

    pub fn node(&self, id: NodeId) -> &ViewExpr<GView> {
        &self.nodes[id.0 as usize]
    }

    pub fn edges_from(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.from == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

struct Builder {
    nodes: Vec<ViewExpr<GView>>,
    edges: Vec<Edge>,
}

impl Builder {
    fn new() -> Self {
        Builder { nodes: Vec::new(), edges: Vec::new() }
    }

    fn push_node(&mut self, view: ViewExpr<GView>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(view);
        id
    }

    fn push_edge(&mut self, from: NodeId, to: NodeId, cmd: AxiomCmd) {
        self.edges.push(Edge { from, to, cmd });
    }
}

fn assume_edge(names: &PrimNames, cond: &BoolExpr, negate: bool) -> AxiomCmd {
    let cond = if negate { BoolExpr::not(cond.clone()) } else { cond.clone() };
    let f: VFunc = Func::new(names.assume, vec![GAnyExpr::Bool(cond)]);
    AxiomCmd::Prim(f)
}

fn epsilon() -> AxiomCmd {
    AxiomCmd::Seq(Command::new())
}

/// **Block** `{v0} s1 {v1} s2 … sn {vn}`: emit nodes labelled `v0, …, vn`;
/// recursively graph each `si` between `v_{i-1}` and `v_i` (spec.md §4.7).
fn graph_block(b: &mut Builder, names: &PrimNames, block: &Block<GView>) -> Result<(NodeId, NodeId), GraphError> {
    if !block.is_well_formed() {
        return Err(GraphError::new("block views and steps are out of alignment"));
    }
    let node_ids: Vec<NodeId> = block.views.iter().map(|v| b.push_node(v.clone())).collect();
    for (i, step) in block.steps.iter().enumerate() {
        graph_step(b, names, step, node_ids[i], node_ids[i + 1])?;
    }
    Ok((node_ids[0], *node_ids.last().expect("block always has at least one view")))
}

fn graph_step(
    b: &mut Builder,
    names: &PrimNames,
    cmd: &PartCmd<GView>,
    from: NodeId,
    to: NodeId,
) -> Result<(), GraphError> {
    match cmd {
        // **Prim(cmd)**: single edge from the preceding view node to the
        // following view node, labelled with the atomic command.
        PartCmd::Prim(f) => {
            b.push_edge(from, to, AxiomCmd::Prim(f.clone()));
            Ok(())
        }
        // A multi-statement atomic block is already one composed `Command`;
        // it carries the same single-edge shape as `Prim`, just with a
        // sequence of primitive calls instead of one.
        PartCmd::Seq(cmd) => {
            b.push_edge(from, to, AxiomCmd::Seq(cmd.clone()));
            Ok(())
        }
        // **ITE(b, t, e)**: assume(b)/assume(¬b) edges from entry into each
        // branch's entry, then epsilon edges from each branch's exit into
        // the shared join node (the ITE step's own exit view, already
        // allocated by the enclosing `graph_block`).
        PartCmd::ITE { cond, then_branch, else_branch } => {
            let (then_entry, then_exit) = graph_block(b, names, then_branch)?;
            let (else_entry, else_exit) = graph_block(b, names, else_branch)?;
            b.push_edge(from, then_entry, assume_edge(names, cond, false));
            b.push_edge(from, else_entry, assume_edge(names, cond, true));
            b.push_edge(then_exit, to, epsilon());
            b.push_edge(else_exit, to, epsilon());
            Ok(())
        }
        // **While(isDo, b, body)**: entry wiring depends on `isDo`; the
        // body-exit's loop-back/exit wiring does not.
        PartCmd::While { is_do_while, cond, inner } => {
            let (body_entry, body_exit) = graph_block(b, names, inner)?;
            if *is_do_while {
                b.push_edge(from, body_entry, epsilon());
            } else {
                b.push_edge(from, body_entry, assume_edge(names, cond, false));
                b.push_edge(from, to, assume_edge(names, cond, true));
            }
            b.push_edge(body_exit, body_entry, assume_edge(names, cond, false));
            b.push_edge(body_exit, to, assume_edge(names, cond, true));
            Ok(())
        }
    }
}

/// Graphs a single method body.
pub fn graph_method(method: Symbol, block: &Block<GView>, names: &PrimNames) -> Result<Graph, GraphError> {
    let mut b = Builder::new();
    let (entry, exit) = graph_block(&mut b, names, block)?;
    Ok(Graph { method, nodes: b.nodes, edges: b.edges, entry, exit })
}

/// Runs the Grapher over an entire guarded `Model`, replacing each
/// method's `Block<GView>` axiom with its `Graph`.
pub fn graph<Vd: HasSignature>(model: Model<Block<GView>, Vd>, interner: &mut Interner) -> StageResult<Model<Graph, Vd>> {
    let names = PrimNames::intern(interner);
    let _ = semantics::table; // the fixed table itself is not re-derived here; only its names are needed

    let mut out: Model<Graph, Vd> = Model::empty();
    out.globals = model.globals;
    out.locals = model.locals;
    out.semantics = model.semantics;
    out.view_defs = model.view_defs;

    let mut errors = Vec::new();
    for (name, block) in model.axioms {
        match graph_method(name, &block, &names) {
            Ok(g) => out.insert_axiom(name, g),
            Err(e) => errors.push(StageError::graph(e)),
        }
    }

    if errors.is_empty() {
        Ok(out)
    } else {
        Err(StageErrors(errors))
    }
}
