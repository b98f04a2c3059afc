//! # GLR Engine
//!
//! Breadth-first execution of a (possibly conflicted) table over the shared
//! graph stack. Each token runs a three-phase fixpoint:
//!
//! * **actor**: classify every live stack top against the action cell,
//!   queueing reductions and shift candidates;
//! * **reducer**: replay each queued reduction over every ancestor path,
//!   packing locally ambiguous results into one forest node and merging
//!   goto targets that land on an existing same-generation vertex. A merge
//!   that adds a link to an already-classified vertex re-queues that
//!   vertex's reductions constrained to the new link, so no path is missed
//!   and none is walked twice;
//! * **shifter**: consume the token, with one shared leaf node and one new vertex
//!   per distinct shift state with fan-in links from every candidate top.
//!
//! The machine is stepped one queue item at a time through
//! [`advance`](GlrParser::advance) (with [`post`](GlrParser::post) as the
//! run-to-completion wrapper), so a caller can observe or render the graph
//! between individual actions.
//!
//! There are no semantic callbacks here: the product of a generalized parse
//! is the packed derivation forest, walked afterwards via
//! [`forest`](GlrParser::forest).

pub mod forest;
mod gss;

pub use forest::{DerivTree, Forest, TreeIter};
pub use gss::{
    AncestorPath, ChildSeq, Gss, GssSnapshot, Link, NodeId, NodeSnapshot, SymbolNode, VertexId,
    VertexSnapshot,
};

use crate::table::{Action, ParseTable, ProdId, StateId, TermId};
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::sync::Arc;

/// Tuning knobs for the generalized engine.
#[derive(Debug, Clone, Default)]
pub struct GlrConfig {
    /// Preallocated state-vertex arena capacity.
    pub vertex_capacity: usize,
    /// Preallocated symbol-node arena capacity.
    pub node_capacity: usize,
}

/// One queued reduction: the vertex it fires from, the production, and an
/// optional link the recovered paths must start with.
#[derive(Debug, Clone, Copy)]
struct ReduceItem {
    vertex: VertexId,
    production: ProdId,
    via: Option<Link>,
}

/// Per-token working state, live between `begin_token` and the shifter.
#[derive(Debug)]
struct TokenCtx {
    terminal: TermId,
    /// The one leaf node every shift of this token shares.
    leaf: NodeId,
    /// Vertices awaiting classification.
    active: VecDeque<VertexId>,
    /// Vertices already classified this token.
    processed: HashSet<VertexId, ahash::RandomState>,
    reduce: VecDeque<ReduceItem>,
    /// Shift destination -> candidate stack tops.
    shift: HashMap<StateId, SmallVec<[VertexId; 2]>, ahash::RandomState>,
    /// Current-generation vertices by state, the merge target for gotos.
    created: HashMap<StateId, VertexId, ahash::RandomState>,
    /// Local ambiguity packing: `(base vertex, goto state, nonterminal)`
    /// -> the forest node collecting the alternatives.
    packed: HashMap<(VertexId, StateId, usize), NodeId, ahash::RandomState>,
}

/// Generalized table-driven parser producing a packed derivation forest.
///
/// Conflicted action cells are the expected input here; every entry of a
/// cell is explored. A grammar with no viable continuation anywhere simply
/// drains the frontier, which [`is_rejected`](Self::is_rejected) reports
/// after the next token boundary.
pub struct GlrParser {
    table: Arc<ParseTable>,
    gss: Gss,
    frontier: Vec<VertexId>,
    generation: usize,
    position: usize,
    accepted: bool,
    rejected: bool,
    roots: Vec<NodeId>,
    token: Option<TokenCtx>,
}

impl GlrParser {
    /// Create a session over any table, conflicted or not.
    #[must_use]
    pub fn new(table: Arc<ParseTable>, config: GlrConfig) -> Self {
        let mut parser = Self {
            table,
            gss: Gss::with_capacity(config.vertex_capacity, config.node_capacity),
            frontier: Vec::new(),
            generation: 0,
            position: 0,
            accepted: false,
            rejected: false,
            roots: Vec::new(),
            token: None,
        };
        parser.reset();
        parser
    }

    /// Drop all parse state and restart from the initial automaton state.
    pub fn reset(&mut self) {
        self.gss.clear();
        self.frontier.clear();
        self.generation = 0;
        self.position = 0;
        self.accepted = false;
        self.rejected = false;
        self.roots.clear();
        self.token = None;
        let start = self.gss.add_vertex(self.table.start_state(), 0);
        self.frontier.push(start);
    }

    /// Open a token: allocate its shared leaf and queue the whole frontier
    /// for classification. Steps are then taken with
    /// [`advance`](Self::advance).
    pub fn begin_token(&mut self, terminal: TermId) {
        let leaf = self.gss.add_leaf(terminal, self.position);
        let mut created: HashMap<StateId, VertexId, ahash::RandomState> = HashMap::default();
        for &vertex in &self.frontier {
            created.insert(self.gss.state(vertex), vertex);
        }
        self.token = Some(TokenCtx {
            terminal,
            leaf,
            active: self.frontier.iter().copied().collect(),
            processed: HashSet::default(),
            reduce: VecDeque::new(),
            shift: HashMap::default(),
            created,
            packed: HashMap::default(),
        });
    }

    /// Run one unit of work for the open token: classify one vertex, or
    /// replay one reduction, or (once both queues drain) perform the shift
    /// and close the token. Returns `false` when the token is finished (or
    /// no token is open).
    pub fn advance(&mut self) -> bool {
        enum Step {
            Actor(VertexId),
            Reduce(ReduceItem),
            Shift,
        }
        let step = match &mut self.token {
            Some(ctx) => {
                if let Some(vertex) = ctx.active.pop_front() {
                    Step::Actor(vertex)
                } else if let Some(item) = ctx.reduce.pop_front() {
                    Step::Reduce(item)
                } else {
                    Step::Shift
                }
            }
            None => return false,
        };
        match step {
            Step::Actor(vertex) => {
                self.actor_step(vertex);
                true
            }
            Step::Reduce(item) => {
                self.reducer_step(item);
                true
            }
            Step::Shift => {
                self.shifter_step();
                false
            }
        }
    }

    /// Feed one token to completion. Returns whether the parse is still
    /// live (some stack top survived, or acceptance was recorded).
    pub fn post(&mut self, terminal: TermId) -> bool {
        self.begin_token(terminal);
        while self.advance() {}
        !self.rejected
    }

    /// Whether an accept action has fired.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Whether every stack top died without acceptance.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        self.rejected
    }

    /// Forest roots recorded by accept actions, duplicates suppressed.
    #[must_use]
    pub fn accepted_roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// View of the packed forest under the accepted roots.
    #[must_use]
    pub fn forest(&self) -> Forest<'_> {
        Forest::new(&self.gss, &self.roots)
    }

    /// Live stack tops after the last completed token.
    #[must_use]
    pub fn frontier(&self) -> &[VertexId] {
        &self.frontier
    }

    /// Number of completed tokens (equals the current generation).
    #[must_use]
    pub const fn generation(&self) -> usize {
        self.generation
    }

    /// The underlying graph stack.
    #[must_use]
    pub fn gss(&self) -> &Gss {
        &self.gss
    }

    /// Structural snapshot of the graph for external rendering.
    #[must_use]
    pub fn snapshot(&self) -> GssSnapshot {
        self.gss.snapshot()
    }

    fn actor_step(&mut self, vertex: VertexId) {
        let Some(ctx) = &mut self.token else {
            return;
        };
        if !ctx.processed.insert(vertex) {
            return;
        }
        let state = self.gss.state(vertex);
        let terminal = ctx.terminal;
        for &action in self.table.actions(state, terminal) {
            match action {
                Action::Shift(dest) => {
                    ctx.shift.entry(dest).or_default().push(vertex);
                }
                Action::Reduce(production) => {
                    ctx.reduce.push_back(ReduceItem {
                        vertex,
                        production,
                        via: None,
                    });
                }
                Action::Accept => {
                    self.accepted = true;
                    for link in self.gss.links(vertex) {
                        if !self.roots.contains(&link.sym) {
                            self.roots.push(link.sym);
                        }
                    }
                }
                Action::Error => {}
            }
        }
    }

    fn reducer_step(&mut self, item: ReduceItem) {
        let production = *self.table.production(item.production);
        let paths = self.gss.paths(item.vertex, production.rhs_len, item.via);
        for path in paths {
            let base_state = self.gss.state(path.base);
            let Some(dest) = self.table.goto(base_state, production.lhs) else {
                continue;
            };
            let Some(ctx) = &mut self.token else {
                return;
            };
            let key = (path.base, dest, production.lhs);
            let sym = match ctx.packed.get(&key) {
                Some(&node) => {
                    self.gss.add_alternative(node, path.symbols);
                    node
                }
                None => {
                    let node = self.gss.add_packed(production.lhs, path.symbols);
                    ctx.packed.insert(key, node);
                    node
                }
            };
            let link = Link {
                sym,
                prev: path.base,
            };
            match ctx.created.get(&dest) {
                Some(&target) => {
                    if self.gss.add_link(target, link) && ctx.processed.contains(&target) {
                        // The merge target was already classified; its
                        // reductions never saw this link. Replay them
                        // constrained to the new edge.
                        for &action in self.table.actions(dest, ctx.terminal) {
                            if let Action::Reduce(production) = action {
                                if self.table.production(production).rhs_len > 0 {
                                    ctx.reduce.push_back(ReduceItem {
                                        vertex: target,
                                        production,
                                        via: Some(link),
                                    });
                                }
                            }
                        }
                    }
                }
                None => {
                    let target = self.gss.add_vertex(dest, self.generation);
                    self.gss.add_link(target, link);
                    ctx.created.insert(dest, target);
                    ctx.active.push_back(target);
                }
            }
        }
    }

    fn shifter_step(&mut self) {
        let Some(ctx) = self.token.take() else {
            return;
        };
        self.frontier.clear();
        self.generation += 1;
        self.position += 1;
        // Deterministic vertex order regardless of hash seeding.
        let mut dests: Vec<StateId> = ctx.shift.keys().copied().collect();
        dests.sort_unstable();
        for dest in dests {
            let vertex = self.gss.add_vertex(dest, self.generation);
            for &base in &ctx.shift[&dest] {
                self.gss.add_link(
                    vertex,
                    Link {
                        sym: ctx.leaf,
                        prev: base,
                    },
                );
            }
            self.frontier.push(vertex);
        }
        if self.frontier.is_empty() && !self.accepted {
            self.rejected = true;
        }
    }
}
