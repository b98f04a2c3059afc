//! Graph-structured stack.
//!
//! Two index-addressed arenas: state vertices (the automaton states live at
//! some generation, with fan-in links to their predecessors) and symbol
//! nodes (token leaves and packed nonterminal instances, the forest).
//! A [`Link`] flattens the alternating state→symbol→state edge pair: it
//! names the symbol node on the edge and the predecessor state vertex below
//! it.
//!
//! Everything is append-only for the lifetime of a parse: existing entries
//! only ever gain new links or new packed alternatives. Both kinds of
//! append are deduplicated structurally: a link by its `(sym, prev)` pair,
//! an alternative by element-wise equality of its child sequence, so no
//! derivation is stored twice.

use crate::table::{NontermId, StateId, TermId};
use smallvec::SmallVec;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Index of a state vertex in the GSS arena.
pub type VertexId = usize;
/// Index of a symbol node in the forest arena.
pub type NodeId = usize;

/// Child sequence of one derivation alternative, leftmost symbol first.
pub type ChildSeq = SmallVec<[NodeId; 4]>;

/// Edge from a state vertex down to its predecessor, labeled with the
/// symbol node spanning the gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Link {
    pub sym: NodeId,
    pub prev: VertexId,
}

#[derive(Debug, Clone)]
struct StateVertex {
    state: StateId,
    generation: usize,
    links: SmallVec<[Link; 2]>,
}

/// Forest node: a token leaf, or a nonterminal instance holding one or
/// more alternative child sequences. More than one alternative signals
/// ambiguity over that span.
#[derive(Debug, Clone)]
pub enum SymbolNode {
    Leaf {
        terminal: TermId,
        /// Input position of the token (0-based).
        position: usize,
    },
    Packed {
        nonterminal: NontermId,
        alternatives: Vec<ChildSeq>,
    },
}

impl SymbolNode {
    /// Number of alternative derivations stored on this node.
    #[must_use]
    pub fn alternative_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Packed { alternatives, .. } => alternatives.len(),
        }
    }
}

/// One recovered ancestor path: the symbol nodes a linear parse would have
/// popped (leftmost first) and the state vertex left underneath.
#[derive(Debug, Clone)]
pub struct AncestorPath {
    pub symbols: ChildSeq,
    pub base: VertexId,
}

/// The shared graph stack for one generalized-parse session.
#[derive(Debug, Default)]
pub struct Gss {
    vertices: Vec<StateVertex>,
    nodes: Vec<SymbolNode>,
}

impl Gss {
    #[must_use]
    pub fn with_capacity(vertices: usize, nodes: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            nodes: Vec::with_capacity(nodes),
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.nodes.clear();
    }

    /// Append a state vertex with no links yet.
    pub fn add_vertex(&mut self, state: StateId, generation: usize) -> VertexId {
        let id = self.vertices.len();
        self.vertices.push(StateVertex {
            state,
            generation,
            links: SmallVec::new(),
        });
        id
    }

    /// Attach a link unless an identical `(sym, prev)` link already exists.
    /// Returns whether the link was added.
    pub fn add_link(&mut self, vertex: VertexId, link: Link) -> bool {
        let links = &mut self.vertices[vertex].links;
        if links.contains(&link) {
            return false;
        }
        links.push(link);
        true
    }

    /// Append a token leaf node.
    pub fn add_leaf(&mut self, terminal: TermId, position: usize) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(SymbolNode::Leaf { terminal, position });
        id
    }

    /// Append a nonterminal node with its first alternative.
    pub fn add_packed(&mut self, nonterminal: NontermId, children: ChildSeq) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(SymbolNode::Packed {
            nonterminal,
            alternatives: vec![children],
        });
        id
    }

    /// Record a further derivation alternative on a nonterminal node,
    /// suppressed when a structurally equal child sequence is already
    /// stored. Returns whether the alternative was added.
    ///
    /// # Panics
    ///
    /// Panics if `node` is a token leaf; leaves never gain alternatives.
    pub fn add_alternative(&mut self, node: NodeId, children: ChildSeq) -> bool {
        match &mut self.nodes[node] {
            SymbolNode::Packed { alternatives, .. } => {
                if alternatives.iter().any(|alt| *alt == children) {
                    return false;
                }
                alternatives.push(children);
                true
            }
            SymbolNode::Leaf { .. } => panic!("add_alternative on a token leaf"),
        }
    }

    #[must_use]
    pub fn state(&self, vertex: VertexId) -> StateId {
        self.vertices[vertex].state
    }

    #[must_use]
    pub fn generation(&self, vertex: VertexId) -> usize {
        self.vertices[vertex].generation
    }

    #[must_use]
    pub fn links(&self, vertex: VertexId) -> &[Link] {
        &self.vertices[vertex].links
    }

    #[must_use]
    pub fn node(&self, node: NodeId) -> &SymbolNode {
        &self.nodes[node]
    }

    #[must_use]
    pub fn nodes(&self) -> &[SymbolNode] {
        &self.nodes
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All ancestor paths of `len` symbols below `vertex`. With `via` set,
    /// only paths whose first (topmost) link is exactly that link, used to
    /// re-run reductions through a freshly added edge without revisiting
    /// paths already explored.
    #[must_use]
    pub fn paths(&self, vertex: VertexId, len: usize, via: Option<Link>) -> Vec<AncestorPath> {
        let mut results = Vec::new();
        if len == 0 {
            results.push(AncestorPath {
                symbols: ChildSeq::new(),
                base: vertex,
            });
            return results;
        }
        let mut rightmost: ChildSeq = ChildSeq::new();
        self.walk(vertex, len, via, &mut rightmost, &mut results);
        results
    }

    fn walk(
        &self,
        vertex: VertexId,
        remaining: usize,
        via: Option<Link>,
        collected: &mut ChildSeq,
        results: &mut Vec<AncestorPath>,
    ) {
        for &link in &self.vertices[vertex].links {
            if let Some(required) = via {
                if link != required {
                    continue;
                }
            }
            collected.push(link.sym);
            if remaining == 1 {
                // Collected rightmost-first; flip into production order.
                let symbols: ChildSeq = collected.iter().rev().copied().collect();
                results.push(AncestorPath {
                    symbols,
                    base: link.prev,
                });
            } else {
                self.walk(link.prev, remaining - 1, None, collected, results);
            }
            collected.pop();
        }
    }

    /// Structural snapshot for an external renderer.
    #[must_use]
    pub fn snapshot(&self) -> GssSnapshot {
        GssSnapshot {
            vertices: self
                .vertices
                .iter()
                .enumerate()
                .map(|(id, v)| VertexSnapshot {
                    id,
                    state: v.state,
                    generation: v.generation,
                    links: v.links.to_vec(),
                })
                .collect(),
            nodes: self
                .nodes
                .iter()
                .enumerate()
                .map(|(id, node)| match node {
                    SymbolNode::Leaf { terminal, position } => NodeSnapshot::Leaf {
                        id,
                        terminal: *terminal,
                        position: *position,
                    },
                    SymbolNode::Packed {
                        nonterminal,
                        alternatives,
                    } => NodeSnapshot::Packed {
                        id,
                        nonterminal: *nonterminal,
                        alternatives: alternatives.iter().map(|alt| alt.to_vec()).collect(),
                    },
                })
                .collect(),
        }
    }
}

/// Renderer-facing copy of the graph: stable ids, labels, generations, and
/// child-edge lists. Rendering itself lives outside the core.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct GssSnapshot {
    pub vertices: Vec<VertexSnapshot>,
    pub nodes: Vec<NodeSnapshot>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct VertexSnapshot {
    pub id: VertexId,
    pub state: StateId,
    pub generation: usize,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum NodeSnapshot {
    Leaf {
        id: NodeId,
        terminal: TermId,
        position: usize,
    },
    Packed {
        id: NodeId,
        nonterminal: NontermId,
        alternatives: Vec<Vec<NodeId>>,
    },
}
