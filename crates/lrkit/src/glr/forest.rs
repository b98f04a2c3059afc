//! Packed-forest traversal.
//!
//! A [`Forest`] is a read-only view over the symbol-node arena under the
//! accepted roots. [`TreeIter`] enumerates concrete derivation trees one at
//! a time without ever materializing the full set: its only state is an
//! explicit cursor of `(node, alternative)` decisions taken at ambiguous
//! nodes in depth-first order, advanced rightmost-first like an odometer.
//! Enumeration cost is proportional to the trees actually pulled, so a
//! caller can take the first tree of an exponentially ambiguous parse and
//! stop.

use super::gss::{Gss, NodeId, SymbolNode};
use crate::table::{NontermId, TermId};
use hashbrown::HashMap;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// One fully disambiguated derivation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum DerivTree {
    Leaf {
        terminal: TermId,
        position: usize,
    },
    Node {
        nonterminal: NontermId,
        children: Vec<DerivTree>,
    },
}

impl DerivTree {
    /// Leaf terminals left to right.
    #[must_use]
    pub fn fringe(&self) -> Vec<TermId> {
        let mut out = Vec::new();
        self.collect_fringe(&mut out);
        out
    }

    fn collect_fringe(&self, out: &mut Vec<TermId>) {
        match self {
            Self::Leaf { terminal, .. } => out.push(*terminal),
            Self::Node { children, .. } => {
                for child in children {
                    child.collect_fringe(out);
                }
            }
        }
    }
}

/// Read-only view over the packed forest below a set of roots.
#[derive(Debug, Clone, Copy)]
pub struct Forest<'a> {
    gss: &'a Gss,
    roots: &'a [NodeId],
}

impl<'a> Forest<'a> {
    pub(crate) fn new(gss: &'a Gss, roots: &'a [NodeId]) -> Self {
        Self { gss, roots }
    }

    /// The accepted root nodes.
    #[must_use]
    pub fn roots(&self) -> &'a [NodeId] {
        self.roots
    }

    /// Lazy enumeration of every derivation tree.
    #[must_use]
    pub fn trees(&self) -> TreeIter<'a> {
        TreeIter {
            gss: self.gss,
            roots: self.roots,
            root_index: 0,
            cursor: Vec::new(),
            started: false,
            exhausted: self.roots.is_empty(),
        }
    }

    /// Total number of derivation trees, computed by counting over the
    /// shared structure rather than by enumeration. Saturates at
    /// `usize::MAX`.
    #[must_use]
    pub fn tree_count(&self) -> usize {
        let mut memo: HashMap<NodeId, usize, ahash::RandomState> = HashMap::default();
        self.roots
            .iter()
            .fold(0usize, |sum, &root| sum.saturating_add(self.count(root, &mut memo)))
    }

    /// Whether more than one derivation exists.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.tree_count() > 1
    }

    fn count(&self, node: NodeId, memo: &mut HashMap<NodeId, usize, ahash::RandomState>) -> usize {
        if let Some(&cached) = memo.get(&node) {
            return cached;
        }
        let total = match self.gss.node(node) {
            SymbolNode::Leaf { .. } => 1,
            SymbolNode::Packed { alternatives, .. } => {
                alternatives.iter().fold(0usize, |sum, children| {
                    let trees = children
                        .iter()
                        .fold(1usize, |product, &child| {
                            product.saturating_mul(self.count(child, memo))
                        });
                    sum.saturating_add(trees)
                })
            }
        };
        memo.insert(node, total);
        total
    }
}

/// One recorded choice: which alternative was taken at an ambiguous node.
#[derive(Debug, Clone, Copy)]
struct Decision {
    node: NodeId,
    alternative: usize,
}

/// Restartable derivation-tree iterator.
///
/// Each call to [`next`](Iterator::next) rebuilds a tree from the cursor
/// prefix, appending zero-decisions for ambiguous nodes first visited on
/// this walk, then steps the cursor to the next combination. After the last
/// tree the iterator stays exhausted; further calls return `None`.
pub struct TreeIter<'a> {
    gss: &'a Gss,
    roots: &'a [NodeId],
    root_index: usize,
    cursor: Vec<Decision>,
    started: bool,
    exhausted: bool,
}

impl<'a> TreeIter<'a> {
    /// Build the tree selected by the current cursor, extending the cursor
    /// with first-alternative decisions at nodes it has not covered yet.
    fn build(&mut self) -> DerivTree {
        let mut pos = 0;
        self.build_node(self.roots[self.root_index], &mut pos)
    }

    fn build_node(&mut self, node: NodeId, pos: &mut usize) -> DerivTree {
        let gss = self.gss;
        match gss.node(node) {
            SymbolNode::Leaf { terminal, position } => DerivTree::Leaf {
                terminal: *terminal,
                position: *position,
            },
            SymbolNode::Packed {
                nonterminal,
                alternatives,
            } => {
                let alternative = if alternatives.len() > 1 {
                    let chosen = if *pos < self.cursor.len() {
                        self.cursor[*pos].alternative
                    } else {
                        self.cursor.push(Decision {
                            node,
                            alternative: 0,
                        });
                        0
                    };
                    *pos += 1;
                    chosen
                } else {
                    0
                };
                let children = alternatives[alternative]
                    .iter()
                    .map(|&child| self.build_node(child, pos))
                    .collect();
                DerivTree::Node {
                    nonterminal: *nonterminal,
                    children,
                }
            }
        }
    }

    /// Step the cursor to the next combination: bump the rightmost decision
    /// with alternatives left, dropping everything recorded after it (the
    /// subtree below a changed choice is rebuilt fresh). With no bumpable
    /// decision, move to the next root.
    fn step(&mut self) {
        while let Some(decision) = self.cursor.last_mut() {
            let count = self.gss.node(decision.node).alternative_count();
            if decision.alternative + 1 < count {
                decision.alternative += 1;
                return;
            }
            self.cursor.pop();
        }
        self.root_index += 1;
        if self.root_index >= self.roots.len() {
            self.exhausted = true;
        }
    }
}

impl Iterator for TreeIter<'_> {
    type Item = DerivTree;

    fn next(&mut self) -> Option<DerivTree> {
        if self.exhausted {
            return None;
        }
        if self.started {
            self.step();
            if self.exhausted {
                return None;
            }
        } else {
            self.started = true;
        }
        Some(self.build())
    }
}

impl std::iter::FusedIterator for TreeIter<'_> {}
