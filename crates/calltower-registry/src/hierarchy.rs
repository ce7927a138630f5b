//! Class hierarchy graph.
//!
//! Uses petgraph's DiGraph with:
//! - Nodes: classifier ids
//! - Edges: subtype -> direct supertype, in declaration order

use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

use calltower_core::SymbolId;

/// Supertype relation between registered classifiers.
#[derive(Debug, Default)]
pub struct ClassHierarchy {
    graph: DiGraph<SymbolId, ()>,
    nodes: FxHashMap<SymbolId, NodeIndex>,
}

impl ClassHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the node of a classifier.
    pub fn add_class(&mut self, class: SymbolId) -> NodeIndex {
        if let Some(&node) = self.nodes.get(&class) {
            return node;
        }
        let node = self.graph.add_node(class);
        self.nodes.insert(class, node);
        node
    }

    /// Record that `sub` directly extends or implements `sup`.
    pub fn add_supertype(&mut self, sub: SymbolId, sup: SymbolId) {
        let from = self.add_class(sub);
        let to = self.add_class(sup);
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ());
        }
    }

    /// Direct supertypes of `class`, in declaration order.
    pub fn direct_supertypes(&self, class: SymbolId) -> Vec<SymbolId> {
        let Some(&node) = self.nodes.get(&class) else {
            return Vec::new();
        };
        // petgraph walks outgoing edges newest first
        let mut supers: Vec<SymbolId> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .map(|n| self.graph[n])
            .collect();
        supers.reverse();
        supers
    }

    /// All supertypes of `class`, nearest first, each listed once.
    /// The class itself is not included.
    pub fn supertypes(&self, class: SymbolId) -> Vec<SymbolId> {
        let mut seen = FxHashSet::default();
        seen.insert(class);
        let mut order = Vec::new();
        let mut frontier = vec![class];

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for current in frontier {
                for sup in self.direct_supertypes(current) {
                    if seen.insert(sup) {
                        order.push(sup);
                        next.push(sup);
                    }
                }
            }
            frontier = next;
        }

        order
    }

    /// Whether `sub` reaches `sup` through supertype edges.
    pub fn is_subclass(&self, sub: SymbolId, sup: SymbolId) -> bool {
        if sub == sup {
            return true;
        }
        match (self.nodes.get(&sub), self.nodes.get(&sup)) {
            (Some(&from), Some(&to)) => has_path_connecting(&self.graph, from, to, None),
            _ => false,
        }
    }

    pub fn class_count(&self) -> usize {
        self.graph.node_count()
    }
}
