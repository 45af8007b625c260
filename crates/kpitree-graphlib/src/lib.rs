//! Directed graph container used by `kpitree-layered`.
//!
//! Nodes and edges are kept in insertion order so that every query is deterministic for a fixed
//! build order. Adjacency lists are maintained eagerly; the graphs we lay out are small and are
//! never mutated after construction except for label updates.

#![forbid(unsafe_code)]

use rustc_hash::FxBuildHasher;
use std::hash::{Hash, Hasher};

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
}

impl EdgeKey {
    pub fn new(v: impl Into<String>, w: impl Into<String>) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
        }
    }
}

impl PartialEq for EdgeKey {
    fn eq(&self, other: &Self) -> bool {
        self.v == other.v && self.w == other.w
    }
}

impl Eq for EdgeKey {}

impl Hash for EdgeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.v.hash(state);
        self.w.hash(state);
    }
}

#[derive(Clone, Copy, Hash)]
struct EdgeKeyView<'a> {
    v: &'a str,
    w: &'a str,
}

impl<'a> hashbrown::Equivalent<EdgeKey> for EdgeKeyView<'a> {
    fn equivalent(&self, key: &EdgeKey) -> bool {
        key.v == self.v && key.w == self.w
    }
}

#[derive(Debug, Clone)]
struct NodeEntry<N> {
    id: String,
    label: N,
    out: Vec<usize>,
    in_: Vec<usize>,
}

#[derive(Debug, Clone)]
struct EdgeEntry<E> {
    key: EdgeKey,
    label: E,
}

/// A simple (non-multi, non-compound) directed graph with node labels `N`, edge labels `E` and a
/// graph label `G`.
#[derive(Debug, Clone)]
pub struct Graph<N, E, G> {
    graph_label: G,
    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,
    edges: Vec<EdgeEntry<E>>,
    edge_index: HashMap<EdgeKey, usize>,
}

impl<N, E, G> Default for Graph<N, E, G>
where
    N: Default,
    E: Default,
    G: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E, G> Graph<N, E, G>
where
    N: Default,
    E: Default,
    G: Default,
{
    pub fn new() -> Self {
        Self {
            graph_label: G::default(),
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
        }
    }

    pub fn set_graph(&mut self, label: G) -> &mut Self {
        self.graph_label = label;
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph_label
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph_label
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts a node, or replaces the label of an existing one without moving it.
    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return self;
        }
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            label,
            out: Vec::new(),
            in_: Vec::new(),
        });
        self.node_index.insert(id, idx);
        self
    }

    pub fn ensure_node(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            return self;
        }
        self.set_node(id, N::default())
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx].label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        self.node_index
            .get(id)
            .copied()
            .map(move |idx| &mut self.nodes[idx].label)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn for_each_node(&self, mut f: impl FnMut(&str, &N)) {
        for n in &self.nodes {
            f(&n.id, &n.label);
        }
    }

    pub fn for_each_node_mut(&mut self, mut f: impl FnMut(&str, &mut N)) {
        for n in &mut self.nodes {
            f(&n.id, &mut n.label);
        }
    }

    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        self.set_edge_inner(v.into(), w.into(), None)
    }

    pub fn set_edge_with_label(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        label: E,
    ) -> &mut Self {
        self.set_edge_inner(v.into(), w.into(), Some(label))
    }

    fn set_edge_inner(&mut self, v: String, w: String, label: Option<E>) -> &mut Self {
        if let Some(&idx) = self.edge_index.get(&EdgeKeyView { v: &v, w: &w }) {
            if let Some(label) = label {
                self.edges[idx].label = label;
            }
            return self;
        }

        self.ensure_node(v.clone());
        self.ensure_node(w.clone());
        let vi = self.node_index[&v];
        let wi = self.node_index[&w];

        let idx = self.edges.len();
        let key = EdgeKey { v, w };
        self.edges.push(EdgeEntry {
            key: key.clone(),
            label: label.unwrap_or_default(),
        });
        self.edge_index.insert(key, idx);
        self.nodes[vi].out.push(idx);
        self.nodes[wi].in_.push(idx);
        self
    }

    pub fn edge(&self, v: &str, w: &str) -> Option<&E> {
        self.edge_index
            .get(&EdgeKeyView { v, w })
            .map(|&idx| &self.edges[idx].label)
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<&E> {
        self.edge(&key.v, &key.w)
    }

    /// Successors of `v` in edge insertion order.
    pub fn successors(&self, v: &str) -> Vec<&str> {
        let Some(&vi) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.nodes[vi]
            .out
            .iter()
            .map(|&e| self.edges[e].key.w.as_str())
            .collect()
    }

    pub fn out_edges(&self, v: &str) -> Vec<EdgeKey> {
        let Some(&vi) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.nodes[vi]
            .out
            .iter()
            .map(|&e| self.edges[e].key.clone())
            .collect()
    }

    pub fn in_edges(&self, v: &str) -> Vec<EdgeKey> {
        let Some(&vi) = self.node_index.get(v) else {
            return Vec::new();
        };
        self.nodes[vi]
            .in_
            .iter()
            .map(|&e| self.edges[e].key.clone())
            .collect()
    }
}

pub mod alg {
    use super::Graph;
    use std::collections::VecDeque;

    /// Kahn topological sort. Ready nodes are visited in insertion order and successors in edge
    /// insertion order. Returns `None` when the graph contains a cycle.
    pub fn topsort<N, E, G>(g: &Graph<N, E, G>) -> Option<Vec<String>>
    where
        N: Default,
        E: Default,
        G: Default,
    {
        let mut indegree: Vec<usize> = g.nodes.iter().map(|n| n.in_.len()).collect();
        let mut queue: VecDeque<usize> = indegree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| i)
            .collect();

        let mut out: Vec<String> = Vec::with_capacity(g.nodes.len());
        while let Some(vi) = queue.pop_front() {
            out.push(g.nodes[vi].id.clone());
            for &e in &g.nodes[vi].out {
                let wi = g.node_index[&g.edges[e].key.w];
                indegree[wi] -= 1;
                if indegree[wi] == 0 {
                    queue.push_back(wi);
                }
            }
        }

        (out.len() == g.nodes.len()).then_some(out)
    }
}
