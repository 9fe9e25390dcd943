// Link graph data model

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Anchor with an edge to every retained HTML article.
pub const ARTICLES_NODE: &str = "_ARTICLES";
/// Anchor with an edge to every category page.
pub const CATEGORIES_NODE: &str = "_CATEGORIES";
pub const SENTINEL_NODES: [&str; 2] = [ARTICLES_NODE, CATEGORIES_NODE];

/// Path prefix of category pages in MediaWiki-derived archives.
pub const DEFAULT_CATEGORY_PREFIX: &str = "Category:";

pub fn is_sentinel(id: &str) -> bool {
    SENTINEL_NODES.contains(&id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// One of the two synthetic anchors.
    Sentinel,
    /// Alias for another entry; carries no content of its own.
    Redirect { title: String },
    /// A retained HTML entry.
    Article { title: String, mimetype: String },
    /// Known only as a link target; nothing about it was classified.
    Unresolved,
}

impl NodeKind {
    pub fn title(&self) -> Option<&str> {
        match self {
            NodeKind::Redirect { title } | NodeKind::Article { title, .. } => Some(title),
            _ => None,
        }
    }

    pub fn mimetype(&self) -> Option<&str> {
        match self {
            NodeKind::Article { mimetype, .. } => Some(mimetype),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
}

/// Counts reported by `stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub articles: usize,
    pub redirects: usize,
    pub unresolved: usize,
}

/// Directed link graph keyed by entry path.
///
/// Edges are unlabeled and collapsed: adding the same link twice keeps one
/// edge. Self-links and empty targets are dropped.
#[derive(Debug, Clone)]
pub struct LinkGraph {
    graph: DiGraph<Node, ()>,
    index: HashMap<String, NodeIndex>,
}

impl LinkGraph {
    /// A graph holding only the two sentinel anchors.
    pub fn new() -> Self {
        let mut graph = Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        };
        for sentinel in SENTINEL_NODES {
            graph.add_node(sentinel, NodeKind::Sentinel);
        }
        graph
    }

    /// Insert a node or update its kind.
    ///
    /// An `Unresolved` kind never replaces a classified one, so merging partial
    /// graphs gives the same result in any order.
    pub fn add_node(&mut self, id: &str, kind: NodeKind) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            if kind != NodeKind::Unresolved {
                self.graph[idx].kind = kind;
            }
            return idx;
        }

        let idx = self.graph.add_node(Node {
            id: id.to_string(),
            kind,
        });
        self.index.insert(id.to_string(), idx);
        idx
    }

    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        match self.index.get(id) {
            Some(&idx) => idx,
            None => self.add_node(id, NodeKind::Unresolved),
        }
    }

    /// Add a directed edge, creating unresolved endpoints as needed.
    /// Returns false when the edge is a self-link or has an empty endpoint.
    pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
        if source.is_empty() || target.is_empty() || source == target {
            return false;
        }
        let a = self.ensure_node(source);
        let b = self.ensure_node(target);
        self.graph.update_edge(a, b, ());
        true
    }

    /// Union `other` into this graph.
    pub fn merge(&mut self, other: LinkGraph) {
        for node in other.graph.node_weights() {
            self.add_node(&node.id, node.kind.clone());
        }
        for edge in other.graph.edge_references() {
            let source = &other.graph[edge.source()].id;
            let target = &other.graph[edge.target()].id;
            self.add_edge(source, target);
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.graph[idx]
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.node_index(id).map(|idx| &self.graph[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Title of a node, if it is known and has one.
    pub fn title(&self, id: &str) -> Option<&str> {
        self.get(id).and_then(|node| node.kind.title())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// The underlying petgraph graph, for traversal adaptors.
    pub fn digraph(&self) -> &DiGraph<Node, ()> {
        &self.graph
    }

    pub fn successors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Outgoing)
    }

    pub fn predecessors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Incoming)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        match (self.node_index(source), self.node_index(target)) {
            (Some(a), Some(b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.node_index(id)
            .map(|idx| self.successors(idx).count())
            .unwrap_or(0)
    }

    /// All edges as `(source, target)` identifier pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.graph.edge_references().map(|edge| {
            (
                self.graph[edge.source()].id.as_str(),
                self.graph[edge.target()].id.as_str(),
            )
        })
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            ..GraphStats::default()
        };
        for node in self.nodes() {
            match node.kind {
                NodeKind::Article { .. } => stats.articles += 1,
                NodeKind::Redirect { .. } => stats.redirects += 1,
                NodeKind::Unresolved => stats.unresolved += 1,
                NodeKind::Sentinel => {}
            }
        }
        stats
    }

    /// Order-independent view of the graph, used for equality.
    fn canonical(&self) -> (BTreeMap<&str, &NodeKind>, BTreeSet<(&str, &str)>) {
        let nodes = self.nodes().map(|node| (node.id.as_str(), &node.kind)).collect();
        let edges = self.edges().collect();
        (nodes, edges)
    }
}

impl Default for LinkGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for LinkGraph {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for LinkGraph {}
