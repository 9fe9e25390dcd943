//! Read-only projections of the full link graph.
//!
//! Each view is a node-induced subgraph: a set of member nodes, with edges
//! taken from the full graph wherever both endpoints are members. Views are
//! computed on first access and cached for the life of [`GraphViews`].

use crate::model::{ARTICLES_NODE, CATEGORIES_NODE, LinkGraph};
use petgraph::graph::NodeIndex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Nodes whose shortest directed distance from `source` is exactly `distance`.
pub fn descendants_at_distance(
    graph: &LinkGraph,
    source: NodeIndex,
    distance: usize,
) -> HashSet<NodeIndex> {
    let mut seen = HashSet::from([source]);
    let mut layer = vec![source];

    for _ in 0..distance {
        let mut next = Vec::new();
        for &node in &layer {
            for successor in graph.successors(node) {
                if seen.insert(successor) {
                    next.push(successor);
                }
            }
        }
        layer = next;
    }

    layer.into_iter().collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    members: HashSet<NodeIndex>,
}

impl View {
    /// Members are the nodes at any of `distances` from the `anchor` node.
    pub fn around(graph: &LinkGraph, anchor: &str, distances: &[usize]) -> Self {
        let Some(anchor) = graph.node_index(anchor) else {
            return Self::default();
        };
        let members = distances
            .iter()
            .flat_map(|&distance| descendants_at_distance(graph, anchor, distance))
            .collect();
        Self { members }
    }

    /// Number of member nodes.
    pub fn order(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, idx: NodeIndex) -> bool {
        self.members.contains(&idx)
    }

    pub fn contains_id(&self, graph: &LinkGraph, id: &str) -> bool {
        graph
            .node_index(id)
            .is_some_and(|idx| self.members.contains(&idx))
    }

    pub fn members(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.members.iter().copied()
    }

    /// Successors of `idx` inside the view.
    pub fn successors<'a>(
        &'a self,
        graph: &'a LinkGraph,
        idx: NodeIndex,
    ) -> impl Iterator<Item = NodeIndex> + 'a {
        graph
            .successors(idx)
            .filter(move |next| self.members.contains(next))
    }

    /// Predecessors of `idx` inside the view.
    pub fn predecessors<'a>(
        &'a self,
        graph: &'a LinkGraph,
        idx: NodeIndex,
    ) -> impl Iterator<Item = NodeIndex> + 'a {
        graph
            .predecessors(idx)
            .filter(move |prev| self.members.contains(prev))
    }
}

/// The full graph plus its lazily derived views.
#[derive(Debug)]
pub struct GraphViews {
    graph: LinkGraph,
    exclude_related: bool,
    categories: OnceLock<View>,
    all_articles: OnceLock<View>,
    category_articles: OnceLock<View>,
}

impl GraphViews {
    pub fn new(graph: LinkGraph, exclude_related: bool) -> Self {
        Self {
            graph,
            exclude_related,
            categories: OnceLock::new(),
            all_articles: OnceLock::new(),
            category_articles: OnceLock::new(),
        }
    }

    pub fn graph(&self) -> &LinkGraph {
        &self.graph
    }

    pub fn exclude_related(&self) -> bool {
        self.exclude_related
    }

    /// Category pages: direct members of the categories anchor.
    pub fn categories(&self) -> &View {
        self.categories
            .get_or_init(|| View::around(&self.graph, CATEGORIES_NODE, &[1]))
    }

    /// Every retained HTML article.
    pub fn all_articles(&self) -> &View {
        self.all_articles
            .get_or_init(|| View::around(&self.graph, ARTICLES_NODE, &[1]))
    }

    /// Category pages plus the nodes they link to directly.
    pub fn category_articles(&self) -> &View {
        self.category_articles
            .get_or_init(|| View::around(&self.graph, CATEGORIES_NODE, &[1, 2]))
    }

    /// The view searches and listings are restricted to.
    pub fn search(&self) -> &View {
        if self.exclude_related {
            self.category_articles()
        } else {
            self.all_articles()
        }
    }
}
