// Navigation over the graph views: breadcrumbs, grouped listings, link details

use crate::error::{GraphError, Result};
use crate::model::{LinkGraph, is_sentinel};
use crate::views::{GraphViews, View};
use petgraph::algo::astar;
use petgraph::graph::NodeIndex;
use petgraph::visit::{Dfs, NodeFiltered};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use zimgraph_archive::{Archive, Entry};

/// A node identifier together with its title, when the graph knows one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeLabel {
    pub id: String,
    pub title: Option<String>,
}

impl NodeLabel {
    pub fn new(graph: &LinkGraph, id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: graph.title(id).map(str::to_string),
        }
    }

    fn of(graph: &LinkGraph, idx: NodeIndex) -> Self {
        let node = graph.node(idx);
        Self {
            id: node.id.clone(),
            title: node.kind.title().map(str::to_string),
        }
    }
}

/// One category heading and the entries filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingGroup {
    pub breadcrumb: Vec<NodeLabel>,
    pub entries: Vec<NodeLabel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub groups: Vec<ListingGroup>,
    pub uncategorized: Vec<NodeLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleDetail {
    pub id: String,
    pub title: Option<String>,
    pub mimetype: Option<String>,
    pub forward_links: Vec<NodeLabel>,
    pub backward_links: Vec<NodeLabel>,
}

/// Follow redirects from the archive's main entry to a content entry.
pub fn resolve_root<A: Archive + ?Sized>(archive: &A) -> Result<Option<Entry>> {
    let Some(mut entry) = archive.main_entry()? else {
        return Ok(None);
    };

    let mut seen = HashSet::new();
    while let Some(target) = entry.redirect_target() {
        if !seen.insert(entry.index) {
            return Err(GraphError::RedirectLoop(entry.path));
        }
        entry = archive.entry(target)?;
    }
    Ok(Some(entry))
}

fn sorted_by_id(graph: &LinkGraph, mut nodes: Vec<NodeIndex>) -> Vec<NodeIndex> {
    nodes.sort_by(|a, b| graph.node(*a).id.cmp(&graph.node(*b).id));
    nodes.dedup();
    nodes
}

/// Shortest path from `from` to `to` by edge count, inside `view`.
pub fn shortest_path(
    graph: &LinkGraph,
    view: &View,
    from: NodeIndex,
    to: NodeIndex,
) -> Option<Vec<NodeIndex>> {
    if !view.contains(from) || !view.contains(to) {
        return None;
    }

    let filtered = NodeFiltered::from_fn(graph.digraph(), |idx: NodeIndex| view.contains(idx));
    astar(&filtered, from, |idx: NodeIndex| idx == to, |_| 1usize, |_| 0)
        .map(|(_, path)| path)
}

/// Category path from `root` to `category` within the categories view.
///
/// A category the root cannot reach yields a breadcrumb of itself alone.
pub fn breadcrumb(views: &GraphViews, root: &str, category: &str) -> Vec<NodeLabel> {
    let graph = views.graph();
    let path = match (graph.node_index(root), graph.node_index(category)) {
        (Some(from), Some(to)) => shortest_path(graph, views.categories(), from, to),
        _ => None,
    };

    match path {
        Some(path) => path.into_iter().map(|idx| NodeLabel::of(graph, idx)).collect(),
        None => vec![NodeLabel::new(graph, category)],
    }
}

/// Nodes reachable from `root` inside `view`, including `root` itself.
fn descendant_closure(graph: &LinkGraph, view: &View, root: NodeIndex) -> HashSet<NodeIndex> {
    let filtered = NodeFiltered::from_fn(graph.digraph(), |idx: NodeIndex| view.contains(idx));
    let mut dfs = Dfs::new(&filtered, root);
    let mut closure = HashSet::new();
    while let Some(node) = dfs.next(&filtered) {
        closure.insert(node);
    }
    closure
}

/// Breadth-first tree from `root`, neighbors taken in identifier order.
///
/// Yields each parent with the children it discovered. Only the root and
/// parents with at least one child appear.
fn bfs_successors(graph: &LinkGraph, view: &View, root: NodeIndex) -> Vec<(NodeIndex, Vec<NodeIndex>)> {
    let mut tree = Vec::new();
    let mut seen = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);

    while let Some(node) = queue.pop_front() {
        let neighbors = sorted_by_id(graph, view.successors(graph, node).collect());
        let mut children = Vec::new();
        for next in neighbors {
            if seen.insert(next) {
                children.push(next);
                queue.push_back(next);
            }
        }
        if node == root || !children.is_empty() {
            tree.push((node, children));
        }
    }
    tree
}

/// List every search-view article under its category breadcrumb, starting
/// the traversal at `root`. Articles not reachable from `root` are collected
/// as uncategorized, sorted by identifier. Without a root, or with a root
/// outside the search view, everything is uncategorized.
pub fn grouped_listing(views: &GraphViews, root: Option<&str>) -> Listing {
    let graph = views.graph();
    let search = views.search();
    let categories = views.categories();

    let mut listing = Listing::default();
    let root = root.and_then(|root| {
        graph
            .node_index(root)
            .filter(|&idx| search.contains(idx))
            .map(|idx| (root, idx))
    });

    let closure = match root {
        Some((root, root_idx)) => {
            for (node, children) in bfs_successors(graph, search, root_idx) {
                if !categories.contains(node) {
                    continue;
                }
                listing.groups.push(ListingGroup {
                    breadcrumb: breadcrumb(views, root, &graph.node(node).id),
                    entries: children
                        .into_iter()
                        .map(|idx| NodeLabel::of(graph, idx))
                        .collect(),
                });
            }
            descendant_closure(graph, search, root_idx)
        }
        None => HashSet::new(),
    };

    let remaining = search.members().filter(|idx| !closure.contains(idx)).collect();
    listing.uncategorized = sorted_by_id(graph, remaining)
        .into_iter()
        .map(|idx| NodeLabel::of(graph, idx))
        .collect();
    listing
}

fn link_labels(graph: &LinkGraph, self_idx: NodeIndex, nodes: Vec<NodeIndex>) -> Vec<NodeLabel> {
    let nodes = nodes
        .into_iter()
        .filter(|&idx| idx != self_idx && !is_sentinel(&graph.node(idx).id))
        .collect();
    sorted_by_id(graph, nodes)
        .into_iter()
        .map(|idx| NodeLabel::of(graph, idx))
        .collect()
}

/// Title, type and search-view links of `id`, or `None` if `id` is not in the search view.
pub fn article_detail(views: &GraphViews, id: &str) -> Option<ArticleDetail> {
    let graph = views.graph();
    let search = views.search();
    let idx = graph.node_index(id).filter(|&idx| search.contains(idx))?;
    let node = graph.node(idx);

    Some(ArticleDetail {
        id: node.id.clone(),
        title: node.kind.title().map(str::to_string),
        mimetype: node.kind.mimetype().map(str::to_string),
        forward_links: link_labels(graph, idx, search.successors(graph, idx).collect()),
        backward_links: link_labels(graph, idx, search.predecessors(graph, idx).collect()),
    })
}
