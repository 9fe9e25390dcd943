// Entry classification: how one archive entry contributes to the link graph

use crate::error::Result;
use crate::links::extract_links;
use crate::model::{ARTICLES_NODE, CATEGORIES_NODE, LinkGraph, NodeKind};
use tracing::trace;
use zimgraph_archive::{Archive, Entry, EntryKind};

/// What [`classify_entry`] did with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Redirect,
    Article { links: usize },
    Excluded,
}

/// Add one entry to `graph`.
///
/// Redirects become a node with a single edge to their target. HTML items
/// become article nodes with membership edges and one edge per internal link.
/// Everything else is left out of the graph. Content and lookup failures are
/// returned to the caller unchanged.
pub fn classify_entry<A: Archive + ?Sized>(
    archive: &A,
    entry: &Entry,
    category_prefix: &str,
    graph: &mut LinkGraph,
) -> Result<Classification> {
    let mimetype = match &entry.kind {
        EntryKind::Redirect { target } => {
            let target = archive.entry(*target)?;
            graph.add_node(
                &entry.path,
                NodeKind::Redirect {
                    title: entry.title.clone(),
                },
            );
            graph.add_edge(&entry.path, &target.path);
            return Ok(Classification::Redirect);
        }
        EntryKind::Item { mimetype } if entry.is_html() => mimetype.clone(),
        _ => return Ok(Classification::Excluded),
    };

    graph.add_node(
        &entry.path,
        NodeKind::Article {
            title: entry.title.clone(),
            mimetype,
        },
    );
    graph.add_edge(ARTICLES_NODE, &entry.path);
    if !category_prefix.is_empty() && entry.path.starts_with(category_prefix) {
        graph.add_edge(CATEGORIES_NODE, &entry.path);
    }

    let content = archive.content(entry.index)?;
    let mut links = 0;
    for link in extract_links(&content) {
        if graph.add_edge(&entry.path, &link) {
            links += 1;
        }
    }
    trace!("{}: {} links", entry.path, links);

    Ok(Classification::Article { links })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_CATEGORY_PREFIX;
    use zimgraph_archive::MemoryArchive;

    fn classify_all(archive: &MemoryArchive) -> LinkGraph {
        let mut graph = LinkGraph::new();
        for index in 0..archive.entry_count() {
            let entry = archive.entry(index).unwrap();
            classify_entry(archive, &entry, DEFAULT_CATEGORY_PREFIX, &mut graph).unwrap();
        }
        graph
    }

    #[test]
    fn test_article_gets_membership_and_link_edges() {
        let mut archive = MemoryArchive::new();
        archive.add_article(
            "Apple",
            "Apple",
            r#"<a href="Pear">Pear</a><a href="https://example.com">x</a><a href="Apple">self</a>"#,
        );
        let graph = classify_all(&archive);

        let node = graph.get("Apple").unwrap();
        assert_eq!(node.kind.mimetype(), Some("text/html"));
        assert!(graph.has_edge(ARTICLES_NODE, "Apple"));
        assert!(!graph.has_edge(CATEGORIES_NODE, "Apple"));
        assert!(graph.has_edge("Apple", "Pear"));
        assert!(!graph.has_edge("Apple", "Apple"));
        assert_eq!(graph.out_degree("Apple"), 1);
    }

    #[test]
    fn test_category_gets_category_edge() {
        let mut archive = MemoryArchive::new();
        archive.add_article("Category:Fruit", "Fruit", "");
        let graph = classify_all(&archive);

        assert!(graph.has_edge(ARTICLES_NODE, "Category:Fruit"));
        assert!(graph.has_edge(CATEGORIES_NODE, "Category:Fruit"));
    }

    #[test]
    fn test_redirect_has_single_edge_and_no_mimetype() {
        let mut archive = MemoryArchive::new();
        let apple = archive.add_article("Apple", "Apple", "");
        let index = archive.add_redirect("Apples", "Apples", apple);
        let entry = archive.entry(index).unwrap();

        let mut graph = LinkGraph::new();
        let outcome = classify_entry(&archive, &entry, DEFAULT_CATEGORY_PREFIX, &mut graph).unwrap();

        assert_eq!(outcome, Classification::Redirect);
        assert_eq!(graph.out_degree("Apples"), 1);
        assert!(graph.has_edge("Apples", "Apple"));
        assert_eq!(graph.get("Apples").unwrap().kind.mimetype(), None);
        assert!(!graph.has_edge(ARTICLES_NODE, "Apples"));
    }

    #[test]
    fn test_non_html_excluded() {
        let mut archive = MemoryArchive::new();
        let index = archive.add_item("logo.png", "logo", "image/png", vec![1, 2, 3]);
        let entry = archive.entry(index).unwrap();

        let mut graph = LinkGraph::new();
        let outcome = classify_entry(&archive, &entry, DEFAULT_CATEGORY_PREFIX, &mut graph).unwrap();

        assert_eq!(outcome, Classification::Excluded);
        assert!(!graph.contains("logo.png"));
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_content_failure_propagates() {
        let mut archive = MemoryArchive::new();
        let index = archive.add_entry(Entry::item(0, "Broken", "Broken", "text/html"));
        let entry = archive.entry(index).unwrap();

        let mut graph = LinkGraph::new();
        assert!(classify_entry(&archive, &entry, DEFAULT_CATEGORY_PREFIX, &mut graph).is_err());
    }
}
