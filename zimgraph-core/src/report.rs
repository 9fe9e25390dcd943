// Text rendering of listings, article details and search results

use crate::navigate::{ArticleDetail, Listing, NodeLabel};
use crate::session::SessionStats;
use colored::Colorize;

/// Identifier in bold, followed by the dimmed title when one is known.
pub fn format_node_link(label: &NodeLabel) -> String {
    match label.title {
        Some(ref title) => format!("{} {}", label.id.bold(), format!("({})", title).dimmed()),
        None => label.id.bold().to_string(),
    }
}

/// Breadcrumb segments joined by ` / `. Only the last segment carries a title.
pub fn format_breadcrumb(breadcrumb: &[NodeLabel]) -> String {
    let Some((last, parents)) = breadcrumb.split_last() else {
        return String::new();
    };

    let separator = " / ".dimmed().to_string();
    let mut segments: Vec<String> = parents.iter().map(|label| label.id.clone()).collect();
    segments.push(format_node_link(last));
    segments.join(&separator)
}

fn push_entries(report: &mut String, entries: &[NodeLabel]) {
    for entry in entries {
        report.push_str(&format!(" * {}\n", format_node_link(entry)));
    }
}

pub fn format_listing(listing: &Listing) -> String {
    let mut report = String::new();

    for group in &listing.groups {
        report.push_str(&format!("{}:\n", format_breadcrumb(&group.breadcrumb)));
        push_entries(&mut report, &group.entries);
        report.push('\n');
    }

    report.push_str("Uncategorized articles:\n");
    if listing.uncategorized.is_empty() {
        report.push_str(&format!("{}\n", "(No uncategorized articles)".dimmed()));
    } else {
        push_entries(&mut report, &listing.uncategorized);
    }
    report
}

pub fn format_article_detail(detail: &ArticleDetail) -> String {
    let mut report = String::new();

    let title = detail.title.as_deref().unwrap_or(&detail.id);
    report.push_str(&format!("{}\n", title.bold()));
    if let Some(ref mimetype) = detail.mimetype {
        report.push_str(&format!("{}\n", mimetype.dimmed()));
    }
    report.push('\n');

    report.push_str("Forward links:\n");
    if detail.forward_links.is_empty() {
        report.push_str(&format!("{}\n", "(No forward links)".dimmed()));
    } else {
        push_entries(&mut report, &detail.forward_links);
    }
    report.push('\n');

    report.push_str("Backward links:\n");
    if detail.backward_links.is_empty() {
        report.push_str(&format!("{}\n", "(No backward links)".dimmed()));
    } else {
        push_entries(&mut report, &detail.backward_links);
    }
    report
}

pub fn format_search_results(candidates: &[String]) -> String {
    let mut report = String::from("\nSearch results:\n");
    for candidate in candidates {
        report.push_str(&format!(" * {}\n", candidate.bold()));
    }
    if candidates.is_empty() {
        report.push_str(&format!("{}\n", "(No search results)".dimmed()));
    }
    report.push('\n');
    report
}

/// Sizes of the article views, printed before each prompt.
pub fn format_view_summary(all_articles: usize, category_articles: usize) -> String {
    format!(
        "Graph contains {} articles\n{} articles are directly related to categories\n",
        all_articles.to_string().bold(),
        category_articles.to_string().bold()
    )
}

pub fn format_stats(stats: &SessionStats) -> String {
    let mut report = String::new();
    report.push_str(&format!("Nodes:              {}\n", stats.graph.nodes));
    report.push_str(&format!("Edges:              {}\n", stats.graph.edges));
    report.push_str(&format!("Articles:           {}\n", stats.graph.articles));
    report.push_str(&format!("Redirects:          {}\n", stats.graph.redirects));
    report.push_str(&format!("Unresolved targets: {}\n", stats.graph.unresolved));
    report.push('\n');
    report.push_str(&format!("Categories:         {}\n", stats.categories));
    report.push_str(&format!("All articles:       {}\n", stats.all_articles));
    report.push_str(&format!("Category articles:  {}\n", stats.category_articles));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GraphStats;
    use crate::navigate::ListingGroup;

    fn label(id: &str, title: Option<&str>) -> NodeLabel {
        NodeLabel {
            id: id.to_string(),
            title: title.map(str::to_string),
        }
    }

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_node_link() {
        plain();
        assert_eq!(format_node_link(&label("A", Some("Alpha"))), "A (Alpha)");
        assert_eq!(format_node_link(&label("B", None)), "B");
    }

    #[test]
    fn test_breadcrumb_titles_only_last() {
        plain();
        let crumbs = vec![
            label("Main", Some("Main Page")),
            label("Category:Fruit", Some("Fruit")),
            label("Category:Apples", Some("Apples")),
        ];
        assert_eq!(
            format_breadcrumb(&crumbs),
            "Main / Category:Fruit / Category:Apples (Apples)"
        );
        assert_eq!(format_breadcrumb(&[]), "");
    }

    #[test]
    fn test_listing() {
        plain();
        let listing = Listing {
            groups: vec![ListingGroup {
                breadcrumb: vec![label("Category:Fruit", Some("Fruit"))],
                entries: vec![label("Apple", Some("Apple")), label("Pear", None)],
            }],
            uncategorized: vec![],
        };
        assert_eq!(
            format_listing(&listing),
            "Category:Fruit (Fruit):\n * Apple (Apple)\n * Pear\n\nUncategorized articles:\n(No uncategorized articles)\n"
        );
    }

    #[test]
    fn test_article_detail_empty_links() {
        plain();
        let detail = ArticleDetail {
            id: "A".to_string(),
            title: Some("Alpha".to_string()),
            mimetype: Some("text/html".to_string()),
            forward_links: vec![label("B", Some("Beta"))],
            backward_links: vec![],
        };
        let report = format_article_detail(&detail);
        assert!(report.starts_with("Alpha\ntext/html\n"));
        assert!(report.contains("Forward links:\n * B (Beta)\n"));
        assert!(report.contains("Backward links:\n(No backward links)\n"));
        assert!(!report.contains("(No forward links)"));
    }

    #[test]
    fn test_search_results() {
        plain();
        assert_eq!(format_search_results(&[]), "\nSearch results:\n(No search results)\n\n");
        assert_eq!(
            format_search_results(&["A".to_string(), "B".to_string()]),
            "\nSearch results:\n * A\n * B\n\n"
        );
    }

    #[test]
    fn test_view_summary() {
        plain();
        assert_eq!(
            format_view_summary(12, 3),
            "Graph contains 12 articles\n3 articles are directly related to categories\n"
        );
    }

    #[test]
    fn test_stats() {
        let stats = SessionStats {
            graph: GraphStats {
                nodes: 7,
                edges: 9,
                articles: 4,
                redirects: 1,
                unresolved: 0,
            },
            categories: 1,
            all_articles: 4,
            category_articles: 3,
            exclude_related: false,
        };
        let report = format_stats(&stats);
        assert!(report.contains("Nodes:              7\n"));
        assert!(report.contains("Category articles:  3\n"));
    }
}
