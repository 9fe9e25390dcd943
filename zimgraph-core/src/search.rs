// Resolving free-text queries to graph nodes

use crate::error::Result;
use crate::views::GraphViews;
use std::collections::VecDeque;
use zimgraph_archive::Archive;

/// Results requested from the archive per search page.
pub const SEARCH_PAGE_SIZE: usize = 10;
/// Most candidates a fuzzy query resolves to.
pub const MAX_SEARCH_RESULTS: usize = 10;

/// Lazily paged full-text search results.
///
/// Pages are fetched on demand and the offset advances by the size of each
/// page. The first empty page ends the sequence. Dropping the iterator early
/// fetches nothing further.
pub struct SearchPages<'a, A: ?Sized> {
    archive: &'a A,
    query: String,
    offset: usize,
    page: VecDeque<String>,
    exhausted: bool,
}

impl<'a, A: Archive + ?Sized> SearchPages<'a, A> {
    pub fn new(archive: &'a A, query: &str) -> Self {
        Self {
            archive,
            query: query.to_string(),
            offset: 0,
            page: VecDeque::new(),
            exhausted: false,
        }
    }
}

impl<A: Archive + ?Sized> Iterator for SearchPages<'_, A> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(path) = self.page.pop_front() {
            return Some(Ok(path));
        }
        if self.exhausted {
            return None;
        }

        match self.archive.search(&self.query, self.offset, SEARCH_PAGE_SIZE) {
            Ok(page) if page.is_empty() => {
                self.exhausted = true;
                None
            }
            Ok(page) => {
                self.offset += page.len();
                self.page = page.into();
                self.page.pop_front().map(Ok)
            }
            Err(e) => {
                self.exhausted = true;
                Some(Err(e.into()))
            }
        }
    }
}

/// Outcome of resolving a query against the search view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The query is itself a node of the search view.
    Exact(String),
    /// Full-text matches that are in the search view, in search order.
    Candidates(Vec<String>),
}

/// Resolve `query` to a node of the search view.
///
/// An exact identifier short-circuits without touching the archive's search.
/// Otherwise up to [`MAX_SEARCH_RESULTS`] search hits that belong to the view
/// are returned.
pub fn resolve_query<A: Archive + ?Sized>(
    archive: &A,
    views: &GraphViews,
    query: &str,
) -> Result<Resolution> {
    let graph = views.graph();
    let search = views.search();

    if search.contains_id(graph, query) {
        return Ok(Resolution::Exact(query.to_string()));
    }

    let mut candidates = Vec::new();
    for hit in SearchPages::new(archive, query) {
        let id = hit?;
        if search.contains_id(graph, &id) {
            candidates.push(id);
            if candidates.len() == MAX_SEARCH_RESULTS {
                break;
            }
        }
    }
    Ok(Resolution::Candidates(candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zimgraph_archive::MemoryArchive;

    #[test]
    fn test_pages_advance_until_empty() {
        let mut archive = MemoryArchive::new();
        for i in 0..25 {
            archive.add_article(&format!("Item_{:02}", i), &format!("Item {}", i), "");
        }

        let hits: Vec<String> = SearchPages::new(&archive, "item")
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(hits.len(), 25);
        assert_eq!(hits[0], "Item_00");
        assert_eq!(hits[24], "Item_24");
        // Three full or partial pages plus the terminating empty one.
        assert_eq!(archive.search_calls(), 4);
    }

    #[test]
    fn test_pages_stop_when_dropped() {
        let mut archive = MemoryArchive::new();
        for i in 0..25 {
            archive.add_article(&format!("Item_{:02}", i), "Item", "");
        }

        let first: Vec<_> = SearchPages::new(&archive, "item").take(3).collect();
        assert_eq!(first.len(), 3);
        assert_eq!(archive.search_calls(), 1);
    }

    #[test]
    fn test_no_hits() {
        let archive = MemoryArchive::new();
        assert_eq!(SearchPages::new(&archive, "anything").count(), 0);
        assert_eq!(archive.search_calls(), 1);
    }
}
