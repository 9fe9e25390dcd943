// Title search shared by archive backends without a full-text index

use crate::entry::{Entry, EntryKind};
use crate::error::Result;
use crate::reader::Archive;

/// Split a query into lowercase terms.
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|term| term.to_lowercase())
        .collect()
}

/// An entry matches when every term occurs in its title or its path.
pub fn entry_matches(terms: &[String], entry: &Entry) -> bool {
    if terms.is_empty() || matches!(entry.kind, EntryKind::Placeholder) {
        return false;
    }
    let title = entry.title.to_lowercase();
    let path = entry.path.to_lowercase();
    terms
        .iter()
        .all(|term| title.contains(term.as_str()) || path.contains(term.as_str()))
}

/// Scan entries in index order and return the paths of matches `start..start + count`.
pub fn scan_titles<A: Archive + ?Sized>(
    archive: &A,
    query: &str,
    start: usize,
    count: usize,
) -> Result<Vec<String>> {
    let terms = query_terms(query);
    let mut page = Vec::new();
    if terms.is_empty() || count == 0 {
        return Ok(page);
    }

    let mut skipped = 0;
    for index in 0..archive.entry_count() {
        let entry = archive.entry(index)?;
        if !entry_matches(&terms, &entry) {
            continue;
        }
        if skipped < start {
            skipped += 1;
            continue;
        }
        page.push(entry.path);
        if page.len() == count {
            break;
        }
    }
    Ok(page)
}
